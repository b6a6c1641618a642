use std::collections::HashSet;

use crate::shared::constants::SILENCE_TRANSCRIPT;

/// Replace low-confidence preview output with the silence sentinel.
///
/// Output that is empty, shorter than two characters, or a single token
/// repeated (including a single token on its own) is treated as noise.
pub fn sanitize_preview_transcript(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() < 2 {
        return SILENCE_TRANSCRIPT.to_string();
    }
    let mut tokens = trimmed.split_whitespace();
    let first = tokens.next();
    if first.is_some() && tokens.all(|t| Some(t) == first) {
        return SILENCE_TRANSCRIPT.to_string();
    }
    trimmed.to_string()
}

/// Join per-channel transcripts into one call-level transcript.
pub fn join_transcripts<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != SILENCE_TRANSCRIPT)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep tokens in order, dropping each one that would complete an `n`-gram
/// already emitted. Tokens compare by trimmed text.
pub fn drop_repeated_ngrams<S: AsRef<str>>(tokens: &[S], n: usize) -> Vec<&str> {
    let mut kept: Vec<&str> = Vec::with_capacity(tokens.len());
    if n == 0 {
        kept.extend(tokens.iter().map(AsRef::as_ref));
        return kept;
    }
    let mut seen: HashSet<Vec<&str>> = HashSet::new();
    for token in tokens.iter().map(AsRef::as_ref) {
        if kept.len() + 1 >= n {
            let gram: Vec<&str> = kept[kept.len() + 1 - n..]
                .iter()
                .copied()
                .map(str::trim)
                .chain(std::iter::once(token.trim()))
                .collect();
            if !seen.insert(gram) {
                continue;
            }
        }
        kept.push(token);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty("")]
    #[case::whitespace("   ")]
    #[case::one_char("a")]
    #[case::repeated("hola hola hola")]
    #[case::single_word("gracias")]
    fn test_noise_becomes_sentinel(#[case] raw: &str) {
        assert_eq!(sanitize_preview_transcript(raw), SILENCE_TRANSCRIPT);
    }

    #[test]
    fn test_real_speech_is_trimmed_and_kept() {
        assert_eq!(
            sanitize_preview_transcript("  buenos días, ¿en qué le ayudo? "),
            "buenos días, ¿en qué le ayudo?"
        );
    }

    #[test]
    fn test_looping_token_is_cut_after_first_trigram() {
        let pieces = [" la", " la", " la", " la", " la"];
        let kept = drop_repeated_ngrams(&pieces, 3);
        assert_eq!(kept.concat(), " la la la");
        assert_eq!(sanitize_preview_transcript(&kept.concat()), SILENCE_TRANSCRIPT);
    }

    #[test]
    fn test_repeated_phrase_loses_completing_token() {
        let pieces = [" a", " b", " c", " a", " b", " c", " d"];
        assert_eq!(drop_repeated_ngrams(&pieces, 3).concat(), " a b c a b d");
    }

    #[test]
    fn test_short_or_unconstrained_input_is_unchanged() {
        assert_eq!(drop_repeated_ngrams(&[" hola", " hola"], 3), vec![" hola", " hola"]);
        assert_eq!(drop_repeated_ngrams(&["x", "x", "x", "x"], 0).len(), 4);
    }

    #[test]
    fn test_join_skips_empty_and_silence() {
        let joined = join_transcripts(["hola", "", SILENCE_TRANSCRIPT, " adiós "]);
        assert_eq!(joined, "hola adiós");
    }
}
