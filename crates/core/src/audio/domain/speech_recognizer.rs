use super::audio_segment::AudioSegment;
use crate::shared::constants::PREVIEW_NO_REPEAT_NGRAM;

/// Decoding budget for one transcription request.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionOptions {
    pub language: String,
    /// Upper bound on generated tokens; `None` lets the model decide.
    pub max_tokens: Option<i32>,
    /// Decode the whole input as one segment, greedily, without carried
    /// context, blank output or temperature fallback.
    pub single_segment: bool,
    /// Drop any token that would complete an n-gram of this size already
    /// present in the output.
    pub no_repeat_ngram: Option<usize>,
}

impl TranscriptionOptions {
    /// Short, deterministic decode used for streaming chunks.
    pub fn preview(language: &str, max_tokens: i32) -> Self {
        Self {
            language: language.to_string(),
            max_tokens: Some(max_tokens),
            single_segment: true,
            no_repeat_ngram: Some(PREVIEW_NO_REPEAT_NGRAM),
        }
    }

    /// Unbounded decode used for whole recordings.
    pub fn full(language: &str) -> Self {
        Self {
            language: language.to_string(),
            max_tokens: None,
            single_segment: false,
            no_repeat_ngram: None,
        }
    }
}

/// Domain interface for speech-to-text transcription.
///
/// Implementations run inference on 16 kHz mono audio and return plain text.
pub trait SpeechRecognizer: Send + Sync {
    fn transcribe(
        &self,
        audio: &AudioSegment,
        options: &TranscriptionOptions,
    ) -> Result<String, Box<dyn std::error::Error>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_is_bounded_and_constrained() {
        let options = TranscriptionOptions::preview("es", 30);
        assert_eq!(options.max_tokens, Some(30));
        assert!(options.single_segment);
        assert_eq!(options.no_repeat_ngram, Some(3));
    }

    #[test]
    fn test_full_is_unconstrained() {
        let options = TranscriptionOptions::full("en");
        assert_eq!(options.language, "en");
        assert_eq!(options.max_tokens, None);
        assert_eq!(options.no_repeat_ngram, None);
    }
}
