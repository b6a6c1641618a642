use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::ANGER_ALERT_THRESHOLD;

#[derive(Error, Debug)]
pub enum LexiconError {
    #[error("failed to read lexicon {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse lexicon {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Terms the alert detector looks for in transcripts.
///
/// Matching is by lowercase substring, so anger entries are stems
/// (`"furios"` catches both `furioso` and `furiosa`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLexicon {
    pub profanity: Vec<String>,
    pub anger_stems: Vec<String>,
}

impl AlertLexicon {
    pub fn spanish() -> Self {
        let words = |list: &[&str]| list.iter().map(|w| w.to_string()).collect();
        Self {
            profanity: words(&[
                "puta",
                "mierda",
                "joder",
                "cabron",
                "imbecil",
                "idiota",
                "gilipollas",
                "coño",
            ]),
            anger_stems: words(&["enoj", "furios", "rabia", "asco", "odio"]),
        }
    }

    pub fn load(path: &Path) -> Result<Self, LexiconError> {
        let json = fs::read_to_string(path).map_err(|source| LexiconError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let lexicon: Self = serde_json::from_str(&json).map_err(|source| LexiconError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(lexicon.normalized())
    }

    fn normalized(self) -> Self {
        let clean = |terms: Vec<String>| {
            terms
                .into_iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect()
        };
        Self {
            profanity: clean(self.profanity),
            anger_stems: clean(self.anger_stems),
        }
    }
}

impl Default for AlertLexicon {
    fn default() -> Self {
        Self::spanish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AlertSummary {
    /// Profanity terms found, in lexicon order.
    pub profanity: Vec<String>,
    pub anger: bool,
}

impl AlertSummary {
    pub fn count(&self) -> usize {
        self.profanity.len() + usize::from(self.anger)
    }
}

/// Lexical and score-based alerting over a transcript.
pub struct AlertDetector {
    lexicon: AlertLexicon,
}

impl AlertDetector {
    pub fn new(lexicon: AlertLexicon) -> Self {
        Self {
            lexicon: lexicon.normalized(),
        }
    }

    pub fn lexicon(&self) -> &AlertLexicon {
        &self.lexicon
    }

    /// Anger is flagged by an exclamation mark, any anger stem, or an Anger
    /// score above [`ANGER_ALERT_THRESHOLD`].
    pub fn detect(&self, transcript: &str, anger_score: f32) -> AlertSummary {
        let text = transcript.to_lowercase();
        let profanity = self
            .lexicon
            .profanity
            .iter()
            .filter(|term| text.contains(term.as_str()))
            .cloned()
            .collect();
        let anger = text.contains('!')
            || self
                .lexicon
                .anger_stems
                .iter()
                .any(|stem| text.contains(stem.as_str()))
            || anger_score > ANGER_ALERT_THRESHOLD;
        AlertSummary { profanity, anger }
    }
}

impl Default for AlertDetector {
    fn default() -> Self {
        Self::new(AlertLexicon::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[test]
    fn test_profanity_matches_case_insensitively() {
        let alerts = AlertDetector::default().detect("Eres un IDIOTA, qué mierda", 0.0);
        assert_eq!(alerts.profanity, vec!["mierda", "idiota"]);
        assert!(!alerts.anger);
        assert_eq!(alerts.count(), 2);
    }

    #[rstest]
    #[case::exclamation("no puede ser!", 0.0)]
    #[case::stem("estoy muy enojado", 0.0)]
    #[case::stem_feminine("está furiosa", 0.0)]
    #[case::score("todo bien", 0.26)]
    fn test_anger_triggers(#[case] transcript: &str, #[case] anger: f32) {
        assert!(AlertDetector::default().detect(transcript, anger).anger);
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let alerts = AlertDetector::default().detect("todo bien", ANGER_ALERT_THRESHOLD);
        assert!(!alerts.anger);
        assert_eq!(alerts.count(), 0);
    }

    #[test]
    fn test_silence_sentinel_raises_nothing() {
        let alerts = AlertDetector::default().detect("[Silence]", 0.0);
        assert_eq!(alerts, AlertSummary::default());
    }

    #[test]
    fn test_custom_lexicon_from_json_is_normalized() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("lexicon.json");
        fs::write(&path, r#"{"profanity": [" Darn ", ""], "anger_stems": ["FURIOUS"]}"#).unwrap();

        let lexicon = AlertLexicon::load(&path).unwrap();
        assert_eq!(lexicon.profanity, vec!["darn"]);
        let alerts = AlertDetector::new(lexicon).detect("I am furious, darn it", 0.0);
        assert_eq!(alerts.profanity, vec!["darn"]);
        assert!(alerts.anger);
    }

    #[test]
    fn test_missing_lexicon_file_is_error() {
        assert!(matches!(
            AlertLexicon::load(Path::new("/nonexistent/lexicon.json")),
            Err(LexiconError::Read { .. })
        ));
    }
}
