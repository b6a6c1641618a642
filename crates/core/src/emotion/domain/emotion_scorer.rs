use super::emotion::EmotionScoreMap;
use crate::features::domain::embedding::Embedding;

/// Maps an embedding to a full, sanitized score map. Never fails.
pub trait EmotionScorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, embedding: &Embedding) -> EmotionScoreMap;
}
