use rayon::prelude::*;

use super::emotion::{logistic, Emotion, EmotionScoreMap};
use super::emotion_scorer::EmotionScorer;
use super::regression_head::RegressionHead;
use crate::features::domain::embedding::Embedding;

/// Independent per-emotion heads evaluated in parallel.
///
/// Emotions without a head, and heads that fail or return a non-finite
/// value, score 0.0. Other emotions are unaffected.
pub struct EmotionEnsemble {
    heads: Vec<Box<dyn RegressionHead>>,
}

impl EmotionEnsemble {
    pub fn new(heads: Vec<Box<dyn RegressionHead>>) -> Self {
        Self { heads }
    }

    pub fn len(&self) -> usize {
        self.heads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heads.is_empty()
    }

    pub fn emotions(&self) -> Vec<Emotion> {
        self.heads.iter().map(|h| h.emotion()).collect()
    }
}

impl EmotionScorer for EmotionEnsemble {
    fn name(&self) -> &'static str {
        "ensemble"
    }

    fn score(&self, embedding: &Embedding) -> EmotionScoreMap {
        let results: Vec<(Emotion, f32)> = self
            .heads
            .par_iter()
            .map(|head| {
                let emotion = head.emotion();
                let score = match head.predict_raw(embedding) {
                    Ok(raw) if raw.is_finite() => logistic(raw),
                    Ok(raw) => {
                        log::warn!("{emotion} head returned {raw}; scoring 0");
                        0.0
                    }
                    Err(e) => {
                        log::warn!("{emotion} head failed; scoring 0: {e}");
                        0.0
                    }
                };
                (emotion, score)
            })
            .collect();
        EmotionScoreMap::from_pairs(results)
    }
}
