use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::emotion::domain::emotion::{Emotion, EmotionScoreMap};
use crate::emotion::domain::emotion_scorer::EmotionScorer;
use crate::features::domain::embedding::Embedding;
use crate::features::infrastructure::signal_stats_extractor::SignalSummary;

/// Per-emotion `(low, high)` draw ranges, in vocabulary order.
const RANGES: [(Emotion, f32, f32); 10] = [
    (Emotion::Valence, 0.3, 0.8),
    (Emotion::Arousal, 0.4, 0.9),
    (Emotion::Anger, 0.0, 0.3),
    (Emotion::Sadness, 0.0, 0.4),
    (Emotion::Joy, 0.2, 0.8),
    (Emotion::Fear, 0.0, 0.2),
    (Emotion::Disgust, 0.0, 0.2),
    (Emotion::Awe, 0.1, 0.5),
    (Emotion::Contentment, 0.3, 0.7),
    (Emotion::Interest, 0.4, 0.8),
];

/// Scorer drawing plausible values from a PRNG seeded by the signal energy.
///
/// Identical audio always yields identical scores.
pub struct SeededScorer;

impl SeededScorer {
    pub fn seed_for(mean_rms: f32) -> u64 {
        let quantized = if mean_rms.is_finite() {
            (mean_rms.max(0.0) * 1000.0) as u64
        } else {
            0
        };
        quantized % 1000
    }

    pub fn scores_for_seed(seed: u64) -> EmotionScoreMap {
        let mut rng = StdRng::seed_from_u64(seed);
        EmotionScoreMap::from_pairs(
            RANGES
                .iter()
                .map(|&(emotion, low, high)| (emotion, rng.gen_range(low..=high))),
        )
    }
}

impl EmotionScorer for SeededScorer {
    fn name(&self) -> &'static str {
        "seeded"
    }

    fn score(&self, embedding: &Embedding) -> EmotionScoreMap {
        let summary = SignalSummary::from_embedding(embedding);
        Self::scores_for_seed(Self::seed_for(summary.mean_rms))
    }
}
