use crate::emotion::domain::emotion::{Emotion, EmotionScoreMap};
use crate::emotion::domain::emotion_scorer::EmotionScorer;
use crate::features::domain::embedding::Embedding;
use crate::features::infrastructure::signal_stats_extractor::SignalSummary;

/// Model-free scorer mapping energy and brightness to emotion scores.
///
/// Reads a [`SignalStatsExtractor`](crate::features::infrastructure::signal_stats_extractor::SignalStatsExtractor)
/// embedding. Louder audio raises arousal and anger; a brighter spectrum
/// raises valence, interest and awe. Output is deterministic.
pub struct HeuristicScorer;

impl HeuristicScorer {
    pub fn scores_for(mean_rms: f32, mean_centroid: f32) -> EmotionScoreMap {
        let r = if mean_rms.is_finite() { mean_rms.max(0.0) } else { 0.0 };
        let c = if mean_centroid.is_finite() {
            mean_centroid.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let arousal = (15.0 * r).tanh();
        let valence = 0.5 + 0.5 * (2.0 * r - 0.3 + (c - 0.25)).tanh();
        let anger = if arousal > 0.5 && valence < 0.4 {
            1.0
        } else {
            (5.0 * r).tanh()
        };

        EmotionScoreMap::from_pairs([
            (Emotion::Valence, valence),
            (Emotion::Arousal, arousal),
            (Emotion::Anger, anger),
            (Emotion::Sadness, (2.0 * (1.0 - valence) * (1.0 - arousal)).tanh()),
            (Emotion::Joy, (2.0 * valence * arousal).tanh()),
            (Emotion::Fear, 0.5 * (3.0 * c).tanh() * (1.0 - valence)),
            (Emotion::Disgust, 0.5 * anger * (1.0 - valence)),
            (Emotion::Awe, 0.5 * (4.0 * c).tanh() * arousal),
            (Emotion::Contentment, valence * (1.0 - arousal)),
            (Emotion::Interest, (2.0 * c + arousal).tanh()),
        ])
    }
}

impl EmotionScorer for HeuristicScorer {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn score(&self, embedding: &Embedding) -> EmotionScoreMap {
        let summary = SignalSummary::from_embedding(embedding);
        Self::scores_for(summary.mean_rms, summary.mean_centroid)
    }
}
