use crate::audio::domain::audio_segment::AudioSegment;
use crate::audio::domain::channel_resolver::ChannelResolver;
use crate::audio::domain::speech_recognizer::TranscriptionOptions;
use crate::emotion::domain::alerts::AlertDetector;
use crate::emotion::domain::emotion::EmotionScoreMap;
use crate::emotion::domain::emotion_scorer::EmotionScorer;
use crate::emotion::infrastructure::heuristic_scorer::HeuristicScorer;
use crate::emotion::infrastructure::seeded_scorer::SeededScorer;
use crate::features::domain::embedding::Embedding;
use crate::features::infrastructure::preprocess;
use crate::features::infrastructure::signal_stats_extractor::SignalStatsExtractor;
use crate::shared::config::FallbackStrategy;

use super::analysis::EngineMode;
use super::engine::{EmotionEngine, TranscribeError};

/// Degraded pipeline that needs no model files.
///
/// Embeddings hold per-frame signal statistics and scores come from a
/// heuristic or seeded scorer. Transcription is unavailable, so chunk
/// transcripts are empty unless the gate marks them silent.
pub struct FallbackPipeline {
    resolver: ChannelResolver,
    extractor: SignalStatsExtractor,
    scorer: Box<dyn EmotionScorer>,
    alerts: AlertDetector,
    language: String,
}

impl FallbackPipeline {
    pub fn new(
        resolver: ChannelResolver,
        strategy: FallbackStrategy,
        alerts: AlertDetector,
        language: impl Into<String>,
    ) -> Self {
        let scorer: Box<dyn EmotionScorer> = match strategy {
            FallbackStrategy::Heuristic => Box::new(HeuristicScorer),
            FallbackStrategy::Seeded => Box::new(SeededScorer),
        };
        Self {
            resolver,
            extractor: SignalStatsExtractor::new(),
            scorer,
            alerts,
            language: language.into(),
        }
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }
}

impl EmotionEngine for FallbackPipeline {
    fn mode(&self) -> EngineMode {
        EngineMode::Fallback
    }

    fn resolver(&self) -> &ChannelResolver {
        &self.resolver
    }

    fn alert_detector(&self) -> &AlertDetector {
        &self.alerts
    }

    fn language(&self) -> &str {
        &self.language
    }

    fn extract(&self, audio: &AudioSegment) -> Embedding {
        preprocess::extract(&self.extractor, audio)
    }

    fn score(&self, embedding: &Embedding) -> EmotionScoreMap {
        self.scorer.score(embedding)
    }

    fn transcribe(
        &self,
        _audio: &AudioSegment,
        _options: &TranscriptionOptions,
    ) -> Result<String, TranscribeError> {
        Err(TranscribeError::Unavailable)
    }
}
