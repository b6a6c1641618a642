use crate::audio::domain::audio_segment::AudioSegment;
use crate::audio::domain::channel_resolver::ChannelResolver;
use crate::audio::domain::speech_recognizer::{SpeechRecognizer, TranscriptionOptions};
use crate::emotion::domain::alerts::AlertDetector;
use crate::emotion::domain::emotion::EmotionScoreMap;
use crate::emotion::domain::emotion_scorer::EmotionScorer;
use crate::features::domain::embedding::Embedding;
use crate::features::domain::feature_extractor::FeatureExtractor;
use crate::features::infrastructure::preprocess;
use crate::shared::constants::TARGET_SAMPLE_RATE;

use super::analysis::EngineMode;
use super::engine::{EmotionEngine, TranscribeError};

/// Model-backed pipeline: pretrained encoder, regression ensemble, and
/// optional speech recognition.
pub struct FullPipeline {
    resolver: ChannelResolver,
    extractor: Box<dyn FeatureExtractor>,
    scorer: Box<dyn EmotionScorer>,
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    alerts: AlertDetector,
    language: String,
}

impl FullPipeline {
    pub fn new(
        resolver: ChannelResolver,
        extractor: Box<dyn FeatureExtractor>,
        scorer: Box<dyn EmotionScorer>,
        recognizer: Option<Box<dyn SpeechRecognizer>>,
        alerts: AlertDetector,
        language: impl Into<String>,
    ) -> Self {
        Self {
            resolver,
            extractor,
            scorer,
            recognizer,
            alerts,
            language: language.into(),
        }
    }

    pub fn can_transcribe(&self) -> bool {
        self.recognizer.is_some()
    }
}

impl EmotionEngine for FullPipeline {
    fn mode(&self) -> EngineMode {
        EngineMode::Full
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
        preprocess::extract(self.extractor.as_ref(), audio)
    }

    fn score(&self, embedding: &Embedding) -> EmotionScoreMap {
        self.scorer.score(embedding)
    }

    fn transcribe(
        &self,
        audio: &AudioSegment,
        options: &TranscriptionOptions,
    ) -> Result<String, TranscribeError> {
        let recognizer = self.recognizer.as_ref().ok_or(TranscribeError::Unavailable)?;
        let samples = preprocess::prepare(audio).map_err(|e| {
            log::warn!("Could not prepare audio for transcription: {e}");
            TranscribeError::Failed(e.to_string())
        })?;
        let prepared = AudioSegment::new(samples, TARGET_SAMPLE_RATE, 1);
        recognizer.transcribe(&prepared, options).map_err(|e| {
            log::warn!("Transcription failed: {e}");
            TranscribeError::Failed(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::waveform::SpeakerRole;
    use crate::audio::infrastructure::wav_decoder::{encode_pcm16, WavDecoder};
    use crate::emotion::domain::emotion::Emotion;
    use crate::pipeline::analysis::{ChannelSelection, GateDecision};
    use crate::shared::constants::SILENCE_TRANSCRIPT;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct MeanExtractor;

    impl FeatureExtractor for MeanExtractor {
        fn name(&self) -> &'static str {
            "mean"
        }

        fn embed(&self, samples: &[f32]) -> Result<Embedding, Box<dyn std::error::Error>> {
            let energy = crate::audio::domain::audio_segment::rms(samples);
            let frames = ndarray::Array2::from_elem((1, crate::shared::constants::EMBEDDING_WIDTH), energy);
            Ok(Embedding::from_frames(frames.view())?)
        }
    }

    /// Scores Anger from the first embedding cell, everything else fixed.
    struct EnergyScorer;

    impl EmotionScorer for EnergyScorer {
        fn name(&self) -> &'static str {
            "energy"
        }

        fn score(&self, embedding: &Embedding) -> EmotionScoreMap {
            let energy = embedding.view()[[0, 0]];
            EmotionScoreMap::from_pairs([
                (Emotion::Valence, 0.6),
                (Emotion::Arousal, energy * 2.0),
                (Emotion::Anger, energy),
            ])
        }
    }

    struct ScriptedRecognizer {
        text: Result<String, String>,
        calls: Arc<AtomicUsize>,
    }

    impl SpeechRecognizer for ScriptedRecognizer {
        fn transcribe(
            &self,
            audio: &AudioSegment,
            options: &TranscriptionOptions,
        ) -> Result<String, Box<dyn std::error::Error>> {
            assert_eq!(audio.sample_rate(), TARGET_SAMPLE_RATE);
            assert_eq!(options.max_tokens, Some(30));
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.text.clone().map_err(Into::into)
        }
    }

    fn pipeline(text: Result<String, String>, calls: Arc<AtomicUsize>) -> FullPipeline {
        FullPipeline::new(
            ChannelResolver::new(vec![Box::new(WavDecoder)]),
            Box::new(MeanExtractor),
            Box::new(EnergyScorer),
            Some(Box::new(ScriptedRecognizer { text, calls })),
            AlertDetector::default(),
            "es",
        )
    }

    fn tone_wav(amplitude: f32, secs: f32) -> Vec<u8> {
        let n = (secs * TARGET_SAMPLE_RATE as f32) as usize;
        let samples: Vec<f32> = (0..n)
            .map(|i| amplitude * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 16000.0).sin())
            .collect();
        encode_pcm16(&samples, TARGET_SAMPLE_RATE, 1).unwrap()
    }

    #[test]
    fn test_speech_chunk_is_transcribed_and_alerted() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = pipeline(Ok("usted es un idiota".into()), calls.clone());
        let result = engine.evaluate_chunk(&tone_wav(0.3, 1.0), SpeakerRole::Client);
        assert_eq!(result.gate, GateDecision::Speech);
        assert_eq!(result.transcript, "usted es un idiota");
        assert_eq!(result.alerts.profanity, vec!["idiota"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_silent_chunk_skips_transcription_but_scores() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = pipeline(Ok("hallucinated words".into()), calls.clone());
        let result = engine.evaluate_chunk(&tone_wav(0.0, 2.0), SpeakerRole::Caller);
        assert_eq!(result.gate, GateDecision::Silence);
        assert_eq!(result.transcript, SILENCE_TRANSCRIPT);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!((result.final_score - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_repetitive_transcript_becomes_sentinel() {
        let engine = pipeline(Ok("gracias gracias gracias".into()), Arc::new(AtomicUsize::new(0)));
        let result = engine.evaluate_chunk(&tone_wav(0.3, 1.0), SpeakerRole::Caller);
        assert_eq!(result.transcript, SILENCE_TRANSCRIPT);
    }

    #[test]
    fn test_recognizer_failure_leaves_scores_intact() {
        let engine = pipeline(Err("decoder crashed".into()), Arc::new(AtomicUsize::new(0)));
        let result = engine.evaluate_chunk(&tone_wav(0.3, 1.0), SpeakerRole::Caller);
        assert_eq!(result.transcript, "");
        assert!(result.all_scores.anger() > 0.0);
    }

    #[test]
    fn test_empty_recognition_becomes_sentinel() {
        let engine = pipeline(Ok(String::new()), Arc::new(AtomicUsize::new(0)));
        let result = engine.evaluate_chunk(&tone_wav(0.3, 1.0), SpeakerRole::Caller);
        assert_eq!(result.gate, GateDecision::Speech);
        assert_eq!(result.transcript, SILENCE_TRANSCRIPT);
    }

    /// Returns the same phrase for any input and options.
    struct PhraseRecognizer {
        phrase: &'static str,
        calls: Arc<AtomicUsize>,
    }

    impl SpeechRecognizer for PhraseRecognizer {
        fn transcribe(
            &self,
            _: &AudioSegment,
            _: &TranscriptionOptions,
        ) -> Result<String, Box<dyn std::error::Error>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.phrase.to_string())
        }
    }

    fn phrase_pipeline(phrase: &'static str, calls: Arc<AtomicUsize>) -> FullPipeline {
        FullPipeline::new(
            ChannelResolver::new(vec![Box::new(WavDecoder)]),
            Box::new(MeanExtractor),
            Box::new(EnergyScorer),
            Some(Box::new(PhraseRecognizer { phrase, calls })),
            AlertDetector::default(),
            "es",
        )
    }

    #[test]
    fn test_sparse_speech_in_long_call_is_transcribed() {
        let mut samples: Vec<f32> = (0..TARGET_SAMPLE_RATE as usize)
            .map(|i| 0.1 * (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 16000.0).sin())
            .collect();
        samples.resize(60 * TARGET_SAMPLE_RATE as usize, 0.0);
        let bytes = encode_pcm16(&samples, TARGET_SAMPLE_RATE, 1).unwrap();

        let calls = Arc::new(AtomicUsize::new(0));
        let engine = phrase_pipeline("eres un idiota", calls.clone());
        let result = engine.analyze_call(&bytes, "wav", ChannelSelection::Caller, "sparse");
        assert_eq!(result.transcript, "eres un idiota");
        assert_eq!(result.alerts.profanity, vec!["idiota"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_digitally_silent_call_skips_transcription() {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = phrase_pipeline("eres un idiota", calls.clone());
        let result = engine.analyze_call(&tone_wav(0.0, 2.0), "wav", ChannelSelection::Both, "quiet");
        assert_eq!(result.transcript, "");
        assert!(result.alerts.profanity.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_call_transcript_deduplicates_mono_channels() {
        struct Echo;
        impl SpeechRecognizer for Echo {
            fn transcribe(
                &self,
                _: &AudioSegment,
                _: &TranscriptionOptions,
            ) -> Result<String, Box<dyn std::error::Error>> {
                Ok("buenos días".into())
            }
        }
        let engine = FullPipeline::new(
            ChannelResolver::new(vec![Box::new(WavDecoder)]),
            Box::new(MeanExtractor),
            Box::new(EnergyScorer),
            Some(Box::new(Echo)),
            AlertDetector::default(),
            "es",
        );
        let result = engine.analyze_call(&tone_wav(0.3, 1.0), "wav", ChannelSelection::Both, "c-1");
        assert_eq!(result.mode, EngineMode::Full);
        assert_eq!(result.transcript, "buenos días");
        assert_eq!(result.channels[0].transcript, "buenos días");
    }
}
