use std::time::Instant;

use rayon::prelude::*;
use thiserror::Error;

use crate::audio::domain::audio_segment::AudioSegment;
use crate::audio::domain::channel_resolver::{ChannelResolver, ResolvedChannels};
use crate::audio::domain::speech_recognizer::TranscriptionOptions;
use crate::audio::domain::transcript::join_transcripts;
use crate::audio::domain::waveform::{SpeakerRole, Waveform};
use crate::emotion::domain::aggregator::combine;
use crate::emotion::domain::alerts::AlertDetector;
use crate::emotion::domain::emotion::EmotionScoreMap;
use crate::features::domain::embedding::Embedding;
use crate::shared::constants::DEFAULT_DECLARED_EXTENSION;

use super::analysis::{
    CallAnalysisResult, CallMetadata, ChannelAnalysisResult, ChannelSelection, ChunkResult,
    EngineMode,
};
use super::quality_gate;

#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("no speech recognizer available")]
    Unavailable,
    #[error("transcription failed: {0}")]
    Failed(String),
}

/// The one contract every pipeline variant satisfies.
///
/// Implementors supply the stages; call analysis and chunk evaluation are
/// built on top of them and behave identically in every mode. Call analysis
/// and chunk evaluation are infallible: stage failures are absorbed into zero
/// or default values.
pub trait EmotionEngine: Send + Sync {
    fn mode(&self) -> EngineMode;

    fn resolver(&self) -> &ChannelResolver;

    fn alert_detector(&self) -> &AlertDetector;

    /// Language hint passed to transcription.
    fn language(&self) -> &str;

    fn extract(&self, audio: &AudioSegment) -> Embedding;

    fn score(&self, embedding: &Embedding) -> EmotionScoreMap;

    /// Raw recognizer output; `Ok("")` means nothing was recognized.
    fn transcribe(
        &self,
        audio: &AudioSegment,
        options: &TranscriptionOptions,
    ) -> Result<String, TranscribeError>;

    fn resolve(&self, bytes: &[u8], declared_extension: &str) -> ResolvedChannels {
        self.resolver().resolve(bytes, declared_extension)
    }

    fn analyze_channel(&self, waveform: &Waveform) -> ChannelAnalysisResult {
        let embedding = self.extract(&waveform.audio);
        let scores = self.score(&embedding);
        // Call channels are judged as a whole: only digital silence skips
        // transcription, sparse speech still reaches the recognizer.
        let transcript = if waveform.audio.peak() == 0.0 {
            String::new()
        } else {
            self.transcribe(&waveform.audio, &TranscriptionOptions::full(self.language()))
                .unwrap_or_default()
        };
        ChannelAnalysisResult::from_scores(waveform.role, scores, transcript)
    }

    fn analyze_call(
        &self,
        bytes: &[u8],
        declared_extension: &str,
        selection: ChannelSelection,
        call_id: &str,
    ) -> CallAnalysisResult {
        let started = Instant::now();
        let resolved = self.resolve(bytes, declared_extension);

        let channels: Vec<ChannelAnalysisResult> = selection
            .roles()
            .par_iter()
            .map(|role| self.analyze_channel(resolved.waveform(*role)))
            .collect();

        let combined = combine(channels.iter().map(|c| &c.all_scores));

        let mut transcripts: Vec<&str> = Vec::new();
        for channel in &channels {
            if !transcripts.contains(&channel.transcript.as_str()) {
                transcripts.push(&channel.transcript);
            }
        }
        let transcript = join_transcripts(transcripts);

        let max_anger = channels
            .iter()
            .map(|c| c.all_scores.anger())
            .fold(0.0f32, f32::max);
        let alerts = self.alert_detector().detect(&transcript, max_anger);

        let processing_time_ms = started.elapsed().as_millis() as u64;
        log::info!(
            "Call {call_id} analyzed in {processing_time_ms} ms ({} mode, {} channel(s), final score {:.3})",
            self.mode(),
            channels.len(),
            combined.final_score
        );

        CallAnalysisResult {
            call_id: call_id.to_string(),
            mode: self.mode(),
            metadata: CallMetadata {
                sample_rate: resolved.sample_rate,
                source_channels: resolved.source_channels,
                channels_analyzed: channels.len(),
            },
            alert_count: alerts.count(),
            alerts,
            transcript,
            combined,
            channels,
            processing_time_ms,
        }
    }

    /// Evaluate a streaming chunk assumed to be WAV.
    fn evaluate_chunk(&self, bytes: &[u8], role: SpeakerRole) -> ChunkResult {
        self.evaluate_chunk_as(bytes, DEFAULT_DECLARED_EXTENSION, role)
    }

    fn evaluate_chunk_as(
        &self,
        bytes: &[u8],
        declared_extension: &str,
        role: SpeakerRole,
    ) -> ChunkResult {
        quality_gate::evaluate_chunk(self, bytes, declared_extension, role)
    }
}
