use crate::audio::domain::audio_segment::rms;
use crate::audio::domain::channel_resolver::split_channels;
use crate::audio::domain::speech_recognizer::TranscriptionOptions;
use crate::audio::domain::transcript::sanitize_preview_transcript;
use crate::audio::domain::waveform::SpeakerRole;
use crate::emotion::domain::aggregator::PreviewAdvice;
use crate::shared::constants::{
    MIN_CHUNK_BYTES, PREVIEW_MAX_TOKENS, SILENCE_PEAK_THRESHOLD, SILENCE_RMS_THRESHOLD,
    SILENCE_TRANSCRIPT,
};

use super::analysis::{ChunkResult, GateDecision};
use super::engine::EmotionEngine;

/// Chunks below [`MIN_CHUNK_BYTES`] are rejected without decoding.
pub fn admits(byte_len: usize) -> bool {
    byte_len >= MIN_CHUNK_BYTES
}

/// Too quiet for transcription: low RMS energy or low peak amplitude.
pub fn is_silence(samples: &[f32]) -> bool {
    let peak = samples
        .iter()
        .filter(|s| s.is_finite())
        .fold(0.0f32, |m, s| m.max(s.abs()));
    rms(samples) < SILENCE_RMS_THRESHOLD || peak < SILENCE_PEAK_THRESHOLD
}

/// Cheap admission control in front of embedding and scoring.
///
/// Stateless; each chunk is judged on its own bytes.
pub fn evaluate_chunk<E: EmotionEngine + ?Sized>(
    engine: &E,
    bytes: &[u8],
    declared_extension: &str,
    role: SpeakerRole,
) -> ChunkResult {
    if !admits(bytes.len()) {
        log::debug!("Chunk of {} bytes rejected as too short", bytes.len());
        return ChunkResult::rejected(role, GateDecision::TooShort, PreviewAdvice::TooShort);
    }

    let Some(decoded) = engine.resolver().decode(bytes, declared_extension) else {
        log::warn!("Chunk of {} bytes could not be decoded", bytes.len());
        return ChunkResult::rejected(role, GateDecision::Undecodable, PreviewAdvice::Undecodable);
    };
    let waveform = split_channels(&decoded).waveform(role).clone();

    let silent = is_silence(waveform.samples());
    let embedding = engine.extract(&waveform.audio);
    let scores = engine.score(&embedding);

    let (gate, transcript) = if silent {
        (GateDecision::Silence, SILENCE_TRANSCRIPT.to_string())
    } else {
        let options = TranscriptionOptions::preview(engine.language(), PREVIEW_MAX_TOKENS);
        let transcript = match engine.transcribe(&waveform.audio, &options) {
            Ok(raw) => sanitize_preview_transcript(&raw),
            Err(e) => {
                log::debug!("No preview transcript: {e}");
                String::new()
            }
        };
        (GateDecision::Speech, transcript)
    };

    let alerts = engine.alert_detector().detect(&transcript, scores.anger());
    ChunkResult::scored(role, gate, scores, transcript, alerts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::empty(0, false)]
    #[case::just_below(199, false)]
    #[case::boundary(200, true)]
    fn test_admits(#[case] len: usize, #[case] expected: bool) {
        assert_eq!(admits(len), expected);
    }

    #[rstest]
    #[case::digital_silence(vec![0.0; 1600], true)]
    #[case::low_peak(vec![0.04; 1600], true)]
    #[case::single_click({ let mut v = vec![0.0; 16000]; v[0] = 0.9; v }, true)]
    #[case::speech_level(vec![0.2; 1600], false)]
    #[case::empty(Vec::new(), true)]
    fn test_is_silence(#[case] samples: Vec<f32>, #[case] expected: bool) {
        assert_eq!(is_silence(&samples), expected);
    }
}
