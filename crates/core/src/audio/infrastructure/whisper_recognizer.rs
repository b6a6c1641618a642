use std::path::{Path, PathBuf};

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::domain::audio_segment::AudioSegment;
use crate::audio::domain::speech_recognizer::{SpeechRecognizer, TranscriptionOptions};
use crate::audio::domain::transcript::drop_repeated_ngrams;
use crate::shared::constants::TARGET_SAMPLE_RATE;
use crate::shared::execution_provider::available_threads;

/// Speech recognizer using whisper.cpp via whisper-rs.
///
/// The model is loaded once; each request gets its own decoder state, so one
/// recognizer can serve concurrent callers.
pub struct WhisperRecognizer {
    model_path: PathBuf,
    context: WhisperContext,
}

impl WhisperRecognizer {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !model_path.exists() {
            return Err(format!("Whisper model not found at: {}", model_path.display()).into());
        }
        let context = WhisperContext::new_with_params(
            model_path.to_str().ok_or("Invalid model path")?,
            WhisperContextParameters::default(),
        )
        .map_err(|e| format!("Failed to load Whisper model: {e}"))?;

        log::info!("Loaded Whisper model {}", model_path.display());
        Ok(Self {
            model_path: model_path.to_path_buf(),
            context,
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl SpeechRecognizer for WhisperRecognizer {
    fn transcribe(
        &self,
        audio: &AudioSegment,
        options: &TranscriptionOptions,
    ) -> Result<String, Box<dyn std::error::Error>> {
        if audio.sample_rate() != TARGET_SAMPLE_RATE || audio.channels() != 1 {
            return Err(format!(
                "Whisper expects {TARGET_SAMPLE_RATE} Hz mono, got {} Hz x{}",
                audio.sample_rate(),
                audio.channels()
            )
            .into());
        }

        let mut state = self
            .context
            .create_state()
            .map_err(|e| format!("Failed to create Whisper state: {e}"))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_language(Some(&options.language));
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_temperature(0.0);
        params.set_n_threads(available_threads().min(4) as i32);
        if let Some(max_tokens) = options.max_tokens {
            params.set_max_tokens(max_tokens);
        }
        params.set_single_segment(options.single_segment);
        if options.single_segment {
            params.set_no_context(true);
            params.set_suppress_blank(true);
            params.set_temperature_inc(0.0);
        }

        state
            .full(params, audio.samples())
            .map_err(|e| format!("Whisper inference failed: {e}"))?;

        let mut pieces: Vec<String> = Vec::new();
        for seg_idx in 0..state.full_n_segments() {
            let Some(segment) = state.get_segment(seg_idx) else {
                continue;
            };
            for tok_idx in 0..segment.n_tokens() {
                let Some(token) = segment.get_token(tok_idx) else {
                    continue;
                };
                let Ok(piece) = token.to_str() else {
                    continue;
                };
                // Control tokens such as [_BEG_] and <|endoftext|>.
                let trimmed = piece.trim();
                if trimmed.starts_with("[_") || trimmed.starts_with("<|") {
                    continue;
                }
                pieces.push(piece.to_string());
            }
        }

        let text: String = match options.no_repeat_ngram {
            Some(n) => drop_repeated_ngrams(pieces.as_slice(), n).concat(),
            None => pieces.concat(),
        };
        Ok(text.trim().to_string())
    }
}
