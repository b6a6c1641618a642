use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::audio::domain::channel_resolver::ChannelResolver;
use crate::audio::domain::speech_recognizer::SpeechRecognizer;
use crate::audio::infrastructure::decoders_for;
use crate::audio::infrastructure::whisper_recognizer::WhisperRecognizer;
use crate::emotion::domain::alerts::{AlertDetector, AlertLexicon, LexiconError};
use crate::emotion::domain::ensemble::EmotionEnsemble;
use crate::emotion::infrastructure::load_heads;
use crate::features::infrastructure::onnx_encoder_extractor::OnnxEncoderExtractor;
use crate::shared::config::{ConfigError, EngineConfig};
use crate::shared::model_resolver::{self, ModelResolveError};

use super::engine::EmotionEngine;
use super::fallback_pipeline::FallbackPipeline;
use super::full_pipeline::FullPipeline;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Lexicon(#[from] LexiconError),
    #[error("model {name} unavailable: {source}")]
    ModelUnavailable {
        name: String,
        #[source]
        source: ModelResolveError,
    },
    #[error("failed to load {name}: {reason}")]
    ModelLoad { name: String, reason: String },
    #[error("only {loaded} emotion head(s) loaded, {required} required")]
    InsufficientHeads { loaded: usize, required: usize },
    #[error("engine initialization lock poisoned")]
    Poisoned,
}

/// Creates the best available engine, preferring the full model pipeline.
///
/// Probes the encoder and emotion heads once. If they load, returns the full
/// pipeline; otherwise falls back to the model-free pipeline. Logs which
/// variant is selected. Only invalid configuration is fatal.
pub fn create_engine(config: &EngineConfig) -> Result<Arc<dyn EmotionEngine>, EngineError> {
    config.validate()?;
    let lexicon = match &config.lexicon_path {
        Some(path) => AlertLexicon::load(path)?,
        None => AlertLexicon::default(),
    };
    let resolver = ChannelResolver::new(decoders_for(&config.decoders));
    log::debug!("Decoders: {:?}", resolver.decoder_names());

    if config.force_fallback {
        log::info!("Fallback forced by configuration, using {:?} scoring", config.fallback);
        return Ok(fallback(config, resolver, lexicon));
    }

    match load_full_models(config) {
        Ok(models) => {
            log::info!(
                "Using full pipeline ({} emotion heads, transcription {})",
                models.ensemble.len(),
                if models.recognizer.is_some() { "on" } else { "off" }
            );
            Ok(Arc::new(FullPipeline::new(
                resolver,
                Box::new(models.extractor),
                Box::new(models.ensemble),
                models.recognizer,
                AlertDetector::new(lexicon),
                config.language.clone(),
            )))
        }
        Err(e) => {
            log::warn!(
                "Full pipeline unavailable ({e}), using {:?} fallback",
                config.fallback
            );
            Ok(fallback(config, resolver, lexicon))
        }
    }
}

fn fallback(
    config: &EngineConfig,
    resolver: ChannelResolver,
    lexicon: AlertLexicon,
) -> Arc<dyn EmotionEngine> {
    Arc::new(FallbackPipeline::new(
        resolver,
        config.fallback,
        AlertDetector::new(lexicon),
        config.language.clone(),
    ))
}

struct FullModels {
    extractor: OnnxEncoderExtractor,
    ensemble: EmotionEnsemble,
    recognizer: Option<Box<dyn SpeechRecognizer>>,
}

fn locate(config: &EngineConfig, name: &str) -> Result<PathBuf, EngineError> {
    model_resolver::resolve(
        name,
        config.download_base_url.as_deref(),
        config.models_dir.as_deref(),
        None,
    )
    .map_err(|source| EngineError::ModelUnavailable {
        name: name.to_string(),
        source,
    })
}

fn load_full_models(config: &EngineConfig) -> Result<FullModels, EngineError> {
    let encoder_path = locate(config, &config.encoder_model)?;
    let extractor =
        OnnxEncoderExtractor::new(&encoder_path).map_err(|e| EngineError::ModelLoad {
            name: config.encoder_model.clone(),
            reason: e.to_string(),
        })?;

    let heads = load_heads(|name| match locate(config, name) {
        Ok(path) => Some(path),
        Err(e) => {
            log::debug!("{e}");
            None
        }
    });
    let required = config.min_heads.max(1);
    if heads.len() < required {
        return Err(EngineError::InsufficientHeads {
            loaded: heads.len(),
            required,
        });
    }

    Ok(FullModels {
        extractor,
        ensemble: EmotionEnsemble::new(heads),
        recognizer: load_recognizer(config),
    })
}

/// Transcription is optional; failures here never block the full pipeline.
fn load_recognizer(config: &EngineConfig) -> Option<Box<dyn SpeechRecognizer>> {
    if !config.transcription {
        return None;
    }
    let loaded = locate(config, &config.whisper_model).and_then(|path| {
        WhisperRecognizer::new(&path).map_err(|e| EngineError::ModelLoad {
            name: config.whisper_model.clone(),
            reason: e.to_string(),
        })
    });
    match loaded {
        Ok(recognizer) => Some(Box::new(recognizer)),
        Err(e) => {
            log::warn!("Transcription disabled: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::analysis::EngineMode;
    use crate::shared::config::FallbackStrategy;
    use tempfile::TempDir;

    fn offline_config(models_dir: &TempDir) -> EngineConfig {
        EngineConfig {
            models_dir: Some(models_dir.path().to_path_buf()),
            encoder_model: "callsense-test-missing-encoder.onnx".into(),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_missing_models_fall_back() {
        let tmp = TempDir::new().unwrap();
        let engine = create_engine(&offline_config(&tmp)).unwrap();
        assert_eq!(engine.mode(), EngineMode::Fallback);
    }

    #[test]
    fn test_forced_fallback_skips_probe() {
        let tmp = TempDir::new().unwrap();
        let config = EngineConfig {
            force_fallback: true,
            fallback: FallbackStrategy::Seeded,
            ..offline_config(&tmp)
        };
        assert_eq!(create_engine(&config).unwrap().mode(), EngineMode::Fallback);
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = EngineConfig {
            workers: 0,
            ..offline_config(&tmp)
        };
        assert!(matches!(create_engine(&config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_unreadable_lexicon_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let config = EngineConfig {
            lexicon_path: Some(tmp.path().join("missing-lexicon.json")),
            ..offline_config(&tmp)
        };
        assert!(matches!(create_engine(&config), Err(EngineError::Lexicon(_))));
    }

    #[test]
    fn test_corrupt_encoder_falls_back() {
        let tmp = TempDir::new().unwrap();
        let name = "callsense-test-corrupt-encoder.onnx";
        std::fs::write(tmp.path().join(name), b"not a model").unwrap();
        let config = EngineConfig {
            encoder_model: name.into(),
            ..offline_config(&tmp)
        };
        assert_eq!(create_engine(&config).unwrap().mode(), EngineMode::Fallback);
    }
}
