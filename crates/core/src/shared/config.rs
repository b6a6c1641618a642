use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{ENCODER_MODEL_NAME, WHISPER_MODEL_FILENAME};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Scoring strategy used when the full model pipeline is unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackStrategy {
    /// Bounded functions of RMS energy and spectral centroid.
    #[default]
    Heuristic,
    /// Uniform draws from a PRNG seeded by the signal's RMS.
    Seeded,
}

impl std::str::FromStr for FallbackStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heuristic" => Ok(Self::Heuristic),
            "seeded" => Ok(Self::Seeded),
            other => Err(ConfigError::Invalid(format!(
                "fallback must be 'heuristic' or 'seeded', got '{other}'"
            ))),
        }
    }
}

/// One entry of the channel resolver's ordered decode strategy list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DecoderKind {
    Wav,
    Ffmpeg,
    FfmpegCli,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding pre-provisioned model files.
    pub models_dir: Option<PathBuf>,
    /// Base URL models are downloaded from when missing locally. Disabled when unset.
    pub download_base_url: Option<String>,
    pub encoder_model: String,
    pub whisper_model: String,
    pub transcription: bool,
    /// Language hint passed to the recognizer; matches the alert lexicon.
    pub language: String,
    /// Minimum number of regression heads for the full pipeline to be usable.
    pub min_heads: usize,
    pub fallback: FallbackStrategy,
    pub force_fallback: bool,
    pub workers: usize,
    pub queue_capacity: usize,
    pub decoders: Vec<DecoderKind>,
    pub lexicon_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            models_dir: None,
            download_base_url: None,
            encoder_model: ENCODER_MODEL_NAME.to_string(),
            whisper_model: WHISPER_MODEL_FILENAME.to_string(),
            transcription: true,
            language: "es".to_string(),
            min_heads: 1,
            fallback: FallbackStrategy::Heuristic,
            force_fallback: false,
            workers: 2,
            queue_capacity: 8,
            decoders: vec![DecoderKind::Wav, DecoderKind::Ffmpeg, DecoderKind::FfmpegCli],
            lexicon_path: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::Invalid("queue_capacity must be at least 1".into()));
        }
        if self.decoders.is_empty() {
            return Err(ConfigError::Invalid("at least one decoder is required".into()));
        }
        Ok(())
    }
}
