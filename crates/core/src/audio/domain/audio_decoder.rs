use thiserror::Error;

use super::audio_segment::AudioSegment;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{decoder}: unsupported input: {reason}")]
    Unsupported {
        decoder: &'static str,
        reason: String,
    },
    #[error("{decoder}: decoding failed: {reason}")]
    Failed {
        decoder: &'static str,
        reason: String,
    },
    #[error("{decoder}: decoded stream contains no samples")]
    Empty { decoder: &'static str },
    #[error("{decoder}: scratch file error: {source}")]
    Scratch {
        decoder: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Domain interface for one decode strategy of the channel resolver.
///
/// Implementations turn raw container bytes into interleaved PCM, keeping
/// every channel. Expected failures are returned, never panicked.
pub trait AudioDecoder: Send + Sync {
    fn name(&self) -> &'static str;

    fn decode(&self, bytes: &[u8], declared_extension: &str)
        -> Result<AudioSegment, DecodeError>;
}
