use super::embedding::Embedding;

/// Domain interface for turning a prepared waveform into an embedding.
///
/// Input is 16 kHz mono in [-1.0, 1.0]; see
/// [`crate::features::infrastructure::preprocess`] for the shared preparation
/// steps and the zero-embedding fallback.
pub trait FeatureExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn embed(&self, samples: &[f32]) -> Result<Embedding, Box<dyn std::error::Error>>;
}
