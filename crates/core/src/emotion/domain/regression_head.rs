use super::emotion::Emotion;
use crate::features::domain::embedding::Embedding;

/// One trained per-emotion regressor.
///
/// Heads are stateless from the caller's point of view and may be evaluated
/// concurrently. `predict_raw` returns the pre-logistic scalar.
pub trait RegressionHead: Send + Sync {
    fn emotion(&self) -> Emotion;

    fn predict_raw(&self, embedding: &Embedding) -> Result<f32, Box<dyn std::error::Error>>;
}
