use std::path::Path;
use std::sync::Mutex;

use ndarray::Axis;

use crate::emotion::domain::emotion::Emotion;
use crate::emotion::domain::regression_head::RegressionHead;
use crate::features::domain::embedding::Embedding;
use crate::shared::execution_provider::open_session;

/// Feed-forward regressor exported to ONNX.
///
/// Input `[1, EMBEDDING_FRAMES, EMBEDDING_WIDTH]`, output one raw scalar.
/// Dropout is already folded out of the exported graph.
pub struct OnnxRegressionHead {
    emotion: Emotion,
    session: Mutex<ort::session::Session>,
}

impl OnnxRegressionHead {
    pub fn new(emotion: Emotion, model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = open_session(model_path, 1)?;
        Ok(Self {
            emotion,
            session: Mutex::new(session),
        })
    }
}

impl RegressionHead for OnnxRegressionHead {
    fn emotion(&self) -> Emotion {
        self.emotion
    }

    fn predict_raw(&self, embedding: &Embedding) -> Result<f32, Box<dyn std::error::Error>> {
        let input = embedding.as_array().clone().insert_axis(Axis(0));
        let input_value = ort::value::Tensor::from_array(input)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| format!("{} head session lock poisoned", self.emotion))?;
        let outputs = session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err(format!("{} head produced no outputs", self.emotion).into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;
        match data.first() {
            Some(raw) => Ok(*raw),
            None => Err(format!("{} head returned an empty tensor", self.emotion).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_missing_model_is_error() {
        let result = OnnxRegressionHead::new(Emotion::Anger, Path::new("/nonexistent/model.onnx"));
        assert!(result.is_err());
    }
}
