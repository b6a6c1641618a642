use std::path::Path;
use std::sync::{Mutex, OnceLock};

use ndarray::Ix2;

use crate::audio::infrastructure::mel::WhisperLogMel;
use crate::features::domain::embedding::Embedding;
use crate::features::domain::feature_extractor::FeatureExtractor;
use crate::features::domain::projection::LinearProjection;
use crate::shared::execution_provider::{available_threads, open_session};

/// Whisper encoder exported to ONNX, followed by a linear projection.
///
/// Input: `[1, 80, 3000]` log-mel features. Output: `[1, T, W0]` hidden
/// states, projected to the embedding width and fitted to the canonical
/// frame count.
pub struct OnnxEncoderExtractor {
    session: Mutex<ort::session::Session>,
    mel: WhisperLogMel,
    projection: OnceLock<LinearProjection>,
}

impl OnnxEncoderExtractor {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = open_session(model_path, available_threads().min(4))?;
        log::info!("Loaded encoder {}", model_path.display());
        Ok(Self {
            session: Mutex::new(session),
            mel: WhisperLogMel::new(),
            projection: OnceLock::new(),
        })
    }

    /// Use explicit projection weights instead of the width-derived identity map.
    pub fn with_projection(self, projection: LinearProjection) -> Self {
        let _ = self.projection.set(projection);
        self
    }

    fn encode(&self, samples: &[f32]) -> Result<ndarray::Array2<f32>, Box<dyn std::error::Error>> {
        let features = self.mel.compute(samples);
        let input = ort::value::Tensor::from_array(features)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| "encoder session lock poisoned")?;
        let outputs = session.run(ort::inputs![input])?;
        if outputs.len() == 0 {
            return Err("encoder produced no outputs".into());
        }
        let hidden = outputs[0].try_extract_array::<f32>()?;
        let shape = hidden.shape().to_vec();
        if shape.len() != 3 || shape[0] != 1 {
            return Err(format!("Unexpected encoder output shape: {shape:?}").into());
        }
        let frames = hidden
            .index_axis(ndarray::Axis(0), 0)
            .into_dimensionality::<Ix2>()?
            .to_owned();
        Ok(frames)
    }
}

impl FeatureExtractor for OnnxEncoderExtractor {
    fn name(&self) -> &'static str {
        "whisper-encoder"
    }

    fn embed(&self, samples: &[f32]) -> Result<Embedding, Box<dyn std::error::Error>> {
        let frames = self.encode(samples)?;
        let projection = self.projection.get_or_init(|| {
            log::info!(
                "Encoder width {}; using identity projection to embedding width",
                frames.ncols()
            );
            LinearProjection::identity(frames.ncols())
        });
        let projected = projection.project(frames.view())?;
        Ok(Embedding::from_frames(projected.view())?)
    }
}
