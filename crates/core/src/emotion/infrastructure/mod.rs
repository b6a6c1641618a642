pub mod heuristic_scorer;
pub mod onnx_regression_head;
pub mod seeded_scorer;

use std::path::Path;

use crate::emotion::domain::emotion::Emotion;
use crate::emotion::domain::regression_head::RegressionHead;
use crate::shared::constants::head_file_name;

use onnx_regression_head::OnnxRegressionHead;

/// Load every head whose model file resolves.
///
/// `locate` maps a file name to a local path. Missing or unloadable heads
/// are logged and skipped; their emotions will score 0.0.
pub fn load_heads<F>(mut locate: F) -> Vec<Box<dyn RegressionHead>>
where
    F: FnMut(&str) -> Option<std::path::PathBuf>,
{
    let mut heads: Vec<Box<dyn RegressionHead>> = Vec::new();
    for emotion in Emotion::ALL {
        let file_name = head_file_name(emotion.stored_name());
        let Some(path) = locate(&file_name) else {
            log::warn!("No model for {emotion} ({file_name}); it will score 0");
            continue;
        };
        match load_head(emotion, &path) {
            Ok(head) => heads.push(head),
            Err(e) => log::warn!("Failed to load {emotion} head from {}: {e}", path.display()),
        }
    }
    log::info!("Loaded {}/{} emotion heads", heads.len(), Emotion::ALL.len());
    heads
}

fn load_head(
    emotion: Emotion,
    path: &Path,
) -> Result<Box<dyn RegressionHead>, Box<dyn std::error::Error>> {
    Ok(Box::new(OnnxRegressionHead::new(emotion, path)?))
}
