use ndarray::{s, Array2, ArrayView2};

use crate::shared::constants::{EMBEDDING_FRAMES, EMBEDDING_WIDTH};

/// Fixed-shape `(EMBEDDING_FRAMES, EMBEDDING_WIDTH)` feature matrix for one channel.
///
/// Rows are time frames. The shape invariant holds for every value of this
/// type; shorter inputs are zero-padded at the tail and longer ones truncated.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    data: Array2<f32>,
}

impl Embedding {
    pub fn zeros() -> Self {
        Self {
            data: Array2::zeros((EMBEDDING_FRAMES, EMBEDDING_WIDTH)),
        }
    }

    /// Pad or truncate `frames` (rows of width `EMBEDDING_WIDTH`) to the canonical length.
    ///
    /// Non-finite values are replaced with zero.
    pub fn from_frames(frames: ArrayView2<'_, f32>) -> Result<Self, String> {
        if frames.ncols() != EMBEDDING_WIDTH {
            return Err(format!(
                "embedding frames must be {EMBEDDING_WIDTH} wide, got {}",
                frames.ncols()
            ));
        }
        let rows = frames.nrows().min(EMBEDDING_FRAMES);
        let mut data = Array2::zeros((EMBEDDING_FRAMES, EMBEDDING_WIDTH));
        data.slice_mut(s![..rows, ..]).assign(&frames.slice(s![..rows, ..]));
        data.mapv_inplace(|v| if v.is_finite() { v } else { 0.0 });
        Ok(Self { data })
    }

    pub fn view(&self) -> ArrayView2<'_, f32> {
        self.data.view()
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.data
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|v| *v == 0.0)
    }
}

impl Default for Embedding {
    fn default() -> Self {
        Self::zeros()
    }
}
