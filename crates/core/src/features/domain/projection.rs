use ndarray::{Array1, Array2, ArrayView2, Axis};
use thiserror::Error;

use crate::shared::constants::EMBEDDING_WIDTH;

#[derive(Error, Debug, PartialEq)]
pub enum ProjectionError {
    #[error("projection weights must be (in, {EMBEDDING_WIDTH}), got ({rows}, {cols})")]
    WeightShape { rows: usize, cols: usize },
    #[error("projection bias must have {EMBEDDING_WIDTH} entries, got {0}")]
    BiasShape(usize),
    #[error("input frames are {got} wide, projection expects {expected}")]
    InputWidth { expected: usize, got: usize },
}

/// Affine map from the encoder's native width to `EMBEDDING_WIDTH`.
#[derive(Debug, Clone)]
pub struct LinearProjection {
    weights: Array2<f32>,
    bias: Array1<f32>,
}

impl LinearProjection {
    pub fn new(weights: Array2<f32>, bias: Array1<f32>) -> Result<Self, ProjectionError> {
        if weights.ncols() != EMBEDDING_WIDTH || weights.nrows() == 0 {
            return Err(ProjectionError::WeightShape {
                rows: weights.nrows(),
                cols: weights.ncols(),
            });
        }
        if bias.len() != EMBEDDING_WIDTH {
            return Err(ProjectionError::BiasShape(bias.len()));
        }
        Ok(Self { weights, bias })
    }

    /// Copy the first `min(in_width, EMBEDDING_WIDTH)` dimensions, zero the rest.
    pub fn identity(in_width: usize) -> Self {
        let mut weights = Array2::zeros((in_width.max(1), EMBEDDING_WIDTH));
        for i in 0..in_width.min(EMBEDDING_WIDTH) {
            weights[[i, i]] = 1.0;
        }
        Self {
            weights,
            bias: Array1::zeros(EMBEDDING_WIDTH),
        }
    }

    pub fn in_width(&self) -> usize {
        self.weights.nrows()
    }

    pub fn project(&self, frames: ArrayView2<'_, f32>) -> Result<Array2<f32>, ProjectionError> {
        if frames.ncols() != self.in_width() {
            return Err(ProjectionError::InputWidth {
                expected: self.in_width(),
                got: frames.ncols(),
            });
        }
        Ok(frames.dot(&self.weights) + &self.bias.view().insert_axis(Axis(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_identity_from_narrow_encoder_copies_then_zero_fills() {
        let projection = LinearProjection::identity(2);
        let out = projection.project(array![[0.5, -1.0]].view()).unwrap();
        assert_eq!(out.dim(), (1, EMBEDDING_WIDTH));
        assert_eq!(out[[0, 0]], 0.5);
        assert_eq!(out[[0, 1]], -1.0);
        assert!(out.row(0).iter().skip(2).all(|v| *v == 0.0));
    }

    #[test]
    fn test_identity_at_native_width_passes_through() {
        let frames = Array2::from_shape_fn((3, EMBEDDING_WIDTH), |(r, c)| (r * 10 + c) as f32);
        let out = LinearProjection::identity(EMBEDDING_WIDTH)
            .project(frames.view())
            .unwrap();
        assert_eq!(out, frames);
    }

    #[test]
    fn test_custom_weights_and_bias_apply() {
        let weights = Array2::from_elem((2, EMBEDDING_WIDTH), 0.5f32);
        let bias = Array1::from_elem(EMBEDDING_WIDTH, 1.0f32);
        let projection = LinearProjection::new(weights, bias).unwrap();
        let out = projection.project(array![[2.0, 4.0]].view()).unwrap();
        assert_relative_eq!(out[[0, 0]], 4.0);
        assert_relative_eq!(out[[0, EMBEDDING_WIDTH - 1]], 4.0);
    }

    #[test]
    fn test_shape_errors() {
        assert!(matches!(
            LinearProjection::new(Array2::zeros((4, 10)), Array1::zeros(EMBEDDING_WIDTH)),
            Err(ProjectionError::WeightShape { .. })
        ));
        assert!(matches!(
            LinearProjection::new(Array2::zeros((4, EMBEDDING_WIDTH)), Array1::zeros(3)),
            Err(ProjectionError::BiasShape(3))
        ));
        assert!(matches!(
            LinearProjection::identity(4).project(Array2::zeros((1, 5)).view()),
            Err(ProjectionError::InputWidth { expected: 4, got: 5 })
        ));
    }
}
