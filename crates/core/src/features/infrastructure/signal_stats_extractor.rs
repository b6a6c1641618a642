use std::sync::Arc;

use ndarray::Array2;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::features::domain::embedding::Embedding;
use crate::features::domain::feature_extractor::FeatureExtractor;
use crate::shared::constants::{EMBEDDING_FRAMES, EMBEDDING_WIDTH};

/// 20 ms at 16 kHz.
pub const FRAME_SAMPLES: usize = 320;

pub const RMS_COLUMN: usize = 0;
pub const CENTROID_COLUMN: usize = 1;
pub const PEAK_COLUMN: usize = 2;
pub const PRESENT_COLUMN: usize = 3;

/// Model-free extractor storing per-frame signal statistics.
///
/// Each row describes one 20 ms frame: RMS energy, spectral centroid as a
/// fraction of Nyquist, peak amplitude, and a flag separating real frames
/// from padding. Remaining columns are zero.
pub struct SignalStatsExtractor {
    fft: Arc<dyn Fft<f32>>,
}

impl SignalStatsExtractor {
    pub fn new() -> Self {
        Self {
            fft: FftPlanner::new().plan_fft_forward(FRAME_SAMPLES),
        }
    }

    fn centroid(&self, frame: &[f32]) -> f32 {
        let mut buffer: Vec<Complex<f32>> = (0..FRAME_SAMPLES)
            .map(|i| Complex::new(frame.get(i).copied().unwrap_or(0.0), 0.0))
            .collect();
        self.fft.process(&mut buffer);

        let nyquist_bin = FRAME_SAMPLES / 2;
        let (weighted, total) = buffer[..=nyquist_bin]
            .iter()
            .enumerate()
            .fold((0.0f32, 0.0f32), |(w, t), (k, c)| {
                let mag = c.norm();
                (w + k as f32 * mag, t + mag)
            });
        if total <= f32::EPSILON {
            return 0.0;
        }
        (weighted / total / nyquist_bin as f32).clamp(0.0, 1.0)
    }
}

impl Default for SignalStatsExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor for SignalStatsExtractor {
    fn name(&self) -> &'static str {
        "signal-stats"
    }

    fn embed(&self, samples: &[f32]) -> Result<Embedding, Box<dyn std::error::Error>> {
        let frames: Vec<&[f32]> = samples.chunks(FRAME_SAMPLES).take(EMBEDDING_FRAMES).collect();
        let mut rows = Array2::<f32>::zeros((frames.len(), EMBEDDING_WIDTH));
        for (i, frame) in frames.iter().enumerate() {
            rows[[i, RMS_COLUMN]] = crate::audio::domain::audio_segment::rms(frame);
            rows[[i, CENTROID_COLUMN]] = self.centroid(frame);
            rows[[i, PEAK_COLUMN]] = frame.iter().fold(0.0f32, |m, s| m.max(s.abs()));
            rows[[i, PRESENT_COLUMN]] = 1.0;
        }
        Ok(Embedding::from_frames(rows.view())?)
    }
}

/// Aggregate statistics over the real (non-padding) frames of a signal-stats embedding.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SignalSummary {
    pub frames: usize,
    pub mean_rms: f32,
    pub mean_centroid: f32,
    pub max_peak: f32,
}

impl SignalSummary {
    pub fn from_embedding(embedding: &Embedding) -> Self {
        let view = embedding.view();
        let mut summary = SignalSummary::default();
        let (mut rms_sum, mut centroid_sum) = (0.0f64, 0.0f64);
        for row in view.rows() {
            if row[PRESENT_COLUMN] < 0.5 {
                continue;
            }
            summary.frames += 1;
            rms_sum += row[RMS_COLUMN] as f64;
            centroid_sum += row[CENTROID_COLUMN] as f64;
            summary.max_peak = summary.max_peak.max(row[PEAK_COLUMN]);
        }
        if summary.frames > 0 {
            summary.mean_rms = (rms_sum / summary.frames as f64) as f32;
            summary.mean_centroid = (centroid_sum / summary.frames as f64) as f32;
        }
        summary
    }
}
