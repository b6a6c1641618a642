use std::f32::consts::PI;
use std::sync::Arc;

use ndarray::Array3;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::shared::constants::TARGET_SAMPLE_RATE;

pub const N_FFT: usize = 400;
pub const HOP_LENGTH: usize = 160;
pub const N_MELS: usize = 80;
/// Whisper always sees a 30 second window.
pub const CHUNK_SAMPLES: usize = 30 * TARGET_SAMPLE_RATE as usize;
pub const N_FRAMES: usize = CHUNK_SAMPLES / HOP_LENGTH;

/// Log-mel front end matching the Whisper encoder's expected input.
///
/// Audio is padded or trimmed to 30 s, framed with a Hann window, mapped to
/// 80 mel bands, then log-compressed and rescaled to roughly [-1, 1].
pub struct WhisperLogMel {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    filters: Vec<Vec<f32>>,
}

impl WhisperLogMel {
    pub fn new() -> Self {
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(N_FFT),
            window: hann_window(N_FFT),
            filters: mel_filterbank(N_FFT, N_MELS, TARGET_SAMPLE_RATE as f32),
        }
    }

    /// Features shaped `[1, N_MELS, N_FRAMES]` for 16 kHz mono input.
    pub fn compute(&self, samples: &[f32]) -> Array3<f32> {
        let mut padded = vec![0.0f32; CHUNK_SAMPLES + N_FFT];
        let take = samples.len().min(CHUNK_SAMPLES);
        let offset = N_FFT / 2;
        padded[offset..offset + take].copy_from_slice(&samples[..take]);

        let mut log_mel = Array3::<f32>::zeros((1, N_MELS, N_FRAMES));
        let mut buffer = vec![Complex::new(0.0f32, 0.0); N_FFT];
        let n_freqs = N_FFT / 2 + 1;

        for frame in 0..N_FRAMES {
            let start = frame * HOP_LENGTH;
            for (j, slot) in buffer.iter_mut().enumerate() {
                *slot = Complex::new(padded[start + j] * self.window[j], 0.0);
            }
            self.fft.process(&mut buffer);

            for (m, filter) in self.filters.iter().enumerate() {
                let energy: f32 = filter
                    .iter()
                    .zip(buffer.iter().take(n_freqs))
                    .map(|(w, c)| w * c.norm_sqr())
                    .sum();
                log_mel[[0, m, frame]] = energy.max(1e-10).log10();
            }
        }

        let max = log_mel.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let floor = max - 8.0;
        log_mel.mapv_inplace(|v| (v.max(floor) + 4.0) / 4.0);
        log_mel
    }
}

impl Default for WhisperLogMel {
    fn default() -> Self {
        Self::new()
    }
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
        .collect()
}

fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2595.0) - 1.0)
}

/// Triangular filters spaced evenly on the mel scale from 0 Hz to Nyquist,
/// area-normalized.
fn mel_filterbank(n_fft: usize, n_mels: usize, sample_rate: f32) -> Vec<Vec<f32>> {
    let n_freqs = n_fft / 2 + 1;
    let mel_max = hz_to_mel(sample_rate / 2.0);
    let points: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
        .collect();

    let mut filters = vec![vec![0.0f32; n_freqs]; n_mels];
    for (m, filter) in filters.iter_mut().enumerate() {
        let (left, center, right) = (points[m], points[m + 1], points[m + 2]);
        let norm = 2.0 / (right - left);
        for (j, weight) in filter.iter_mut().enumerate() {
            let freq = j as f32 * sample_rate / n_fft as f32;
            let w = if freq >= left && freq <= center {
                (freq - left) / (center - left)
            } else if freq > center && freq <= right {
                (right - freq) / (right - center)
            } else {
                0.0
            };
            *weight = w * norm;
        }
    }
    filters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_shape_is_fixed() {
        let mel = WhisperLogMel::new();
        assert_eq!(mel.compute(&[0.0; 1600]).shape(), &[1, N_MELS, N_FRAMES]);
        assert_eq!(
            mel.compute(&vec![0.1; CHUNK_SAMPLES * 2]).shape(),
            &[1, N_MELS, N_FRAMES]
        );
    }

    #[test]
    fn test_values_are_finite_and_bounded_by_dynamic_range() {
        let samples: Vec<f32> = (0..16000)
            .map(|i| (2.0 * PI * 300.0 * i as f32 / 16000.0).sin() * 0.5)
            .collect();
        let features = WhisperLogMel::new().compute(&samples);
        let max = features.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let min = features.iter().copied().fold(f32::INFINITY, f32::min);
        assert!(features.iter().all(|v| v.is_finite()));
        assert!(max - min <= 2.0 + 1e-4);
    }

    #[test]
    fn test_filterbank_covers_every_band() {
        let filters = mel_filterbank(N_FFT, N_MELS, 16000.0);
        assert_eq!(filters.len(), N_MELS);
        assert!(filters.iter().all(|f| f.iter().any(|w| *w > 0.0)));
    }
}
