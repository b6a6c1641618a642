/// A segment of decoded audio: interleaved PCM samples normalized to [-1.0, 1.0].
#[derive(Clone, Debug, PartialEq)]
pub struct AudioSegment {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioSegment {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels: channels.max(1),
        }
    }

    /// Mono silence of the given length.
    pub fn silence(duration_secs: f64, sample_rate: u32) -> Self {
        let len = (duration_secs * sample_rate as f64) as usize;
        Self::new(vec![0.0; len], sample_rate, 1)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    /// De-interleave one channel. Out-of-range indices yield an empty vector.
    pub fn channel(&self, index: u16) -> Vec<f32> {
        if index >= self.channels {
            return Vec::new();
        }
        self.samples
            .iter()
            .skip(index as usize)
            .step_by(self.channels as usize)
            .copied()
            .collect()
    }

    /// Collapse to one channel by averaging each frame.
    pub fn to_mono(&self) -> AudioSegment {
        if self.channels == 1 {
            return self.clone();
        }
        let ch = self.channels as usize;
        let mono = self
            .samples
            .chunks_exact(ch)
            .map(|frame| frame.iter().sum::<f32>() / ch as f32)
            .collect();
        AudioSegment::new(mono, self.sample_rate, 1)
    }

    pub fn peak(&self) -> f32 {
        self.samples
            .iter()
            .filter(|s| s.is_finite())
            .fold(0.0f32, |acc, s| acc.max(s.abs()))
    }

    pub fn rms(&self) -> f32 {
        rms(&self.samples)
    }

    /// Scale so the peak is 1.0 when it currently exceeds 1.0; otherwise unchanged.
    pub fn peak_normalized(mut self) -> AudioSegment {
        let peak = self.peak();
        if peak > 1.0 {
            for s in self.samples.iter_mut() {
                *s /= peak;
            }
        }
        self
    }
}

/// Root-mean-square energy of a sample slice; 0.0 when empty.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples
        .iter()
        .filter(|s| s.is_finite())
        .map(|s| (*s as f64) * (*s as f64))
        .sum();
    (sum_sq / samples.len() as f64).sqrt() as f32
}
