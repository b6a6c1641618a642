use crate::audio::domain::audio_segment::AudioSegment;
use crate::audio::infrastructure::resampler::resample;
use crate::features::domain::embedding::Embedding;
use crate::features::domain::feature_extractor::FeatureExtractor;
use crate::shared::constants::TARGET_SAMPLE_RATE;

/// Mono, peak-normalized, 16 kHz samples ready for an extractor.
pub fn prepare(audio: &AudioSegment) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    let mono = audio.to_mono().peak_normalized();
    let rate = mono.sample_rate();
    let samples: Vec<f32> = mono
        .into_samples()
        .into_iter()
        .map(|s| if s.is_finite() { s } else { 0.0 })
        .collect();
    resample(&samples, rate, TARGET_SAMPLE_RATE)
}

/// Run `extractor` on `audio`, substituting a zero embedding on any failure.
pub fn extract(extractor: &dyn FeatureExtractor, audio: &AudioSegment) -> Embedding {
    let result = prepare(audio).and_then(|samples| extractor.embed(&samples));
    match result {
        Ok(embedding) => embedding,
        Err(e) => {
            log::warn!("{} extraction failed, using zero embedding: {e}", extractor.name());
            Embedding::zeros()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct EchoExtractor;

    impl FeatureExtractor for EchoExtractor {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn embed(&self, samples: &[f32]) -> Result<Embedding, Box<dyn std::error::Error>> {
            let frames = ndarray::Array2::from_shape_fn(
                (samples.len(), crate::shared::constants::EMBEDDING_WIDTH),
                |(r, _)| samples[r],
            );
            Ok(Embedding::from_frames(frames.view())?)
        }
    }

    struct BrokenExtractor;

    impl FeatureExtractor for BrokenExtractor {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn embed(&self, _: &[f32]) -> Result<Embedding, Box<dyn std::error::Error>> {
            Err("encoder crashed".into())
        }
    }

    #[test]
    fn test_prepare_averages_channels_and_normalizes_peak() {
        let stereo = AudioSegment::new(vec![4.0, 0.0, -1.0, -1.0], TARGET_SAMPLE_RATE, 2);
        let prepared = prepare(&stereo).unwrap();
        assert_eq!(prepared.len(), 2);
        assert_relative_eq!(prepared[0], 1.0);
        assert_relative_eq!(prepared[1], -0.5);
    }

    #[test]
    fn test_prepare_resamples_to_target_rate() {
        let audio = AudioSegment::silence(1.0, 8000);
        let prepared = prepare(&audio).unwrap();
        let expected = TARGET_SAMPLE_RATE as f32;
        assert!((prepared.len() as f32 - expected).abs() / expected < 0.05);
    }

    #[test]
    fn test_extract_passes_prepared_samples() {
        let audio = AudioSegment::new(vec![0.25, 0.5], TARGET_SAMPLE_RATE, 1);
        let embedding = extract(&EchoExtractor, &audio);
        assert_eq!(embedding.view()[[1, 0]], 0.5);
    }

    #[test]
    fn test_extract_failure_yields_zero_embedding() {
        let audio = AudioSegment::silence(0.5, TARGET_SAMPLE_RATE);
        assert!(extract(&BrokenExtractor, &audio).is_zero());
    }
}
