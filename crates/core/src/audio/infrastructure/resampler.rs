use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

/// Resample mono audio with a windowed-sinc interpolator.
///
/// Returns the input unchanged when the rates already match.
pub fn resample(
    samples: &[f32],
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(format!("invalid resampling rates {from_rate} -> {to_rate}").into());
    }

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(
        to_rate as f64 / from_rate as f64,
        2.0,
        params,
        samples.len(),
        1,
    )?;

    let output = resampler.process(&[samples.to_vec()], None)?;
    Ok(output.into_iter().next().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_rate_is_identity() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&samples, 16000, 16000).unwrap(), samples);
    }

    #[test]
    fn test_downsample_halves_length_roughly() {
        let samples: Vec<f32> = (0..32000)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 32000.0).sin())
            .collect();
        let out = resample(&samples, 32000, 16000).unwrap();
        let expected = 16000f32;
        assert!(
            (out.len() as f32 - expected).abs() / expected < 0.05,
            "unexpected length {}",
            out.len()
        );
        assert!(out.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_zero_rate_is_error() {
        assert!(resample(&[0.5], 0, 16000).is_err());
    }
}
