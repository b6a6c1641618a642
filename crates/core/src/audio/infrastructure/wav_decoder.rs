use std::io::Cursor;

use hound::{SampleFormat, WavReader};

use crate::audio::domain::audio_decoder::{AudioDecoder, DecodeError};
use crate::audio::domain::audio_segment::AudioSegment;

const NAME: &str = "wav";

/// In-memory RIFF/WAVE decoder backed by hound.
///
/// Accepts integer PCM of 8 to 32 bits and 32-bit float, at any rate and
/// channel count. Samples stay interleaved and are scaled to [-1.0, 1.0].
pub struct WavDecoder;

impl WavDecoder {
    pub fn decode_bytes(bytes: &[u8]) -> Result<AudioSegment, DecodeError> {
        let reader = WavReader::new(Cursor::new(bytes)).map_err(|e| DecodeError::Unsupported {
            decoder: NAME,
            reason: e.to_string(),
        })?;
        let spec = reader.spec();

        let samples: Vec<f32> = match spec.sample_format {
            SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(|e| failed(e.to_string()))?,
            SampleFormat::Int => {
                if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                    return Err(DecodeError::Unsupported {
                        decoder: NAME,
                        reason: format!("{} bits per sample", spec.bits_per_sample),
                    });
                }
                let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()
                    .map_err(|e| failed(e.to_string()))?
            }
        };

        if samples.is_empty() {
            return Err(DecodeError::Empty { decoder: NAME });
        }
        Ok(AudioSegment::new(samples, spec.sample_rate, spec.channels))
    }
}

impl AudioDecoder for WavDecoder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn decode(&self, bytes: &[u8], _declared_extension: &str) -> Result<AudioSegment, DecodeError> {
        Self::decode_bytes(bytes)
    }
}

fn failed(reason: String) -> DecodeError {
    DecodeError::Failed {
        decoder: NAME,
        reason,
    }
}

/// Encode interleaved f32 samples as a 16-bit PCM WAV file in memory.
///
/// Used to build fixtures and to hand audio to tools that only accept files.
pub fn encode_pcm16(samples: &[f32], sample_rate: u32, channels: u16) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for s in samples {
            let clamped = if s.is_finite() { s.clamp(-1.0, 1.0) } else { 0.0 };
            writer.write_sample((clamped * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_decode_pcm16_stereo_keeps_interleaving() {
        let bytes = encode_pcm16(&[0.5, -0.5, 0.25, -0.25], 8000, 2).unwrap();
        let audio = WavDecoder.decode(&bytes, "wav").unwrap();
        assert_eq!(audio.channels(), 2);
        assert_eq!(audio.sample_rate(), 8000);
        assert_eq!(audio.samples().len(), 4);
        assert_relative_eq!(audio.samples()[0], 0.5, epsilon = 1e-3);
        assert_relative_eq!(audio.samples()[1], -0.5, epsilon = 1e-3);
        assert_relative_eq!(audio.samples()[3], -0.25, epsilon = 1e-3);
    }

    #[test]
    fn test_decode_float_wav() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            writer.write_sample(0.75f32).unwrap();
            writer.write_sample(-0.1f32).unwrap();
            writer.finalize().unwrap();
        }
        let audio = WavDecoder::decode_bytes(&cursor.into_inner()).unwrap();
        assert_eq!(audio.samples(), &[0.75, -0.1]);
    }

    #[test]
    fn test_garbage_is_unsupported() {
        let err = WavDecoder.decode(b"definitely not a riff file", "wav").unwrap_err();
        assert!(matches!(err, DecodeError::Unsupported { .. }));
    }

    #[test]
    fn test_header_only_is_empty() {
        let bytes = encode_pcm16(&[], 16000, 1).unwrap();
        assert!(matches!(
            WavDecoder::decode_bytes(&bytes).unwrap_err(),
            DecodeError::Empty { .. }
        ));
    }
}
