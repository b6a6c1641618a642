use std::io::Write;
use std::process::{Command, Stdio};

use crate::audio::domain::audio_decoder::{AudioDecoder, DecodeError};
use crate::audio::domain::audio_segment::AudioSegment;
use crate::shared::constants::TARGET_SAMPLE_RATE;

use super::wav_decoder::WavDecoder;

const NAME: &str = "ffmpeg-cli";

/// Last-resort decoder that shells out to the `ffmpeg` executable.
///
/// The input is transcoded to a 16 kHz PCM WAV in a scratch directory,
/// keeping every channel, and read back with [`WavDecoder`].
pub struct FfmpegCliDecoder {
    program: String,
}

impl FfmpegCliDecoder {
    pub fn new() -> Self {
        Self::with_program("ffmpeg")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for FfmpegCliDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioDecoder for FfmpegCliDecoder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn decode(&self, bytes: &[u8], declared_extension: &str) -> Result<AudioSegment, DecodeError> {
        let scratch = tempfile::tempdir().map_err(|source| DecodeError::Scratch {
            decoder: NAME,
            source,
        })?;
        let input = scratch.path().join(format!("input.{declared_extension}"));
        let output = scratch.path().join("output.wav");

        std::fs::File::create(&input)
            .and_then(|mut f| f.write_all(bytes))
            .map_err(|source| DecodeError::Scratch {
                decoder: NAME,
                source,
            })?;

        let result = Command::new(&self.program)
            .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(&input)
            .arg("-ar")
            .arg(TARGET_SAMPLE_RATE.to_string())
            .args(["-acodec", "pcm_s16le", "-f", "wav"])
            .arg(&output)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| DecodeError::Unsupported {
                decoder: NAME,
                reason: format!("cannot run {}: {e}", self.program),
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(DecodeError::Failed {
                decoder: NAME,
                reason: format!("{} exited with {}: {}", self.program, result.status, stderr.trim()),
            });
        }

        let wav = std::fs::read(&output).map_err(|source| DecodeError::Scratch {
            decoder: NAME,
            source,
        })?;
        WavDecoder::decode_bytes(&wav)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_program_is_unsupported() {
        let decoder = FfmpegCliDecoder::with_program("callsense-no-such-ffmpeg");
        let err = decoder.decode(&[1, 2, 3], "ogg").unwrap_err();
        assert!(matches!(err, DecodeError::Unsupported { .. }));
    }
}
