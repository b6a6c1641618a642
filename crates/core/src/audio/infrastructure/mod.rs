pub mod ffmpeg_cli_decoder;
pub mod ffmpeg_decoder;
pub mod mel;
pub mod resampler;
pub mod wav_decoder;
pub mod whisper_recognizer;

use crate::audio::domain::audio_decoder::AudioDecoder;
use crate::shared::config::DecoderKind;

/// Build the resolver's decode strategies in the configured order.
pub fn decoders_for(kinds: &[DecoderKind]) -> Vec<Box<dyn AudioDecoder>> {
    kinds
        .iter()
        .map(|kind| -> Box<dyn AudioDecoder> {
            match kind {
                DecoderKind::Wav => Box::new(wav_decoder::WavDecoder),
                DecoderKind::Ffmpeg => Box::new(ffmpeg_decoder::FfmpegDecoder),
                DecoderKind::FfmpegCli => Box::new(ffmpeg_cli_decoder::FfmpegCliDecoder::new()),
            }
        })
        .collect()
}
