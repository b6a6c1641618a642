use std::io::Write;
use std::path::Path;

use ffmpeg_next::util::frame::audio::Audio as AudioFrame;

use crate::audio::domain::audio_decoder::{AudioDecoder, DecodeError};
use crate::audio::domain::audio_segment::AudioSegment;
use crate::shared::constants::TARGET_SAMPLE_RATE;

const NAME: &str = "ffmpeg";

/// Container decoder using libav through ffmpeg-next.
///
/// The bytes are written to a temporary file named with the declared
/// extension so the demuxer can probe it. Output is 16 kHz f32 with at most
/// two channels (caller, client).
pub struct FfmpegDecoder;

impl AudioDecoder for FfmpegDecoder {
    fn name(&self) -> &'static str {
        NAME
    }

    fn decode(&self, bytes: &[u8], declared_extension: &str) -> Result<AudioSegment, DecodeError> {
        let mut scratch = tempfile::Builder::new()
            .prefix("callsense-")
            .suffix(&format!(".{declared_extension}"))
            .tempfile()
            .map_err(|source| DecodeError::Scratch {
                decoder: NAME,
                source,
            })?;
        scratch
            .write_all(bytes)
            .and_then(|_| scratch.flush())
            .map_err(|source| DecodeError::Scratch {
                decoder: NAME,
                source,
            })?;

        let audio = decode_file(scratch.path(), TARGET_SAMPLE_RATE).map_err(|e| {
            DecodeError::Failed {
                decoder: NAME,
                reason: e.to_string(),
            }
        })?;
        match audio {
            Some(a) if !a.is_empty() => Ok(a),
            Some(_) => Err(DecodeError::Empty { decoder: NAME }),
            None => Err(DecodeError::Unsupported {
                decoder: NAME,
                reason: "no audio stream".into(),
            }),
        }
    }
}

/// Decode the best audio stream of `path`, resampled to `target_sample_rate`.
///
/// Returns `Ok(None)` when the container has no audio stream.
pub fn decode_file(
    path: &Path,
    target_sample_rate: u32,
) -> Result<Option<AudioSegment>, Box<dyn std::error::Error>> {
    ffmpeg_next::init()?;

    let mut ictx = ffmpeg_next::format::input(path)?;

    let audio_stream = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
        Some(stream) => stream,
        None => return Ok(None),
    };
    let stream_index = audio_stream.index();

    let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(audio_stream.parameters())?;
    let mut decoder = codec_ctx.decoder().audio()?;

    let channels: u16 = if decoder.channels() >= 2 { 2 } else { 1 };
    let layout = if channels == 2 {
        ffmpeg_next::ChannelLayout::STEREO
    } else {
        ffmpeg_next::ChannelLayout::MONO
    };

    let mut resampler = ffmpeg_next::software::resampling::Context::get(
        decoder.format(),
        decoder.channel_layout(),
        decoder.rate(),
        ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
        layout,
        target_sample_rate,
    )?;

    let mut planes: Vec<Vec<f32>> = vec![Vec::new(); channels as usize];
    let mut decoded = AudioFrame::empty();
    let mut resampled = AudioFrame::empty();

    for (stream, packet) in ictx.packets() {
        if stream.index() != stream_index {
            continue;
        }
        decoder.send_packet(&packet)?;
        while decoder.receive_frame(&mut decoded).is_ok() {
            resampler.run(&decoded, &mut resampled)?;
            append_planes(&resampled, &mut planes);
        }
    }

    decoder.send_eof()?;
    while decoder.receive_frame(&mut decoded).is_ok() {
        resampler.run(&decoded, &mut resampled)?;
        append_planes(&resampled, &mut planes);
    }

    if let Ok(Some(delay)) = resampler.flush(&mut resampled) {
        if delay.output > 0 {
            append_planes(&resampled, &mut planes);
        }
    }

    Ok(Some(AudioSegment::new(
        interleave(&planes),
        target_sample_rate,
        channels,
    )))
}

/// Copy each plane of a planar f32 frame onto the matching output buffer.
fn append_planes(frame: &AudioFrame, planes: &mut [Vec<f32>]) {
    let n = frame.samples();
    if n == 0 {
        return;
    }
    for (i, plane) in planes.iter_mut().enumerate() {
        let data = frame.data(i);
        let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, n) };
        plane.extend_from_slice(floats);
    }
}

fn interleave(planes: &[Vec<f32>]) -> Vec<f32> {
    match planes {
        [mono] => mono.clone(),
        _ => {
            let frames = planes.iter().map(Vec::len).min().unwrap_or(0);
            let mut out = Vec::with_capacity(frames * planes.len());
            for i in 0..frames {
                out.extend(planes.iter().map(|p| p[i]));
            }
            out
        }
    }
}
