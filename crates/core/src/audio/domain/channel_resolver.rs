use super::audio_decoder::AudioDecoder;
use super::audio_segment::AudioSegment;
use super::waveform::{SpeakerRole, Waveform};
use crate::shared::constants::TARGET_SAMPLE_RATE;

/// Caller and client waveforms split out of one recording.
#[derive(Debug, Clone)]
pub struct ResolvedChannels {
    pub caller: Waveform,
    pub client: Waveform,
    pub sample_rate: u32,
    /// Channel count of the decoded source; 0 when every decoder failed.
    pub source_channels: u16,
}

impl ResolvedChannels {
    pub fn waveform(&self, role: SpeakerRole) -> &Waveform {
        match role {
            SpeakerRole::Caller => &self.caller,
            SpeakerRole::Client => &self.client,
        }
    }
}

/// Splits arbitrary input audio into per-role waveforms.
///
/// Decoders are tried in order; the first success wins. When all of them
/// fail the result is one second of silence for both roles, so downstream
/// stages always receive well-formed input.
pub struct ChannelResolver {
    decoders: Vec<Box<dyn AudioDecoder>>,
}

impl ChannelResolver {
    pub fn new(decoders: Vec<Box<dyn AudioDecoder>>) -> Self {
        Self { decoders }
    }

    pub fn decoder_names(&self) -> Vec<&'static str> {
        self.decoders.iter().map(|d| d.name()).collect()
    }

    /// First successful decode, or `None` when no strategy accepts the bytes.
    pub fn decode(&self, bytes: &[u8], declared_extension: &str) -> Option<AudioSegment> {
        let extension = declared_extension.trim_start_matches('.').to_lowercase();
        for decoder in &self.decoders {
            match decoder.decode(bytes, &extension) {
                Ok(audio) if !audio.is_empty() => {
                    log::debug!(
                        "{} decoded {:.2}s, {} ch @ {} Hz",
                        decoder.name(),
                        audio.duration(),
                        audio.channels(),
                        audio.sample_rate()
                    );
                    return Some(audio);
                }
                Ok(_) => log::debug!("{} produced no samples", decoder.name()),
                Err(e) => log::debug!("{e}"),
            }
        }
        None
    }

    pub fn resolve(&self, bytes: &[u8], declared_extension: &str) -> ResolvedChannels {
        match self.decode(bytes, declared_extension) {
            Some(audio) => split_channels(&audio),
            None => {
                log::warn!(
                    "No decoder accepted {} bytes (.{declared_extension}); substituting silence",
                    bytes.len()
                );
                let silence = AudioSegment::silence(1.0, TARGET_SAMPLE_RATE).into_samples();
                ResolvedChannels {
                    caller: Waveform::new(SpeakerRole::Caller, silence.clone(), TARGET_SAMPLE_RATE),
                    client: Waveform::new(SpeakerRole::Client, silence, TARGET_SAMPLE_RATE),
                    sample_rate: TARGET_SAMPLE_RATE,
                    source_channels: 0,
                }
            }
        }
    }
}

/// Channel 0 is the caller and channel 1 the client; mono is duplicated.
pub fn split_channels(audio: &AudioSegment) -> ResolvedChannels {
    let rate = audio.sample_rate();
    let (caller, client) = if audio.channels() >= 2 {
        (audio.channel(0), audio.channel(1))
    } else {
        let mono = audio.samples().to_vec();
        (mono.clone(), mono)
    };
    ResolvedChannels {
        caller: Waveform::new(SpeakerRole::Caller, caller, rate),
        client: Waveform::new(SpeakerRole::Client, client, rate),
        sample_rate: rate,
        source_channels: audio.channels(),
    }
}
