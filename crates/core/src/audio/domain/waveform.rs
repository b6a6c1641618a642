use serde::Serialize;

use super::audio_segment::AudioSegment;

/// Which side of a call a channel belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerRole {
    Caller,
    Client,
}

impl SpeakerRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeakerRole::Caller => "caller",
            SpeakerRole::Client => "client",
        }
    }
}

impl std::fmt::Display for SpeakerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SpeakerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "caller" => Ok(SpeakerRole::Caller),
            "client" => Ok(SpeakerRole::Client),
            other => Err(format!("role must be 'caller' or 'client', got '{other}'")),
        }
    }
}

/// Mono audio attributed to one speaker role.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub role: SpeakerRole,
    pub audio: AudioSegment,
}

impl Waveform {
    pub fn new(role: SpeakerRole, samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            role,
            audio: AudioSegment::new(samples, sample_rate, 1),
        }
    }

    pub fn samples(&self) -> &[f32] {
        self.audio.samples()
    }

    pub fn sample_rate(&self) -> u32 {
        self.audio.sample_rate()
    }
}
