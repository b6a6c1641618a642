use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// Closed emotion vocabulary, in canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Emotion {
    Valence,
    Arousal,
    Anger,
    Sadness,
    Joy,
    Fear,
    Disgust,
    Awe,
    Contentment,
    Interest,
}

impl Emotion {
    pub const ALL: [Emotion; 10] = [
        Emotion::Valence,
        Emotion::Arousal,
        Emotion::Anger,
        Emotion::Sadness,
        Emotion::Joy,
        Emotion::Fear,
        Emotion::Disgust,
        Emotion::Awe,
        Emotion::Contentment,
        Emotion::Interest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Emotion::Valence => "Valence",
            Emotion::Arousal => "Arousal",
            Emotion::Anger => "Anger",
            Emotion::Sadness => "Sadness",
            Emotion::Joy => "Joy",
            Emotion::Fear => "Fear",
            Emotion::Disgust => "Disgust",
            Emotion::Awe => "Awe",
            Emotion::Contentment => "Contentment",
            Emotion::Interest => "Interest",
        }
    }

    /// Identifier the trained head for this emotion is stored under.
    pub fn stored_name(self) -> &'static str {
        match self {
            Emotion::Joy => "Elation",
            other => other.name(),
        }
    }

    /// Map a storage identifier to its canonical emotion.
    pub fn from_stored_name(stored: &str) -> Option<Emotion> {
        Emotion::ALL.into_iter().find(|e| e.stored_name() == stored)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Emotion::ALL
            .into_iter()
            .find(|e| e.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown emotion '{s}'"))
    }
}

/// Force a score into [0, 1]; non-finite values become 0.
pub fn sanitize(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

pub fn logistic(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Score for every emotion in the vocabulary; absent entries read as 0.
///
/// All writes pass through [`sanitize`], so every stored value is finite and
/// within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EmotionScoreMap {
    scores: [f32; 10],
}

impl EmotionScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Emotion, f32)>) -> Self {
        let mut map = Self::new();
        for (emotion, score) in pairs {
            map.set(emotion, score);
        }
        map
    }

    pub fn get(&self, emotion: Emotion) -> f32 {
        self.scores[emotion.index()]
    }

    pub fn set(&mut self, emotion: Emotion, score: f32) {
        self.scores[emotion.index()] = sanitize(score);
    }

    pub fn valence(&self) -> f32 {
        self.get(Emotion::Valence)
    }

    pub fn arousal(&self) -> f32 {
        self.get(Emotion::Arousal)
    }

    pub fn anger(&self) -> f32 {
        self.get(Emotion::Anger)
    }

    /// Pairs in canonical vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f32)> + '_ {
        Emotion::ALL.into_iter().map(|e| (e, self.get(e)))
    }

    /// Per-emotion arithmetic mean. An empty input yields all zeros.
    pub fn mean<'a>(maps: impl IntoIterator<Item = &'a EmotionScoreMap>) -> Self {
        let mut sums = [0.0f64; 10];
        let mut count = 0usize;
        for map in maps {
            for (sum, score) in sums.iter_mut().zip(map.scores.iter()) {
                *sum += *score as f64;
            }
            count += 1;
        }
        if count == 0 {
            return Self::new();
        }
        Self::from_pairs(
            Emotion::ALL
                .into_iter()
                .map(|e| (e, (sums[e.index()] / count as f64) as f32)),
        )
    }
}

impl Serialize for EmotionScoreMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.scores.len()))?;
        for (emotion, score) in self.iter() {
            map.serialize_entry(emotion.name(), &score)?;
        }
        map.end()
    }
}
