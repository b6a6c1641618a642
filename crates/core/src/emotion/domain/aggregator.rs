use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use super::emotion::{sanitize, Emotion, EmotionScoreMap};

/// Default number of entries in a ranking.
pub const TOP_EMOTIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankedEmotion {
    pub emotion: Emotion,
    pub score: f32,
}

/// Per-channel and call-level summary: `Valence * Arousal`.
pub fn final_score(scores: &EmotionScoreMap) -> f32 {
    sanitize(scores.valence() * scores.arousal())
}

/// Streaming summary: `(Valence + Arousal) / 2`.
pub fn preview_score(scores: &EmotionScoreMap) -> f32 {
    sanitize((scores.valence() + scores.arousal()) / 2.0)
}

/// Scores sorted descending, ties kept in vocabulary order, at most `limit` entries.
pub fn rank_emotions(
    scores: impl IntoIterator<Item = (Emotion, f32)>,
    limit: usize,
) -> Vec<RankedEmotion> {
    let mut ranked: Vec<RankedEmotion> = scores
        .into_iter()
        .map(|(emotion, score)| RankedEmotion {
            emotion,
            score: sanitize(score),
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.emotion.cmp(&b.emotion))
    });
    ranked.truncate(limit);
    ranked
}

/// Coaching advice for a full channel or call, first matching rule wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    Anger,
    Negative,
    HighEnergy,
    LowEnergy,
    Balanced,
}

impl Advice {
    pub fn for_scores(scores: &EmotionScoreMap) -> Self {
        if scores.anger() > 0.5 {
            Advice::Anger
        } else if scores.valence() < -0.3 {
            Advice::Negative
        } else if scores.arousal() > 0.7 {
            Advice::HighEnergy
        } else if scores.arousal() < -0.5 {
            Advice::LowEnergy
        } else {
            Advice::Balanced
        }
    }

    pub fn kind(self) -> &'static str {
        match self {
            Advice::Anger => "anger",
            Advice::Negative => "negative",
            Advice::HighEnergy => "high_energy",
            Advice::LowEnergy => "low_energy",
            Advice::Balanced => "balanced",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Advice::Anger => "Anger detected. Take a breath and lower the tone before continuing.",
            Advice::Negative => "The conversation is turning negative. Try reframing with positive language.",
            Advice::HighEnergy => "Very high energy. Slow down and keep a steady pace.",
            Advice::LowEnergy => "Low energy. Add more enthusiasm to keep the client engaged.",
            Advice::Balanced => "Emotional tone is balanced. Keep it up.",
        }
    }
}

/// Advice attached to a streaming chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewAdvice {
    TooShort,
    Undecodable,
    LowLevel,
    GoodEnergy,
    Normal,
}

impl PreviewAdvice {
    pub fn for_score(preview_score: f32) -> Self {
        if preview_score <= 0.2 {
            PreviewAdvice::LowLevel
        } else if preview_score >= 0.6 {
            PreviewAdvice::GoodEnergy
        } else {
            PreviewAdvice::Normal
        }
    }

    pub fn kind(self) -> &'static str {
        match self {
            PreviewAdvice::TooShort => "too_short",
            PreviewAdvice::Undecodable => "undecodable",
            PreviewAdvice::LowLevel => "low_level",
            PreviewAdvice::GoodEnergy => "good_energy",
            PreviewAdvice::Normal => "normal",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            PreviewAdvice::TooShort => "Segment too short, keep talking.",
            PreviewAdvice::Undecodable => "Could not process the audio.",
            PreviewAdvice::LowLevel => "Low emotional level.",
            PreviewAdvice::GoodEnergy => "Good energy!",
            PreviewAdvice::Normal => "Normal level.",
        }
    }
}

fn serialize_advice<S: Serializer>(
    serializer: S,
    kind: &'static str,
    message: &'static str,
) -> Result<S::Ok, S::Error> {
    let mut state = serializer.serialize_struct("Advice", 2)?;
    state.serialize_field("kind", kind)?;
    state.serialize_field("message", message)?;
    state.end()
}

impl Serialize for Advice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_advice(serializer, self.kind(), self.message())
    }
}

impl Serialize for PreviewAdvice {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize_advice(serializer, self.kind(), self.message())
    }
}

/// Call-level view recomputed from the per-emotion mean of the analyzed channels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedScores {
    pub scores: EmotionScoreMap,
    pub valence_score: f32,
    pub arousal_score: f32,
    pub final_score: f32,
    pub top_emotions: Vec<RankedEmotion>,
}

/// With no channels the result is all zeros with an empty ranking.
pub fn combine<'a>(channels: impl IntoIterator<Item = &'a EmotionScoreMap>) -> CombinedScores {
    let channels: Vec<&EmotionScoreMap> = channels.into_iter().collect();
    let scores = EmotionScoreMap::mean(channels.iter().copied());
    let top_emotions = if channels.is_empty() {
        Vec::new()
    } else {
        rank_emotions(scores.iter(), TOP_EMOTIONS)
    };
    CombinedScores {
        valence_score: scores.valence(),
        arousal_score: scores.arousal(),
        final_score: final_score(&scores),
        top_emotions,
        scores,
    }
}
