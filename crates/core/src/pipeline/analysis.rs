use serde::Serialize;

use crate::audio::domain::waveform::SpeakerRole;
use crate::emotion::domain::aggregator::{
    final_score, preview_score, rank_emotions, Advice, CombinedScores, PreviewAdvice,
    RankedEmotion, TOP_EMOTIONS,
};
use crate::emotion::domain::alerts::AlertSummary;
use crate::emotion::domain::emotion::EmotionScoreMap;

/// Which roles of a call to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelSelection {
    #[default]
    Both,
    Caller,
    Client,
}

impl ChannelSelection {
    pub fn roles(self) -> Vec<SpeakerRole> {
        match self {
            ChannelSelection::Both => vec![SpeakerRole::Caller, SpeakerRole::Client],
            ChannelSelection::Caller => vec![SpeakerRole::Caller],
            ChannelSelection::Client => vec![SpeakerRole::Client],
        }
    }
}

impl std::str::FromStr for ChannelSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "both" => Ok(ChannelSelection::Both),
            "caller" => Ok(ChannelSelection::Caller),
            "client" => Ok(ChannelSelection::Client),
            other => Err(format!(
                "channels must be 'both', 'caller' or 'client', got '{other}'"
            )),
        }
    }
}

/// Which pipeline variant produced a result. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineMode {
    Full,
    Fallback,
}

impl std::fmt::Display for EngineMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EngineMode::Full => "full",
            EngineMode::Fallback => "fallback",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelAnalysisResult {
    pub role: SpeakerRole,
    pub final_score: f32,
    pub valence_score: f32,
    pub arousal_score: f32,
    pub all_scores: EmotionScoreMap,
    pub top_emotions: Vec<RankedEmotion>,
    pub advice: Advice,
    pub transcript: String,
}

impl ChannelAnalysisResult {
    pub fn from_scores(role: SpeakerRole, scores: EmotionScoreMap, transcript: String) -> Self {
        Self {
            role,
            final_score: final_score(&scores),
            valence_score: scores.valence(),
            arousal_score: scores.arousal(),
            top_emotions: rank_emotions(scores.iter(), TOP_EMOTIONS),
            advice: Advice::for_scores(&scores),
            all_scores: scores,
            transcript,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallMetadata {
    pub sample_rate: u32,
    /// Channel count of the decoded input; 0 when it could not be decoded.
    pub source_channels: u16,
    pub channels_analyzed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallAnalysisResult {
    pub call_id: String,
    pub mode: EngineMode,
    pub channels: Vec<ChannelAnalysisResult>,
    pub combined: CombinedScores,
    pub transcript: String,
    pub alerts: AlertSummary,
    pub alert_count: usize,
    pub metadata: CallMetadata,
    pub processing_time_ms: u64,
}

/// Outcome of the quality gate for a streaming chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateDecision {
    TooShort,
    Undecodable,
    Silence,
    Speech,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChunkResult {
    pub role: SpeakerRole,
    pub gate: GateDecision,
    /// Preview score, `(Valence + Arousal) / 2`.
    pub final_score: f32,
    pub valence_score: f32,
    pub arousal_score: f32,
    pub all_scores: EmotionScoreMap,
    pub advice: PreviewAdvice,
    pub transcript: String,
    pub alerts: AlertSummary,
    pub alert_count: usize,
}

impl ChunkResult {
    /// Zero-score result for a chunk rejected before inference.
    pub fn rejected(role: SpeakerRole, gate: GateDecision, advice: PreviewAdvice) -> Self {
        Self {
            role,
            gate,
            final_score: 0.0,
            valence_score: 0.0,
            arousal_score: 0.0,
            all_scores: EmotionScoreMap::new(),
            advice,
            transcript: String::new(),
            alerts: AlertSummary::default(),
            alert_count: 0,
        }
    }

    pub fn scored(
        role: SpeakerRole,
        gate: GateDecision,
        scores: EmotionScoreMap,
        transcript: String,
        alerts: AlertSummary,
    ) -> Self {
        let score = preview_score(&scores);
        Self {
            role,
            gate,
            final_score: score,
            valence_score: scores.valence(),
            arousal_score: scores.arousal(),
            all_scores: scores,
            advice: PreviewAdvice::for_score(score),
            transcript,
            alert_count: alerts.count(),
            alerts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::domain::emotion::Emotion;
    use approx::assert_relative_eq;

    #[test]
    fn test_channel_result_uses_product_score() {
        let scores = EmotionScoreMap::from_pairs([
            (Emotion::Valence, 0.5),
            (Emotion::Arousal, 0.9),
            (Emotion::Anger, 0.7),
        ]);
        let result = ChannelAnalysisResult::from_scores(SpeakerRole::Client, scores, String::new());
        assert_relative_eq!(result.final_score, 0.45);
        assert_eq!(result.advice, Advice::Anger);
        assert_eq!(result.top_emotions[0].emotion, Emotion::Arousal);
        assert_eq!(result.top_emotions.len(), 10);
    }

    #[test]
    fn test_chunk_result_uses_preview_score() {
        let scores =
            EmotionScoreMap::from_pairs([(Emotion::Valence, 0.5), (Emotion::Arousal, 0.9)]);
        let alerts = AlertSummary {
            profanity: vec!["mierda".into()],
            anger: true,
        };
        let result = ChunkResult::scored(
            SpeakerRole::Caller,
            GateDecision::Speech,
            scores,
            "qué mierda!".into(),
            alerts,
        );
        assert_relative_eq!(result.final_score, 0.7);
        assert_eq!(result.advice, PreviewAdvice::GoodEnergy);
        assert_eq!(result.alert_count, 2);
    }

    #[test]
    fn test_rejected_chunk_serializes_zeroes() {
        let result =
            ChunkResult::rejected(SpeakerRole::Caller, GateDecision::TooShort, PreviewAdvice::TooShort);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["gate"], "too_short");
        assert_eq!(json["role"], "caller");
        assert_eq!(json["final_score"], 0.0);
        assert_eq!(json["alerts"]["anger"], false);
        assert_eq!(json["advice"]["kind"], "too_short");
    }

    #[test]
    fn test_selection_roles() {
        assert_eq!(ChannelSelection::Both.roles().len(), 2);
        assert_eq!("client".parse::<ChannelSelection>().unwrap().roles(), vec![SpeakerRole::Client]);
        assert!("left".parse::<ChannelSelection>().is_err());
    }
}
