//! Auxiliary signals and risk tier derived from (label, score, confidence).

use crate::scorer::BiasLabel;
use serde::{Deserialize, Serialize};

/// Placeholder for fields and hints with no value yet.
pub const UNDEFINED: &str = "undefined";

/// Score at or above which a biased text is hinted as "anger" rather than "tension".
const ANGER_SCORE: f64 = 0.7;
const MEDIUM_RISK: f64 = 0.3;
const HIGH_RISK: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signals {
    pub intensity: f64,
    pub polarization: f64,
    pub emotion_hint: String,
    /// Reserved; always "undefined" for now.
    pub attack_target: String,
}

fn emotion_hint(label: BiasLabel, score: Option<f64>) -> &'static str {
    match label {
        BiasLabel::Biased if score.unwrap_or(0.0) >= ANGER_SCORE => "anger",
        BiasLabel::Biased => "tension",
        BiasLabel::Neutral => "neutral",
        BiasLabel::Inconclusive | BiasLabel::Unknown => UNDEFINED,
    }
}

pub fn derive_signals(label: BiasLabel, score: Option<f64>, confidence: f64) -> Signals {
    Signals {
        intensity: score.unwrap_or(0.0),
        polarization: score.map(|s| s * confidence).unwrap_or(0.0),
        emotion_hint: emotion_hint(label, score).to_string(),
        attack_target: UNDEFINED.to_string(),
    }
}

/// Bucket score × confidence; undefined for inconclusive results or a missing score.
pub fn derive_risk_level(label: BiasLabel, score: Option<f64>, confidence: f64) -> RiskLevel {
    let score = match score {
        Some(s) if label != BiasLabel::Inconclusive => s,
        _ => return RiskLevel::Undefined,
    };
    let weighted = score * confidence;
    if weighted < MEDIUM_RISK {
        RiskLevel::Low
    } else if weighted < HIGH_RISK {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_score_zeroes_intensity_and_polarization() {
        let s = derive_signals(BiasLabel::Inconclusive, None, 0.3);
        assert_eq!(s.intensity, 0.0);
        assert_eq!(s.polarization, 0.0);
        assert_eq!(s.emotion_hint, "undefined");
        assert_eq!(s.attack_target, "undefined");
    }

    #[test]
    fn emotion_hints() {
        assert_eq!(derive_signals(BiasLabel::Biased, Some(0.7), 1.0).emotion_hint, "anger");
        assert_eq!(derive_signals(BiasLabel::Biased, Some(0.69), 1.0).emotion_hint, "tension");
        assert_eq!(derive_signals(BiasLabel::Neutral, Some(0.2), 1.0).emotion_hint, "neutral");
        assert_eq!(derive_signals(BiasLabel::Unknown, Some(0.0), 0.0).emotion_hint, "undefined");
    }

    #[test]
    fn polarization_is_score_times_confidence() {
        let s = derive_signals(BiasLabel::Biased, Some(0.8), 0.5);
        assert_eq!(s.intensity, 0.8);
        assert!((s.polarization - 0.4).abs() < 1e-12);
    }

    #[test]
    fn risk_buckets() {
        assert_eq!(derive_risk_level(BiasLabel::Neutral, Some(0.2), 1.0), RiskLevel::Low);
        assert_eq!(derive_risk_level(BiasLabel::Biased, Some(0.6), 0.5), RiskLevel::Medium);
        assert_eq!(derive_risk_level(BiasLabel::Biased, Some(0.6), 1.0), RiskLevel::High);
        assert_eq!(derive_risk_level(BiasLabel::Biased, Some(0.5), 0.6), RiskLevel::Medium);
        assert_eq!(derive_risk_level(BiasLabel::Inconclusive, Some(0.9), 1.0), RiskLevel::Undefined);
        assert_eq!(derive_risk_level(BiasLabel::Neutral, None, 1.0), RiskLevel::Undefined);
    }

    #[test]
    fn risk_level_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"medium\"");
    }
}
