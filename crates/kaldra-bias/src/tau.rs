//! τ-layer (doubt policy): withhold a conclusion when Δ12 has no clear peak.

use serde::{Deserialize, Serialize};

/// Default confidence threshold below which a result is inconclusive.
pub const DEFAULT_TAU_THRESHOLD: f64 = 0.4;

/// Spread multiplier mapping (max − mean) onto [0, 1].
const CONFIDENCE_SCALE: f64 = 10.0;

/// Terminal decision of the confidence gate, taken once per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineDecision {
    Proceed,
    Inconclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TauOutcome {
    pub decision: PipelineDecision,
    pub confidence: f64,
}

/// Confidence = clip((max − mean) × 10, 0, 1). Empty input gives 0.0.
pub fn estimate_confidence(delta12: &[f64]) -> f64 {
    if delta12.is_empty() {
        return 0.0;
    }
    let max = delta12.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = delta12.iter().sum::<f64>() / delta12.len() as f64;
    ((max - mean) * CONFIDENCE_SCALE).clamp(0.0, 1.0)
}

/// Gate `delta12`: confidence below `threshold` is inconclusive.
pub fn apply_tau_policy(delta12: &[f64], threshold: f64) -> TauOutcome {
    let confidence = estimate_confidence(delta12);
    let decision = if confidence < threshold {
        PipelineDecision::Inconclusive
    } else {
        PipelineDecision::Proceed
    };
    TauOutcome {
        decision,
        confidence,
    }
}
