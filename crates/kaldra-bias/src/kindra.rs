//! Kindra 3×48 cultural modulation layer.
//!
//! Resolves the 3-6-9 cultural plan for a locale and, when the plan has a usable
//! weight vector, reweights Δ12 elementwise. The shipped weight table is empty, so
//! modulation is a no-op until calibrated weights exist. Never fails.

use kaldra_core::{CulturalPlan, ReferenceData, ARCHETYPE_DIM};

/// Weights usable for modulation: exactly 12 finite, non-negative values.
fn usable_weights(weights: Option<Vec<f64>>) -> Option<Vec<f64>> {
    weights.filter(|w| w.len() == ARCHETYPE_DIM && w.iter().all(|x| x.is_finite() && *x >= 0.0))
}

/// Elementwise product renormalized to sum 1. None when the product sums to zero.
fn modulate(delta12: &[f64], weights: &[f64]) -> Option<Vec<f64>> {
    let product: Vec<f64> = delta12.iter().zip(weights).map(|(d, w)| d * w).collect();
    let sum: f64 = product.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        Some(product.into_iter().map(|x| x / sum).collect())
    } else {
        None
    }
}

/// Apply cultural modulation to `delta12` for `locale`.
///
/// Returns the (possibly reweighted) vector and the resolved plan. Missing,
/// malformed or wrong-length weights leave the vector unchanged.
pub fn apply_kindra(
    delta12: &[f64],
    locale: &str,
    reference: &ReferenceData,
) -> (Vec<f64>, CulturalPlan) {
    let plan = reference.resolve_plan(locale);

    if delta12.len() != ARCHETYPE_DIM {
        return (delta12.to_vec(), plan);
    }

    let modulated = usable_weights(reference.plan_weights(plan))
        .and_then(|weights| modulate(delta12, &weights));

    match modulated {
        Some(v) => {
            tracing::debug!(target: "kaldra::kindra", locale, plan = plan.as_u8(), "Cultural weights applied");
            (v, plan)
        }
        None => (delta12.to_vec(), plan),
    }
}
