//! Layered explanations: human, technical and symbolic readings of one result.

use crate::scorer::{BiasLabel, DECISION_BOUNDARY};
use kaldra_core::{ArchetypeDetail, CulturalPlan};
use serde::{Deserialize, Serialize};

const HUMAN_INCONCLUSIVE: &str =
    "The system chose not to conclude on this text because confidence in the analysis is low.";
const HUMAN_NEUTRAL: &str = "The text shows no strong signs of bias.";
const HUMAN_BIASED: &str = "The text suggests bias in the way it refers to people or groups.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplanationLayers {
    pub human: String,
    pub technical: String,
    pub symbolic: String,
}

impl ExplanationLayers {
    /// Canned layers for empty or whitespace-only input.
    pub fn empty_input() -> Self {
        Self {
            human: "No text was provided, so there is nothing to assess.".to_string(),
            technical: "Empty input: the analysis pipeline was not executed.".to_string(),
            symbolic: "No archetypal reading is available for an empty text.".to_string(),
        }
    }
}

fn human_layer(label: BiasLabel) -> &'static str {
    match label {
        BiasLabel::Inconclusive | BiasLabel::Unknown => HUMAN_INCONCLUSIVE,
        BiasLabel::Neutral => HUMAN_NEUTRAL,
        BiasLabel::Biased => HUMAN_BIASED,
    }
}

fn technical_layer(label: BiasLabel, score: Option<f64>, confidence: f64, threshold: f64) -> String {
    let mut text = format!("Analysis confidence: {:.2}. ", confidence);
    match (label, score) {
        (BiasLabel::Biased | BiasLabel::Neutral, Some(score)) => {
            let verdict = if label == BiasLabel::Biased {
                "crossing"
            } else {
                "staying below"
            };
            text.push_str(&format!(
                "The model estimated a bias_score of ≈ {:.2}, {} the {:.1} decision boundary.",
                score, verdict, DECISION_BOUNDARY
            ));
        }
        _ => text.push_str(&format!(
            "Confidence did not reach the minimum threshold of {:.2} required for a conclusion.",
            threshold
        )),
    }
    text
}

fn symbolic_layer(archetype_name: &str, detail: &ArchetypeDetail, plan: CulturalPlan) -> String {
    format!(
        "The text resonates with the {} archetype, at the '{}' stage of the journey, \
         under cultural modulation plan {}. This suggests a symbolic framing related to {}.",
        archetype_name,
        detail.hero_stage,
        plan,
        archetype_name.to_lowercase()
    )
}

/// Compose all three layers. `threshold` is the τ threshold reported for inconclusive results.
pub fn build_explanation_layers(
    label: BiasLabel,
    score: Option<f64>,
    confidence: f64,
    threshold: f64,
    archetype_name: &str,
    detail: &ArchetypeDetail,
    plan: CulturalPlan,
) -> ExplanationLayers {
    ExplanationLayers {
        human: human_layer(label).to_string(),
        technical: technical_layer(label, score, confidence, threshold),
        symbolic: symbolic_layer(archetype_name, detail, plan),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero() -> ArchetypeDetail {
        ArchetypeDetail {
            id: Some(36),
            name: "Hero".to_string(),
            hero_stage: "Ordeal".to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn biased_layers() {
        let e = build_explanation_layers(
            BiasLabel::Biased,
            Some(0.734),
            0.81,
            0.4,
            "Hero",
            &hero(),
            CulturalPlan::Six,
        );
        assert_eq!(e.human, HUMAN_BIASED);
        assert!(e.technical.starts_with("Analysis confidence: 0.81."));
        assert!(e.technical.contains("0.73"));
        assert!(e.technical.contains("crossing the 0.5 decision boundary"));
        assert!(e.symbolic.contains("Hero archetype"));
        assert!(e.symbolic.contains("'Ordeal'"));
        assert!(e.symbolic.contains("plan 6"));
        assert!(e.symbolic.ends_with("related to hero."));
    }

    #[test]
    fn neutral_layers() {
        let e = build_explanation_layers(
            BiasLabel::Neutral,
            Some(0.2),
            0.5,
            0.4,
            "Hero",
            &hero(),
            CulturalPlan::Three,
        );
        assert_eq!(e.human, HUMAN_NEUTRAL);
        assert!(e.technical.contains("staying below the 0.5 decision boundary"));
    }

    #[test]
    fn inconclusive_layers_report_threshold() {
        let detail = ArchetypeDetail::fallback("Trickster");
        let e = build_explanation_layers(
            BiasLabel::Inconclusive,
            None,
            0.12,
            0.4,
            "Trickster",
            &detail,
            CulturalPlan::Nine,
        );
        assert_eq!(e.human, HUMAN_INCONCLUSIVE);
        assert!(e.technical.starts_with("Analysis confidence: 0.12."));
        assert!(e.technical.contains("minimum threshold of 0.40"));
        assert!(!e.technical.contains("bias_score"));
        assert!(e.symbolic.contains("'unknown'"));
        assert!(e.symbolic.contains("plan 9"));
    }

    #[test]
    fn all_layers_always_populated() {
        let layers = ExplanationLayers::empty_input();
        assert!(!layers.human.is_empty() && !layers.technical.is_empty() && !layers.symbolic.is_empty());
    }
}
