//! Bias scorer: Δ12 → (bias score, label).
//!
//! Two strategies share one labelling rule (`biased` iff score ≥ 0.5):
//! - **Heuristic**: `1 − Δ12[0]`; index 0 is the reference "innocent" archetype.
//! - **Model**: probability of the `"biased"` class from a trained [`Classifier`].
//!
//! The strategy is bound when the scorer is built and never re-checked per call.

use kaldra_core::{BiasSettings, KaldraError, KaldraResult, ARCHETYPE_DIM};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Fixed decision boundary for the `biased` label (inclusive).
pub const DECISION_BOUNDARY: f64 = 0.5;

/// Class name whose probability is the bias score.
pub const BIASED_CLASS: &str = "biased";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiasLabel {
    Biased,
    Neutral,
    Inconclusive,
    Unknown,
}

impl BiasLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Biased => "biased",
            Self::Neutral => "neutral",
            Self::Inconclusive => "inconclusive",
            Self::Unknown => "unknown",
        }
    }

    /// Label for a computed score.
    pub fn from_score(score: f64) -> Self {
        if score >= DECISION_BOUNDARY {
            Self::Biased
        } else {
            Self::Neutral
        }
    }
}

impl fmt::Display for BiasLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trained classifier over Δ12. Implementations must be deterministic.
pub trait Classifier: Send + Sync {
    /// Class label → probability for one Δ12 vector.
    fn predict_proba(&self, features: &[f64]) -> KaldraResult<HashMap<String, f64>>;
}

/// Fitted logistic regression, stored as JSON:
/// `{ "classes": [...], "coef": [[...], ...], "intercept": [...] }`.
///
/// One coefficient row means a binary model scoring `classes[1]`; otherwise there
/// is one row per class and probabilities come from a softmax over the logits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticClassifier {
    pub classes: Vec<String>,
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
}

impl LogisticClassifier {
    /// Load and validate an artifact from disk.
    pub fn load(path: &Path) -> KaldraResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let model: LogisticClassifier = serde_json::from_str(&text)?;
        model.validate()?;
        Ok(model)
    }

    pub fn validate(&self) -> KaldraResult<()> {
        if self.classes.len() < 2 {
            return Err(KaldraError::Classifier(
                "artifact must list at least two classes".to_string(),
            ));
        }
        let binary = self.classes.len() == 2 && self.coef.len() == 1;
        if !binary && self.coef.len() != self.classes.len() {
            return Err(KaldraError::Classifier(format!(
                "expected 1 or {} coefficient rows, found {}",
                self.classes.len(),
                self.coef.len()
            )));
        }
        if self.intercept.len() != self.coef.len() {
            return Err(KaldraError::Classifier(format!(
                "expected {} intercepts, found {}",
                self.coef.len(),
                self.intercept.len()
            )));
        }
        if let Some(row) = self.coef.iter().find(|row| row.len() != ARCHETYPE_DIM) {
            return Err(KaldraError::Classifier(format!(
                "coefficient rows must have {} weights, found {}",
                ARCHETYPE_DIM,
                row.len()
            )));
        }
        Ok(())
    }

    fn logit(&self, row: usize, features: &[f64]) -> f64 {
        self.coef[row]
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept[row]
    }
}

impl Classifier for LogisticClassifier {
    fn predict_proba(&self, features: &[f64]) -> KaldraResult<HashMap<String, f64>> {
        if features.len() != ARCHETYPE_DIM {
            return Err(KaldraError::InvalidInput(format!(
                "classifier expects {} features, got {}",
                ARCHETYPE_DIM,
                features.len()
            )));
        }
        let mut proba = HashMap::with_capacity(self.classes.len());
        if self.coef.len() == 1 {
            let p1 = 1.0 / (1.0 + (-self.logit(0, features)).exp());
            proba.insert(self.classes[0].clone(), 1.0 - p1);
            proba.insert(self.classes[1].clone(), p1);
        } else {
            let logits: Vec<f64> = (0..self.coef.len()).map(|r| self.logit(r, features)).collect();
            for (class, p) in self.classes.iter().zip(crate::delta12::softmax(&logits)) {
                proba.insert(class.clone(), p);
            }
        }
        Ok(proba)
    }
}

enum Strategy {
    Heuristic,
    Model(Box<dyn Classifier>),
}

/// Bias scorer bound to one strategy.
pub struct BiasScorer {
    strategy: Strategy,
}

impl BiasScorer {
    pub fn heuristic() -> Self {
        Self {
            strategy: Strategy::Heuristic,
        }
    }

    pub fn with_classifier(classifier: Box<dyn Classifier>) -> Self {
        Self {
            strategy: Strategy::Model(classifier),
        }
    }

    /// Model-backed when `classifier_path` points at a valid artifact; heuristic
    /// otherwise. A missing or broken artifact is logged here and never again.
    pub fn from_settings(settings: &BiasSettings) -> Self {
        let Some(path) = settings.classifier_path.as_deref() else {
            tracing::info!(target: "kaldra::scorer", "No classifier artifact configured; using heuristic scorer");
            return Self::heuristic();
        };
        match LogisticClassifier::load(path) {
            Ok(model) => {
                tracing::info!(
                    target: "kaldra::scorer",
                    path = %path.display(),
                    classes = ?model.classes,
                    "Loaded classifier artifact"
                );
                Self::with_classifier(Box::new(model))
            }
            Err(e) => {
                tracing::warn!(
                    target: "kaldra::scorer",
                    path = %path.display(),
                    error = %e,
                    "Classifier artifact unavailable; falling back to heuristic scorer"
                );
                Self::heuristic()
            }
        }
    }

    pub fn is_model_backed(&self) -> bool {
        matches!(self.strategy, Strategy::Model(_))
    }

    pub fn strategy_name(&self) -> &'static str {
        match self.strategy {
            Strategy::Heuristic => "heuristic",
            Strategy::Model(_) => "model",
        }
    }

    /// Score `delta12` and derive its label. Fails with `InvalidInput` on a
    /// vector that is not 12 long.
    pub fn score(&self, delta12: &[f64]) -> KaldraResult<(f64, BiasLabel)> {
        if delta12.len() != ARCHETYPE_DIM {
            return Err(KaldraError::InvalidInput(format!(
                "Δ12 must have {} entries, got {}",
                ARCHETYPE_DIM,
                delta12.len()
            )));
        }
        let score = match &self.strategy {
            Strategy::Heuristic => 1.0 - delta12[0],
            Strategy::Model(classifier) => {
                let proba = classifier.predict_proba(delta12)?;
                *proba.get(BIASED_CLASS).ok_or_else(|| {
                    KaldraError::Classifier(format!(
                        "classifier output has no '{}' class",
                        BIASED_CLASS
                    ))
                })?
            }
        };
        Ok((score, BiasLabel::from_score(score)))
    }
}

impl fmt::Debug for BiasScorer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BiasScorer")
            .field("strategy", &self.strategy_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boundary_vector() -> Vec<f64> {
        let mut v = vec![0.5 / 11.0; 12];
        v[0] = 0.5;
        v
    }

    fn binary_model(weight0: f64, intercept: f64) -> LogisticClassifier {
        let mut row = vec![0.0; 12];
        row[0] = weight0;
        LogisticClassifier {
            classes: vec!["biased".to_string(), "neutral".to_string()],
            coef: vec![row],
            intercept: vec![intercept],
        }
    }

    #[test]
    fn heuristic_boundary_is_inclusive() {
        let (score, label) = BiasScorer::heuristic().score(&boundary_vector()).unwrap();
        assert!((score - 0.5).abs() < 1e-12);
        assert_eq!(label, BiasLabel::Biased);
    }

    #[test]
    fn heuristic_neutral_when_innocent_dominates() {
        let mut v = vec![0.02; 12];
        v[0] = 0.78;
        let (score, label) = BiasScorer::heuristic().score(&v).unwrap();
        assert!((score - 0.22).abs() < 1e-12);
        assert_eq!(label, BiasLabel::Neutral);
    }

    #[test]
    fn scoring_is_deterministic() {
        let scorer = BiasScorer::heuristic();
        let v = boundary_vector();
        assert_eq!(scorer.score(&v).unwrap(), scorer.score(&v).unwrap());
        let model = BiasScorer::with_classifier(Box::new(binary_model(2.0, -0.3)));
        assert_eq!(model.score(&v).unwrap(), model.score(&v).unwrap());
    }

    #[test]
    fn wrong_length_is_invalid_input() {
        assert!(matches!(
            BiasScorer::heuristic().score(&[0.5; 11]),
            Err(KaldraError::InvalidInput(_))
        ));
        let model = BiasScorer::with_classifier(Box::new(binary_model(1.0, 0.0)));
        assert!(matches!(model.score(&[0.5; 13]), Err(KaldraError::InvalidInput(_))));
    }

    #[test]
    fn label_matches_boundary_for_both_strategies() {
        let heuristic = BiasScorer::heuristic();
        // Binary model scores classes[1] = "neutral", so P(biased) = 1 − σ(logit).
        let model = BiasScorer::with_classifier(Box::new(binary_model(-4.0, 1.0)));
        for step in 0..=20 {
            let first = step as f64 / 20.0 * 0.99 + 0.005;
            let mut v = vec![(1.0 - first) / 11.0; 12];
            v[0] = first;
            for scorer in [&heuristic, &model] {
                let (score, label) = scorer.score(&v).unwrap();
                assert_eq!(label == BiasLabel::Biased, score >= DECISION_BOUNDARY);
            }
        }
    }

    #[test]
    fn binary_model_probabilities() {
        let m = binary_model(0.0, 0.0);
        let p = m.predict_proba(&[0.1; 12]).unwrap();
        assert!((p["biased"] - 0.5).abs() < 1e-12);
        assert!((p["neutral"] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn multinomial_model_probabilities_sum_to_one() {
        let m = LogisticClassifier {
            classes: vec!["biased".into(), "neutral".into(), "satire".into()],
            coef: vec![vec![1.0; 12], vec![0.0; 12], vec![-1.0; 12]],
            intercept: vec![0.0, 0.0, 0.0],
        };
        m.validate().unwrap();
        let p = m.predict_proba(&[1.0 / 12.0; 12]).unwrap();
        let sum: f64 = p.values().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert!(p["biased"] > p["neutral"] && p["neutral"] > p["satire"]);
    }

    #[test]
    fn missing_biased_class_is_an_error() {
        let m = LogisticClassifier {
            classes: vec!["a".into(), "b".into()],
            coef: vec![vec![0.0; 12]],
            intercept: vec![0.0],
        };
        let scorer = BiasScorer::with_classifier(Box::new(m));
        assert!(matches!(scorer.score(&[1.0 / 12.0; 12]), Err(KaldraError::Classifier(_))));
    }

    #[test]
    fn validate_rejects_malformed_artifacts() {
        let mut m = binary_model(1.0, 0.0);
        m.coef[0].pop();
        assert!(m.validate().is_err());

        let mut m = binary_model(1.0, 0.0);
        m.intercept.clear();
        assert!(m.validate().is_err());

        let m = LogisticClassifier {
            classes: vec!["biased".into()],
            coef: vec![vec![0.0; 12]],
            intercept: vec![0.0],
        };
        assert!(m.validate().is_err());
    }

    #[test]
    fn from_settings_falls_back_to_heuristic() {
        let settings = BiasSettings::default();
        assert!(!BiasScorer::from_settings(&settings).is_model_backed());

        let dir = tempfile::tempdir().unwrap();
        let missing = BiasSettings::default().with_classifier_path(dir.path().join("model.json"));
        assert_eq!(BiasScorer::from_settings(&missing).strategy_name(), "heuristic");

        let broken_path = dir.path().join("broken.json");
        std::fs::write(&broken_path, "{\"classes\": [\"biased\"]}").unwrap();
        let broken = BiasSettings::default().with_classifier_path(&broken_path);
        assert!(!BiasScorer::from_settings(&broken).is_model_backed());
    }

    #[test]
    fn from_settings_loads_valid_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, serde_json::to_string(&binary_model(1.0, 0.0)).unwrap()).unwrap();
        let scorer = BiasScorer::from_settings(&BiasSettings::default().with_classifier_path(&path));
        assert!(scorer.is_model_backed());
        assert_eq!(format!("{:?}", scorer), "BiasScorer { strategy: \"model\" }");
    }
}
