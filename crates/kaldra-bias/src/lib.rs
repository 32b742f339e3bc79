//! kaldra-bias: the bias kernel.
//!
//! Builds on `kaldra-core` to turn text into a structured, explainable bias
//! assessment: Δ12 projection, Kindra cultural modulation, τ confidence gate,
//! heuristic or model-backed scoring, signals, Δ144 detail and explanation
//! layers. `BiasPipeline` ties them together for single texts and batches.

pub mod batch;
pub mod delta12;
pub mod explain;
pub mod kindra;
pub mod pipeline;
pub mod scorer;
pub mod signals;
pub mod tau;

pub use batch::{BatchItem, BatchOutcome};
pub use delta12::{project_to_delta12, softmax};
pub use explain::{build_explanation_layers, ExplanationLayers};
pub use kindra::apply_kindra;
pub use pipeline::{AnalysisResult, BiasPipeline, DEFAULT_LOCALE, UNDEFINED_ARCHETYPE};
pub use scorer::{BiasLabel, BiasScorer, Classifier, LogisticClassifier, DECISION_BOUNDARY};
pub use signals::{derive_risk_level, derive_signals, RiskLevel, Signals};
pub use tau::{apply_tau_policy, estimate_confidence, PipelineDecision, TauOutcome, DEFAULT_TAU_THRESHOLD};
