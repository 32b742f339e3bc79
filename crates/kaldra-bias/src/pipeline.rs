//! Bias pipeline: text → embedding → Δ12 → Kindra → τ gate → scorer → signals,
//! Δ144 detail and layered explanation.
//!
//! A `BiasPipeline` is built once at process start and holds everything a call
//! needs (settings, reference tables, embedder, bound scorer). Calls never mutate
//! it, so one pipeline can serve many threads behind an `Arc`.

use crate::delta12::project_to_delta12;
use crate::explain::{build_explanation_layers, ExplanationLayers};
use crate::kindra::apply_kindra;
use crate::scorer::{BiasLabel, BiasScorer};
use crate::signals::{derive_risk_level, derive_signals, RiskLevel, Signals};
use crate::tau::{apply_tau_policy, PipelineDecision};
use kaldra_core::{
    create_embedder, dominant_index, map_to_delta144, ArchetypeDetail, BiasSettings, CulturalPlan,
    Embedder, KaldraError, KaldraResult, ReferenceData, APP_NAME,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Locale assumed when the caller gives none.
pub const DEFAULT_LOCALE: &str = "pt-BR";

/// Dominant archetype reported when nothing was analyzed.
pub const UNDEFINED_ARCHETYPE: &str = "undefined";

/// Full assessment of one text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// None when the τ gate withheld a conclusion.
    pub bias_score: Option<f64>,
    pub label: BiasLabel,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub dominant_archetype: String,
    pub plan: CulturalPlan,
    pub archetype_detail: ArchetypeDetail,
    pub explanation_layers: ExplanationLayers,
    pub signals: Signals,
}

impl AnalysisResult {
    /// Fixed result for empty or whitespace-only text, independent of locale.
    pub fn empty_input() -> Self {
        let label = BiasLabel::Unknown;
        Self {
            bias_score: Some(0.0),
            label,
            confidence: 0.0,
            risk_level: RiskLevel::Low,
            dominant_archetype: UNDEFINED_ARCHETYPE.to_string(),
            plan: CulturalPlan::Three,
            archetype_detail: ArchetypeDetail::default(),
            explanation_layers: ExplanationLayers::empty_input(),
            signals: derive_signals(label, Some(0.0), 0.0),
        }
    }
}

pub struct BiasPipeline {
    settings: BiasSettings,
    reference: Arc<ReferenceData>,
    embedder: Box<dyn Embedder>,
    scorer: BiasScorer,
}

impl BiasPipeline {
    /// Assemble a pipeline from explicit parts.
    pub fn new(
        settings: BiasSettings,
        reference: Arc<ReferenceData>,
        embedder: Box<dyn Embedder>,
        scorer: BiasScorer,
    ) -> Self {
        Self {
            settings,
            reference,
            embedder,
            scorer,
        }
    }

    /// Validate settings, load reference tables (from `data_dir` or built-in),
    /// create the configured embedder and bind the scorer strategy.
    pub fn from_settings(settings: BiasSettings) -> KaldraResult<Self> {
        settings.validate()?;
        let reference = Arc::new(ReferenceData::load(settings.data_dir.as_deref())?);
        let embedder = create_embedder(&settings)?;
        let scorer = BiasScorer::from_settings(&settings);
        tracing::info!(
            target: "kaldra::pipeline",
            app = APP_NAME,
            env = %settings.environment,
            embedder = embedder.name(),
            scorer = scorer.strategy_name(),
            default_plan = settings.default_plan().as_u8(),
            batch_max_items = settings.batch_max_items,
            "Bias pipeline ready"
        );
        Ok(Self::new(settings, reference, embedder, scorer))
    }

    /// Load settings from file/environment and build the pipeline.
    pub fn from_env() -> KaldraResult<Self> {
        Self::from_settings(BiasSettings::load()?)
    }

    pub fn settings(&self) -> &BiasSettings {
        &self.settings
    }

    pub fn reference(&self) -> &ReferenceData {
        &self.reference
    }

    pub fn scorer(&self) -> &BiasScorer {
        &self.scorer
    }

    /// Analyze one text. Empty or whitespace-only text returns
    /// [`AnalysisResult::empty_input`] without touching the embedder.
    pub fn analyze(&self, text: &str, locale: &str) -> KaldraResult<AnalysisResult> {
        if text.trim().is_empty() {
            return Ok(AnalysisResult::empty_input());
        }

        let _span = tracing::debug_span!(
            target: "kaldra::pipeline",
            "analyze",
            app = APP_NAME,
            env = %self.settings.environment,
            locale,
            chars = text.chars().count()
        )
        .entered();

        let embedding = self.embedder.embed(text)?;
        let delta12 = project_to_delta12(&embedding)?;
        let (delta12, plan) = apply_kindra(&delta12, locale, &self.reference);
        let tau = apply_tau_policy(&delta12, self.settings.tau_threshold);

        let (bias_score, label) = match tau.decision {
            PipelineDecision::Inconclusive => (None, BiasLabel::Inconclusive),
            PipelineDecision::Proceed => {
                let (score, label) = self.scorer.score(&delta12)?;
                (Some(score), label)
            }
        };

        let index = dominant_index(&delta12)
            .ok_or_else(|| KaldraError::InvalidInput("Δ12 is empty".to_string()))?;
        let dominant_archetype = self
            .reference
            .archetype_name(index)
            .unwrap_or(UNDEFINED_ARCHETYPE)
            .to_string();
        let archetype_detail = map_to_delta144(&dominant_archetype, &self.reference);
        let risk_level = derive_risk_level(label, bias_score, tau.confidence);
        let signals = derive_signals(label, bias_score, tau.confidence);
        let explanation_layers = build_explanation_layers(
            label,
            bias_score,
            tau.confidence,
            self.settings.tau_threshold,
            &dominant_archetype,
            &archetype_detail,
            plan,
        );

        tracing::debug!(
            target: "kaldra::pipeline",
            label = %label,
            score = ?bias_score,
            confidence = tau.confidence,
            plan = plan.as_u8(),
            archetype = %dominant_archetype,
            "Text analyzed"
        );

        Ok(AnalysisResult {
            bias_score,
            label,
            confidence: tau.confidence,
            risk_level,
            dominant_archetype,
            plan,
            archetype_detail,
            explanation_layers,
            signals,
        })
    }
}

impl std::fmt::Debug for BiasPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BiasPipeline")
            .field("settings", &self.settings)
            .field("embedder", &self.embedder.name())
            .field("scorer", &self.scorer)
            .finish()
    }
}
