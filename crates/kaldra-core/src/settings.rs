//! Bias kernel settings loaded from file and environment.
//!
//! One `BiasSettings` value is built at process start and handed to the pipeline;
//! nothing reads the environment after that.

use crate::error::{KaldraError, KaldraResult};
use crate::reference::CulturalPlan;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Env var holding the optional settings file path (extension optional).
pub const ENV_CONFIG_PATH: &str = "KALDRA_BIAS_CONFIG";
/// Prefix for per-field overrides, e.g. `KALDRA_BIAS_BATCH_MAX_ITEMS=16`.
pub const ENV_PREFIX: &str = "KALDRA_BIAS";

const DEFAULT_CONFIG_PATH: &str = "config/kaldra-bias";

fn default_environment() -> String {
    "local".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_embedding_backend() -> String {
    "hash".to_string()
}

fn default_batch_max_items() -> usize {
    64
}

fn default_text_max_length_chars() -> usize {
    8000
}

fn default_plan() -> u8 {
    6
}

fn default_tau_threshold() -> f64 {
    0.4
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

/// Bias kernel settings.
///
/// | Env | Default | Description |
/// |-----|---------|-------------|
/// | KALDRA_BIAS_ENVIRONMENT | local | local \| dev \| prod, attached to every log line. |
/// | KALDRA_BIAS_LOG_LEVEL | info | Base filter when `RUST_LOG` is unset. |
/// | KALDRA_BIAS_EMBEDDING_BACKEND | hash | "hash" (offline, deterministic) or "remote". |
/// | KALDRA_BIAS_BATCH_MAX_ITEMS | 64 | Batches longer than this are truncated. |
/// | KALDRA_BIAS_TEXT_MAX_LENGTH_CHARS | 8000 | Per-item character limit in batches. |
/// | KALDRA_BIAS_DEFAULT_PLAN | 6 | Validated and reported at startup; not used in plan resolution (locale → "en" → 3). |
/// | KALDRA_BIAS_TAU_THRESHOLD | 0.4 | Confidence below this is inconclusive. |
/// | KALDRA_BIAS_DATA_DIR | (built-in) | Directory holding the reference JSON tables. |
/// | KALDRA_BIAS_CLASSIFIER_PATH | (none) | Logistic-regression artifact; absent means heuristic scoring. |
/// | KALDRA_BIAS_EMBEDDING_API_URL | (none) | Base URL for the remote backend (e.g. https://api.openai.com/v1). |
/// | KALDRA_BIAS_EMBEDDING_API_KEY | (none) | Bearer key for the remote backend. |
/// | KALDRA_BIAS_EMBEDDING_MODEL | text-embedding-3-small | Remote embedding model. |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiasSettings {
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_embedding_backend")]
    pub embedding_backend: String,
    #[serde(default = "default_batch_max_items")]
    pub batch_max_items: usize,
    #[serde(default = "default_text_max_length_chars")]
    pub text_max_length_chars: usize,
    #[serde(default = "default_plan")]
    pub default_plan: u8,
    #[serde(default = "default_tau_threshold")]
    pub tau_threshold: f64,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub classifier_path: Option<PathBuf>,
    #[serde(default)]
    pub embedding_api_url: Option<String>,
    /// Never logged.
    #[serde(default, skip_serializing)]
    pub embedding_api_key: Option<String>,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for BiasSettings {
    fn default() -> Self {
        Self {
            environment: default_environment(),
            log_level: default_log_level(),
            embedding_backend: default_embedding_backend(),
            batch_max_items: default_batch_max_items(),
            text_max_length_chars: default_text_max_length_chars(),
            default_plan: default_plan(),
            tau_threshold: default_tau_threshold(),
            data_dir: None,
            classifier_path: None,
            embedding_api_url: None,
            embedding_api_key: None,
            embedding_model: default_embedding_model(),
        }
    }
}

impl BiasSettings {
    /// Load settings. Precedence: `KALDRA_BIAS_*` env > file at `KALDRA_BIAS_CONFIG`
    /// (default `config/kaldra-bias.{toml,...}`, optional) > defaults.
    pub fn load() -> KaldraResult<Self> {
        let config_path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&config_path)
    }

    /// Same as [`BiasSettings::load`] with an explicit file path (which may not exist).
    pub fn load_from(config_path: &str) -> KaldraResult<Self> {
        let built = config::Config::builder()
            .set_default("environment", default_environment())?
            .set_default("log_level", default_log_level())?
            .set_default("embedding_backend", default_embedding_backend())?
            .set_default("batch_max_items", default_batch_max_items() as i64)?
            .set_default("text_max_length_chars", default_text_max_length_chars() as i64)?
            .set_default("default_plan", default_plan() as i64)?
            .set_default("tau_threshold", default_tau_threshold())?
            .set_default("embedding_model", default_embedding_model())?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .try_parsing(true),
            )
            .build()?;

        let settings: BiasSettings = built.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the pipeline cannot honor.
    pub fn validate(&self) -> KaldraResult<()> {
        if self.batch_max_items == 0 {
            return Err(KaldraError::Config("batch_max_items must be at least 1".to_string()));
        }
        if self.text_max_length_chars == 0 {
            return Err(KaldraError::Config(
                "text_max_length_chars must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.tau_threshold) {
            return Err(KaldraError::Config(format!(
                "tau_threshold must be within [0, 1], got {}",
                self.tau_threshold
            )));
        }
        CulturalPlan::try_from(self.default_plan).map_err(KaldraError::Config)?;
        Ok(())
    }

    /// `default_plan` as a typed plan. Falls back to plan 6 if the value was never validated.
    pub fn default_plan(&self) -> CulturalPlan {
        CulturalPlan::try_from(self.default_plan).unwrap_or(CulturalPlan::Six)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_classifier_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.classifier_path = Some(path.into());
        self
    }
}
