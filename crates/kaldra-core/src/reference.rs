//! Reference tables for the bias kernel: locale → plan map, Δ12 archetype list,
//! Δ144 narrative grid and the 3×48 cultural weights.
//!
//! Built-in copies of every table are compiled in from `data/archetypes/`. A data
//! directory with the same file names can replace them at startup. Once loaded,
//! a `ReferenceData` is never mutated; share it behind an `Arc`.

use crate::delta144::ArchetypeDetail;
use crate::error::{KaldraError, KaldraResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

/// Width of the archetype vector (Δ12).
pub const ARCHETYPE_DIM: usize = 12;

pub const LOCALES_MAP_FILE: &str = "locales_map.json";
pub const ARCHETYPES_FILE: &str = "delta12_archetypes.json";
pub const DELTA144_GRID_FILE: &str = "delta144_grid.json";
pub const CULTURAL_WEIGHTS_FILE: &str = "cultural_3x48.json";

/// Locale used when the requested one is not in the map.
pub const FALLBACK_LOCALE: &str = "en";

const BUILTIN_LOCALES_MAP: &str = include_str!("../data/archetypes/locales_map.json");
const BUILTIN_ARCHETYPES: &str = include_str!("../data/archetypes/delta12_archetypes.json");
const BUILTIN_DELTA144_GRID: &str = include_str!("../data/archetypes/delta144_grid.json");
const BUILTIN_CULTURAL_WEIGHTS: &str = include_str!("../data/archetypes/cultural_3x48.json");

/// Cultural modulation tier. Serialized as the bare integer 3, 6 or 9.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CulturalPlan {
    Three,
    Six,
    Nine,
}

impl CulturalPlan {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Three => 3,
            Self::Six => 6,
            Self::Nine => 9,
        }
    }

    /// Key of this plan's entry in the cultural weights table (`plan_3`, ...).
    pub fn weights_key(self) -> String {
        format!("plan_{}", self.as_u8())
    }
}

impl Default for CulturalPlan {
    fn default() -> Self {
        Self::Three
    }
}

impl TryFrom<u8> for CulturalPlan {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Self::Three),
            6 => Ok(Self::Six),
            9 => Ok(Self::Nine),
            other => Err(format!("cultural plan must be 3, 6 or 9, got {}", other)),
        }
    }
}

impl From<CulturalPlan> for u8 {
    fn from(plan: CulturalPlan) -> Self {
        plan.as_u8()
    }
}

impl fmt::Display for CulturalPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// One row of `locales_map.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocaleEntry {
    #[serde(default)]
    pub culture: Option<String>,
    /// Missing plan resolves to plan 3.
    #[serde(default)]
    pub plan: Option<CulturalPlan>,
}

/// One row of `delta12_archetypes.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchetypeInfo {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Immutable reference tables shared by every pipeline stage.
#[derive(Debug, Clone)]
pub struct ReferenceData {
    locales: HashMap<String, LocaleEntry>,
    /// Ordered by id; index 0 is the reference "innocent" archetype.
    archetypes: Vec<ArchetypeInfo>,
    delta144: HashMap<String, ArchetypeDetail>,
    delta144_rows: usize,
    cultural_weights: serde_json::Map<String, Value>,
}

impl ReferenceData {
    /// Tables compiled into the crate.
    pub fn builtin() -> KaldraResult<Self> {
        Self::from_json_strs(
            BUILTIN_LOCALES_MAP,
            BUILTIN_ARCHETYPES,
            BUILTIN_DELTA144_GRID,
            Some(BUILTIN_CULTURAL_WEIGHTS),
        )
    }

    /// Load tables from `dir`. The cultural weights file is optional: when it is
    /// missing, modulation runs as a no-op.
    pub fn load_dir(dir: &Path) -> KaldraResult<Self> {
        let locales = std::fs::read_to_string(dir.join(LOCALES_MAP_FILE))?;
        let archetypes = std::fs::read_to_string(dir.join(ARCHETYPES_FILE))?;
        let grid = std::fs::read_to_string(dir.join(DELTA144_GRID_FILE))?;
        let weights_path = dir.join(CULTURAL_WEIGHTS_FILE);
        let weights = if weights_path.exists() {
            Some(std::fs::read_to_string(&weights_path)?)
        } else {
            tracing::info!(
                target: "kaldra::reference",
                path = %weights_path.display(),
                "Cultural weights file not found; modulation will be a no-op"
            );
            None
        };
        Self::from_json_strs(&locales, &archetypes, &grid, weights.as_deref())
    }

    /// `data_dir` when set, built-in tables otherwise.
    pub fn load(data_dir: Option<&Path>) -> KaldraResult<Self> {
        match data_dir {
            Some(dir) => Self::load_dir(dir),
            None => Self::builtin(),
        }
    }

    /// Parse the four tables from JSON text.
    pub fn from_json_strs(
        locales_json: &str,
        archetypes_json: &str,
        grid_json: &str,
        weights_json: Option<&str>,
    ) -> KaldraResult<Self> {
        let locales: HashMap<String, LocaleEntry> = serde_json::from_str(locales_json)
            .map_err(|e| KaldraError::Reference(format!("{}: {}", LOCALES_MAP_FILE, e)))?;

        let mut archetypes: Vec<ArchetypeInfo> = serde_json::from_str(archetypes_json)
            .map_err(|e| KaldraError::Reference(format!("{}: {}", ARCHETYPES_FILE, e)))?;
        if archetypes.len() != ARCHETYPE_DIM {
            return Err(KaldraError::Config(format!(
                "{} must list exactly {} archetypes, found {}",
                ARCHETYPES_FILE,
                ARCHETYPE_DIM,
                archetypes.len()
            )));
        }
        archetypes.sort_by_key(|a| a.id);

        let rows: Vec<ArchetypeDetail> = serde_json::from_str(grid_json)
            .map_err(|e| KaldraError::Reference(format!("{}: {}", DELTA144_GRID_FILE, e)))?;
        let delta144_rows = rows.len();
        // Keyed by archetype name; a later row for the same name replaces an earlier one.
        let delta144: HashMap<String, ArchetypeDetail> =
            rows.into_iter().map(|row| (row.name.clone(), row)).collect();

        // Malformed weights never fail the load; they degrade to "no weights".
        let cultural_weights = match weights_json.map(serde_json::from_str::<Value>) {
            Some(Ok(Value::Object(map))) => map,
            Some(Ok(_)) | Some(Err(_)) => {
                tracing::warn!(
                    target: "kaldra::reference",
                    "Cultural weights are not a JSON object; modulation will be a no-op"
                );
                serde_json::Map::new()
            }
            None => serde_json::Map::new(),
        };

        tracing::debug!(
            target: "kaldra::reference",
            locales = locales.len(),
            delta144_rows,
            weight_plans = cultural_weights.len(),
            "Reference data loaded"
        );

        Ok(Self {
            locales,
            archetypes,
            delta144,
            delta144_rows,
            cultural_weights,
        })
    }

    /// Resolve the plan for `locale`: its entry, else the "en" entry, else plan 3.
    pub fn resolve_plan(&self, locale: &str) -> CulturalPlan {
        self.locales
            .get(locale)
            .or_else(|| self.locales.get(FALLBACK_LOCALE))
            .and_then(|entry| entry.plan)
            .unwrap_or(CulturalPlan::Three)
    }

    /// Weight vector stored for `plan`, if the stored value is an array of finite numbers.
    /// Length is not checked here.
    pub fn plan_weights(&self, plan: CulturalPlan) -> Option<Vec<f64>> {
        let items = self.cultural_weights.get(&plan.weights_key())?.as_array()?;
        items
            .iter()
            .map(|v| v.as_f64().filter(|x| x.is_finite()))
            .collect()
    }

    pub fn archetypes(&self) -> &[ArchetypeInfo] {
        &self.archetypes
    }

    /// Name of the archetype at Δ12 position `index`.
    pub fn archetype_name(&self, index: usize) -> Option<&str> {
        self.archetypes.get(index).map(|a| a.name.as_str())
    }

    pub fn delta144_entry(&self, name: &str) -> Option<&ArchetypeDetail> {
        self.delta144.get(name)
    }

    /// Number of rows in the Δ144 grid as loaded (before keying by name).
    pub fn delta144_rows(&self) -> usize {
        self.delta144_rows
    }

    pub fn locale_entry(&self, locale: &str) -> Option<&LocaleEntry> {
        self.locales.get(locale)
    }
}
