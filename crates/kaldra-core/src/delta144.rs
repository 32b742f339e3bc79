//! Δ144 archetype mapper: dominant Δ12 archetype → narrative record (hero stage + description).

use crate::reference::ReferenceData;
use serde::{Deserialize, Serialize};

/// Hero stage reported when an archetype name is not in the grid.
pub const UNKNOWN_HERO_STAGE: &str = "unknown";

/// One row of the Δ144 narrative grid, also the shape returned for a lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeDetail {
    /// None for the fallback record.
    #[serde(default)]
    pub id: Option<u32>,
    pub name: String,
    pub hero_stage: String,
    #[serde(default)]
    pub description: String,
}

impl ArchetypeDetail {
    /// Record returned for names missing from the grid.
    pub fn fallback(name: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            hero_stage: UNKNOWN_HERO_STAGE.to_string(),
            description: String::new(),
        }
    }

    /// True when the record carries no data at all (empty-input results).
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.name.is_empty()
            && self.hero_stage.is_empty()
            && self.description.is_empty()
    }
}

/// Index of the largest weight; the lowest index wins ties. None for an empty slice.
pub fn dominant_index(weights: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &w) in weights.iter().enumerate() {
        match best {
            Some((_, b)) if w <= b => {}
            _ => best = Some((i, w)),
        }
    }
    best.map(|(i, _)| i)
}

/// Look up `archetype_name` in the Δ144 grid. Never fails: unknown names get
/// [`ArchetypeDetail::fallback`].
pub fn map_to_delta144(archetype_name: &str, reference: &ReferenceData) -> ArchetypeDetail {
    reference
        .delta144_entry(archetype_name)
        .cloned()
        .unwrap_or_else(|| ArchetypeDetail::fallback(archetype_name))
}
