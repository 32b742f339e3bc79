//! kaldra-core: shared layer for the KALDRA kernels.
//!
//! Settings, error types, logging setup, immutable reference tables (locales,
//! Δ12 archetypes, Δ144 narrative grid, cultural weights), embedding backends and
//! the Δ144 archetype mapper.

pub mod delta144;
pub mod embeddings;
pub mod error;
pub mod logging;
pub mod reference;
pub mod settings;

pub use delta144::{dominant_index, map_to_delta144, ArchetypeDetail, UNKNOWN_HERO_STAGE};
pub use embeddings::{create_embedder, Embedder, HashEmbedder, RemoteEmbedder, HASH_EMBEDDING_SIZE};
pub use error::{KaldraError, KaldraResult};
pub use logging::{init_logging, APP_NAME};
pub use reference::{
    ArchetypeInfo, CulturalPlan, LocaleEntry, ReferenceData, ARCHETYPE_DIM, FALLBACK_LOCALE,
};
pub use settings::BiasSettings;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
