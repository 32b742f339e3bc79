//! Integration test: `KALDRA_BIAS_*` environment overrides.
//!
//! Lives in its own test binary because it mutates process environment.
//! Verifies that:
//! 1. Env values win over the settings file, and the file wins over defaults.
//! 2. Numeric env values are parsed into typed fields.
//! 3. An invalid env value fails validation.

use kaldra_core::{BiasSettings, KaldraError};

#[test]
fn env_overrides_file_and_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kaldra.toml");
    std::fs::write(&path, "batch_max_items = 3\ntext_max_length_chars = 10\n").unwrap();
    let path = path.to_str().unwrap();

    std::env::set_var("KALDRA_BIAS_BATCH_MAX_ITEMS", "16");
    std::env::set_var("KALDRA_BIAS_TAU_THRESHOLD", "0.25");
    std::env::set_var("KALDRA_BIAS_ENVIRONMENT", "prod");
    let loaded = BiasSettings::load_from(path);
    std::env::remove_var("KALDRA_BIAS_BATCH_MAX_ITEMS");
    std::env::remove_var("KALDRA_BIAS_TAU_THRESHOLD");
    std::env::remove_var("KALDRA_BIAS_ENVIRONMENT");

    let s = loaded.unwrap();
    assert_eq!(s.batch_max_items, 16);
    assert_eq!(s.text_max_length_chars, 10);
    assert!((s.tau_threshold - 0.25).abs() < 1e-12);
    assert_eq!(s.environment, "prod");
    assert_eq!(s.default_plan, 6);

    // Env cleared: the file value is back.
    assert_eq!(BiasSettings::load_from(path).unwrap().batch_max_items, 3);

    std::env::set_var("KALDRA_BIAS_DEFAULT_PLAN", "4");
    let invalid = BiasSettings::load_from(path);
    std::env::remove_var("KALDRA_BIAS_DEFAULT_PLAN");
    assert!(matches!(invalid, Err(KaldraError::Config(_))));
}
