//! Integration test: layer configuration parsing.

use vkchassis_core::{ChassisConfig, CoreError, UnknownHandlePolicy};

#[test]
fn test_defaults() {
    let config = ChassisConfig::default();
    assert!(config.layer.wrap_handles);
    assert_eq!(config.layer.unknown_handles, UnknownHandlePolicy::Null);
    assert_eq!(config.logging.filter, "warn");
}

#[test]
fn test_parse_full() {
    let config = ChassisConfig::parse(
        r#"
        [layer]
        wrap_handles = false
        unknown_handles = "fail_fast"

        [logging]
        filter = "vkchassis_layer=trace"
        "#,
    )
    .unwrap();
    assert!(!config.layer.wrap_handles);
    assert_eq!(config.layer.unknown_handles, UnknownHandlePolicy::FailFast);
    assert_eq!(config.logging.filter, "vkchassis_layer=trace");
}

#[test]
fn test_parse_partial_keeps_defaults() {
    let config = ChassisConfig::parse("[logging]\nfilter = \"debug\"\n").unwrap();
    assert!(config.layer.wrap_handles);
    assert_eq!(config.logging.filter, "debug");
}

#[test]
fn test_parse_rejects_bad_policy() {
    let err = ChassisConfig::parse("[layer]\nunknown_handles = \"explode\"\n").unwrap_err();
    assert!(matches!(err, CoreError::Toml(_)));
}

#[test]
fn test_missing_file_falls_back() {
    let config = ChassisConfig::load("/nonexistent/vkchassis-test.toml");
    assert!(matches!(config, Err(CoreError::Io(_))));
}
