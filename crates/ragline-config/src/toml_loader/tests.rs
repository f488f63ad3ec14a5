//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use crate::schema::LogLevel;
use ragline_common::ConfigError;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_ragline_config.toml"));
    assert!(matches!(
        result,
        Err(ragline_common::ConfigError::FileNotFound(_))
    ));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r##"
[gemini]
model = "gemini-pro-vision"
temperature = 0.2

[logging]
level = "DEBUG"
"##,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.gemini.model.as_deref(), Some("gemini-pro-vision"));
    assert_eq!(config.gemini.temperature, Some(0.2));
    assert_eq!(config.logging.level, LogLevel::Debug);
    // Defaults preserved
    assert!(config.gemini.streaming);
    assert_eq!(config.gemini.top_p, None);
    assert_eq!(config.mistral.model, "mistral-embed");
    assert_eq!(config.rag.similarity_top_k, 2);
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let result = load_from_path(&path);
    assert!(matches!(
        result,
        Err(ragline_common::ConfigError::ParseError(_))
    ));
}

#[test]
fn load_out_of_range_values_returns_validation_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[gemini]
top_p = 4.0
"#,
    )
    .unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, ragline_common::ConfigError::ValidationError(_)));
    assert!(err.to_string().contains("gemini.top_p"));
}

#[test]
fn missing_file_is_created_from_template() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ragline").join("config.toml");

    let first = load_or_create(&path).unwrap();
    assert!(path.exists());
    assert_eq!(first.rag.similarity_top_k, 2);

    let config = load_from_path(&path).unwrap();
    assert!(config.gemini.api_key.is_none());
    assert!(config.gemini.streaming);
    assert_eq!(config.mistral.model, "mistral-embed");
    assert_eq!(config.rag.query, "What did the author do in college?");
    assert_eq!(config.logging.level, LogLevel::Info);
}

#[test]
fn existing_file_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[rag]\nsimilarity_top_k = 4\n").unwrap();

    let config = load_or_create(&path).unwrap();
    assert_eq!(config.rag.similarity_top_k, 4);
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "[rag]\nsimilarity_top_k = 4\n"
    );
}

#[test]
fn unwritable_location_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("ragline");
    std::fs::write(&blocker, "a file, not a directory").unwrap();
    let path = blocker.join("config.toml");

    let err = load_or_create(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Io { path: ref at, .. } if at == &blocker));
    assert!(err.to_string().contains("ragline"));
}

#[test]
fn unreadable_config_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory passes the existence check but cannot be read as a file.
    let err = load_from_path(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn default_config_path_ends_with_ragline() {
    match default_config_path() {
        Ok(path) => assert!(path.ends_with("ragline/config.toml")),
        Err(err) => assert!(matches!(err, ConfigError::NoConfigDir)),
    }
}
