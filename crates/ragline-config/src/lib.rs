//! ragline configuration system.
//!
//! TOML-based configuration with validation. All sections use serde
//! defaults so partial configs work out of the box; vendor fields left
//! unset are resolved from the environment when sessions are built.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ragline_config::{config_to_json, load_config};
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    GeminiSection, LogLevel, LoggingConfig, MistralSection, RagConfig, RaglineConfig,
    CONFIG_SCHEMA_VERSION,
};
pub use toml_loader::{load_default, load_from_path};

use ragline_common::ConfigError;
use std::path::Path;

/// Load config from an explicit path, or from the platform default path
/// (creating it from the template on first run).
pub fn load_config_from(path: Option<&Path>) -> Result<RaglineConfig, ConfigError> {
    match path {
        Some(path) => load_from_path(path),
        None => load_default(),
    }
}

/// Convenience function to load config from the platform default path.
pub fn load_config() -> Result<RaglineConfig, ConfigError> {
    load_config_from(None)
}

/// Serialize a config to a pretty-printed JSON string with secrets removed.
pub fn config_to_json(config: &RaglineConfig) -> String {
    let mut redacted = config.clone();
    redacted.gemini.api_key = redacted.gemini.api_key.map(|_| "[REDACTED]".into());
    redacted.mistral.api_key = redacted.mistral.api_key.map(|_| "[REDACTED]".into());
    serde_json::to_string_pretty(&redacted)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_to_json_contains_all_sections() {
        let config = RaglineConfig::default();
        let json = config_to_json(&config);
        assert!(json.contains("\"gemini\""));
        assert!(json.contains("\"mistral\""));
        assert!(json.contains("\"rag\""));
        assert!(json.contains("\"logging\""));
    }

    #[test]
    fn config_to_json_redacts_api_keys() {
        let mut config = RaglineConfig::default();
        config.gemini.api_key = Some("gm-secret".into());
        config.mistral.api_key = Some("ms-secret".into());
        let json = config_to_json(&config);
        assert!(!json.contains("gm-secret"));
        assert!(!json.contains("ms-secret"));
        assert!(json.contains("[REDACTED]"));
    }

    #[test]
    fn config_schema_version_is_1() {
        assert_eq!(CONFIG_SCHEMA_VERSION, 1);
    }

    #[test]
    fn load_config_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[rag]\nsimilarity_top_k = 5\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.rag.similarity_top_k, 5);
    }

    #[test]
    fn default_config_round_trips_through_json() {
        let config = RaglineConfig::default();
        let json = config_to_json(&config);
        let parsed: RaglineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.mistral.model, "mistral-embed");
        assert_eq!(parsed.rag.max_node_chars, 2000);
        assert!(parsed.gemini.streaming);
    }
}
