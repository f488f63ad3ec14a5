//! Merge command-line overrides into the loaded config and derive vendor
//! settings from it.
//!
//! Precedence per field: CLI flag, config file, environment, built-in default.
//! The first two are applied here; the last two happen when sessions resolve
//! their options.

use ragline_ai::{GeminiModel, GeminiOptions, MistralConfig};
use ragline_common::ConfigError;
use ragline_config::{GeminiSection, MistralSection, RaglineConfig};

use crate::cli::Args;

/// Apply CLI overrides on top of `config` and re-validate the result.
pub fn apply_overrides(mut config: RaglineConfig, args: &Args) -> Result<RaglineConfig, ConfigError> {
    if let Some(model) = &args.model {
        config.gemini.model = Some(model.clone());
    }
    if args.no_stream {
        config.gemini.streaming = false;
    }
    if let Some(document) = &args.document {
        config.rag.document = document.clone();
    }
    if let Some(query) = &args.query {
        config.rag.query = query.clone();
    }
    if let Some(top_k) = args.top_k {
        config.rag.similarity_top_k = top_k;
    }

    ragline_config::validation::validate(&config)?;
    Ok(config)
}

/// Explicit Gemini options from the config file. Unset fields stay `None`
/// so the session falls back to `GEMINI_*` variables.
pub fn gemini_options(section: &GeminiSection) -> Result<GeminiOptions, ConfigError> {
    let mut options = GeminiOptions::new().with_streaming(section.streaming);

    if let Some(key) = &section.api_key {
        options = options.with_api_key(key.clone());
    }
    if let Some(id) = &section.model {
        options = options.with_model(id.parse::<GeminiModel>()?);
    }
    if let Some(temperature) = section.temperature {
        options = options.with_temperature(temperature);
    }
    if let Some(top_p) = section.top_p {
        options = options.with_top_p(top_p);
    }
    if let Some(max_tokens) = section.max_tokens {
        options = options.with_max_tokens(max_tokens);
    }
    if let Some(url) = &section.base_url {
        options = options.with_base_url(url.clone());
    }

    Ok(options)
}

pub fn mistral_config(section: &MistralSection) -> Result<MistralConfig, ConfigError> {
    let mut config = MistralConfig::from_env(section.api_key.clone())?.with_model(section.model.clone());
    if let Some(url) = &section.base_url {
        config = config.with_base_url(url.clone());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn cli_flags_override_file_values() {
        let mut config = RaglineConfig::default();
        config.gemini.model = Some("gemini-pro".into());
        config.rag.similarity_top_k = 2;

        let args = Args {
            model: Some("aqa".into()),
            document: Some(PathBuf::from("notes.txt")),
            query: Some("Where did the author study?".into()),
            top_k: Some(5),
            no_stream: true,
            ..Args::default()
        };
        let merged = apply_overrides(config, &args).unwrap();

        assert_eq!(merged.gemini.model.as_deref(), Some("aqa"));
        assert!(!merged.gemini.streaming);
        assert_eq!(merged.rag.document, PathBuf::from("notes.txt"));
        assert_eq!(merged.rag.query, "Where did the author study?");
        assert_eq!(merged.rag.similarity_top_k, 5);
    }

    #[test]
    fn out_of_range_override_is_rejected() {
        let args = Args {
            top_k: Some(0),
            ..Args::default()
        };
        let err = apply_overrides(RaglineConfig::default(), &args).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn file_values_become_explicit_options() {
        let section = GeminiSection {
            api_key: Some("file-key".into()),
            model: Some("models/gemini-pro-vision".into()),
            temperature: Some(0.3),
            max_tokens: Some(512),
            streaming: false,
            ..GeminiSection::default()
        };
        let options = gemini_options(&section).unwrap();
        let expected = GeminiOptions::new()
            .with_streaming(false)
            .with_api_key("file-key")
            .with_model(GeminiModel::GeminiProVision)
            .with_temperature(0.3)
            .with_max_tokens(512);
        assert!(options == expected);
    }

    #[test]
    fn unknown_model_in_file_is_an_error() {
        let section = GeminiSection {
            model: Some("gemini-ultra-9000".into()),
            ..GeminiSection::default()
        };
        assert!(matches!(
            gemini_options(&section),
            Err(ConfigError::UnknownModel(_))
        ));
    }

    #[test]
    fn mistral_settings_from_file() {
        let section = MistralSection {
            api_key: Some("ms-key".into()),
            model: "mistral-embed".into(),
            base_url: Some("http://localhost:9000".into()),
        };
        let config = mistral_config(&section).unwrap();
        assert_eq!(config.api_key, "ms-key");
        assert_eq!(config.base_url, "http://localhost:9000");
    }
}
