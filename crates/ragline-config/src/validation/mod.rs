//! Full configuration validation.
//!
//! Each section has its own validator; this orchestrator calls them all
//! and collects errors into a single `ConfigError`.

mod helpers;
mod llm;
mod rag;


use crate::schema::RaglineConfig;
use ragline_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &RaglineConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    llm::validate_gemini(&mut errors, config);
    llm::validate_mistral(&mut errors, config);
    rag::validate_rag(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
