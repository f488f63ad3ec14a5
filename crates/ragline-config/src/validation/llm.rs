//! Vendor section validation (sampling ranges, URLs, model names).

use crate::schema::RaglineConfig;

use super::helpers::{validate_range, validate_range_f64, validate_url};

pub(crate) fn validate_gemini(errors: &mut Vec<String>, config: &RaglineConfig) {
    let gemini = &config.gemini;

    if let Some(temperature) = gemini.temperature {
        validate_range_f64(errors, "gemini.temperature", temperature, 0.0, 2.0);
    }
    if let Some(top_p) = gemini.top_p {
        validate_range_f64(errors, "gemini.top_p", top_p, 0.0, 1.0);
    }
    if let Some(max_tokens) = gemini.max_tokens {
        validate_range(errors, "gemini.max_tokens", max_tokens, 1, 1_000_000);
    }
    if let Some(model) = &gemini.model {
        if model.trim().is_empty() {
            errors.push("gemini.model must not be empty".into());
        }
    }
    validate_url(errors, "gemini.base_url", gemini.base_url.as_deref());
}

pub(crate) fn validate_mistral(errors: &mut Vec<String>, config: &RaglineConfig) {
    if config.mistral.model.trim().is_empty() {
        errors.push("mistral.model must not be empty".into());
    }
    validate_url(errors, "mistral.base_url", config.mistral.base_url.as_deref());
}
