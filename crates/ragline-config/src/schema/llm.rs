//! Vendor sections: Gemini chat model and Mistral embeddings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Gemini chat settings. Unset fields fall through to `GEMINI_*` env vars.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSection {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
    /// Disable to make streaming calls fail fast.
    pub streaming: bool,
    pub base_url: Option<String>,
}

impl Default for GeminiSection {
    fn default() -> Self {
        Self {
            api_key: None,
            model: None,
            temperature: None,
            top_p: None,
            max_tokens: None,
            streaming: true,
            base_url: None,
        }
    }
}

impl fmt::Debug for GeminiSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSection")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .field("streaming", &self.streaming)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Mistral embedding settings. `api_key` falls back to `MISTRAL_API_KEY`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MistralSection {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: Option<String>,
}

impl Default for MistralSection {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "mistral-embed".into(),
            base_url: None,
        }
    }
}

impl fmt::Debug for MistralSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MistralSection")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}
