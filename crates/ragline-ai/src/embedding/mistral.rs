//! Mistral AI embeddings (`POST /v1/embeddings`).

use std::fmt;

use async_trait::async_trait;
use ragline_common::{new_correlation_id, ConfigError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::http::{build_client, ensure_success};
use crate::LlmError;

use super::Embedding;

pub const MISTRAL_API_KEY_ENV: &str = "MISTRAL_API_KEY";
pub const MISTRAL_DEFAULT_BASE_URL: &str = "https://api.mistral.ai";
pub const MISTRAL_DEFAULT_MODEL: &str = "mistral-embed";

#[derive(Clone, PartialEq)]
pub struct MistralConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl fmt::Debug for MistralConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MistralConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl MistralConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: MISTRAL_DEFAULT_MODEL.to_string(),
            base_url: MISTRAL_DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Use `api_key` if given, else `MISTRAL_API_KEY`.
    pub fn from_env(api_key: Option<String>) -> Result<Self, ConfigError> {
        Self::resolve_with(api_key, |name| std::env::var(name).ok())
    }

    pub fn resolve_with(
        api_key: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let present = |key: &String| !key.trim().is_empty();
        api_key
            .filter(present)
            .or_else(|| lookup(MISTRAL_API_KEY_ENV).filter(present))
            .map(Self::new)
            .ok_or(ConfigError::MissingApiKey {
                var: MISTRAL_API_KEY_ENV,
            })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

impl EmbeddingResponse {
    /// Vectors in input order.
    fn into_vectors(mut self, expected: usize) -> Result<Vec<Vec<f32>>, LlmError> {
        if self.data.len() != expected {
            return Err(LlmError::MalformedResponse(format!(
                "expected {expected} embeddings, got {}",
                self.data.len()
            )));
        }
        self.data.sort_by_key(|item| item.index);
        Ok(self.data.into_iter().map(|item| item.embedding).collect())
    }
}

/// Embedding client for the Mistral AI API.
pub struct MistralEmbedding {
    config: MistralConfig,
    http: reqwest::Client,
}

impl fmt::Debug for MistralEmbedding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MistralEmbedding")
            .field("config", &self.config)
            .finish()
    }
}

impl MistralEmbedding {
    pub fn new(config: MistralConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey {
                var: MISTRAL_API_KEY_ENV,
            }
            .into());
        }
        Ok(Self {
            config,
            http: build_client()?,
        })
    }

    pub fn config(&self) -> &MistralConfig {
        &self.config
    }

    fn api_url(&self) -> String {
        format!("{}/v1/embeddings", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl Embedding for MistralEmbedding {
    async fn text_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request_id = new_correlation_id();
        debug!(model = %self.config.model, inputs = texts.len(), %request_id, "Mistral embeddings request");

        let body = EmbeddingRequest {
            model: &self.config.model,
            input: texts,
        };
        let response = self
            .http
            .post(self.api_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let parsed = ensure_success(response)
            .await?
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        parsed.into_vectors(texts.len())
    }
}
