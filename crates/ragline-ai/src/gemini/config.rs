//! Gemini session configuration and its resolution from the environment.

use std::fmt;

use ragline_common::ConfigError;

use super::models::GeminiModel;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "GEMINI_MODEL";
pub const TEMPERATURE_ENV: &str = "GEMINI_TEMPERATURE";
pub const TOP_P_ENV: &str = "GEMINI_TOP_P";
pub const MAX_TOKENS_ENV: &str = "GEMINI_MAX_TOKENS";

pub const DEFAULT_TEMPERATURE: f64 = 0.9;
pub const DEFAULT_TOP_P: f64 = 1.0;
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Partial configuration supplied by the caller. Unset fields are filled
/// from `GEMINI_*` environment variables, then from built-in defaults.
#[derive(Clone, Default, PartialEq)]
pub struct GeminiOptions {
    pub api_key: Option<String>,
    pub model: Option<GeminiModel>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
    pub streaming: Option<bool>,
    pub base_url: Option<String>,
}

impl fmt::Debug for GeminiOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiOptions")
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

impl GeminiOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_model(mut self, model: GeminiModel) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = Some(streaming);
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Fully resolved Gemini session configuration.
#[derive(Clone, PartialEq)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: GeminiModel,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: Option<u32>,
    /// Whether streaming calls are allowed on sessions built from this config.
    pub streaming: bool,
    pub base_url: String,
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .field("streaming", &self.streaming)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: GeminiModel::default(),
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            max_tokens: None,
            streaming: true,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Resolve `options` against the process environment.
    pub fn from_env(options: GeminiOptions) -> Result<Self, ConfigError> {
        Self::resolve_with(options, |name| std::env::var(name).ok())
    }

    /// Resolve `options`, reading missing fields through `lookup`.
    ///
    /// Resolution order per field: explicit option, then `lookup`, then the
    /// built-in default. The API key has no default: without one this fails
    /// with `ConfigError::MissingApiKey`.
    pub fn resolve_with(
        options: GeminiOptions,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let env = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = options
            .api_key
            .filter(|key| !key.trim().is_empty())
            .or_else(|| env(API_KEY_ENV))
            .ok_or(ConfigError::MissingApiKey { var: API_KEY_ENV })?;

        let model = match options.model {
            Some(model) => model,
            None => env(MODEL_ENV)
                .map(|id| id.parse::<GeminiModel>())
                .transpose()?
                .unwrap_or_default(),
        };

        let temperature = match options.temperature {
            Some(value) => value,
            None => parse_env(&env, TEMPERATURE_ENV)?.unwrap_or(DEFAULT_TEMPERATURE),
        };

        let top_p = match options.top_p {
            Some(value) => value,
            None => parse_env(&env, TOP_P_ENV)?.unwrap_or(DEFAULT_TOP_P),
        };

        let max_tokens = match options.max_tokens {
            Some(value) => Some(value),
            None => parse_env(&env, MAX_TOKENS_ENV)?,
        };

        let config = Self {
            api_key,
            model,
            temperature,
            top_p,
            max_tokens,
            streaming: options.streaming.unwrap_or(true),
            base_url: options
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants every session relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey { var: API_KEY_ENV });
        }
        check_range("temperature", self.temperature, 0.0, 2.0)?;
        check_range("top_p", self.top_p, 0.0, 1.0)?;
        if self.max_tokens == Some(0) {
            return Err(ConfigError::InvalidValue {
                name: "max_tokens".into(),
                value: "0".into(),
            });
        }
        Ok(())
    }

    pub fn with_model(mut self, model: GeminiModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = top_p;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn parse_env<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, ConfigError> {
    env(name)
        .map(|raw| {
            raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                value: raw,
            })
        })
        .transpose()
}

fn check_range(name: &str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            value: format!("{value} (expected {min}..={max})"),
        });
    }
    Ok(())
}
