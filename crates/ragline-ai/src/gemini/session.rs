//! Gemini session: configuration, vendor handle, and request building.

use std::fmt;
use std::sync::Arc;

use ragline_common::EventBus;

use crate::{LlmError, Message, Role};

use super::config::{GeminiConfig, GeminiOptions};
use super::transport::{GeminiTransport, HttpTransport};
use super::types::{Content, GenerateContentRequest, GenerationConfig, Part, MODEL_ROLE, USER_ROLE};

/// A configured handle bound to one API key and model.
///
/// Holds no per-call state, so one session can serve any number of
/// concurrent calls.
pub struct GeminiSession {
    pub(crate) config: GeminiConfig,
    pub(crate) transport: Arc<dyn GeminiTransport>,
    pub(crate) callbacks: Option<Arc<EventBus>>,
}

impl fmt::Debug for GeminiSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiSession")
            .field("config", &self.config)
            .field("callbacks", &self.callbacks.is_some())
            .finish()
    }
}

impl GeminiSession {
    /// Build a session talking to the Gemini REST API. Sends nothing.
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        config.validate()?;
        let transport = HttpTransport::new(config.api_key.clone(), config.base_url.clone())?;
        Ok(Self {
            config,
            transport: Arc::new(transport),
            callbacks: None,
        })
    }

    /// Resolve `options` against the environment, then build the session.
    pub fn from_options(options: GeminiOptions) -> Result<Self, LlmError> {
        Self::new(GeminiConfig::from_env(options)?)
    }

    /// Build a session over a caller-supplied vendor client.
    pub fn with_transport(
        config: GeminiConfig,
        transport: Arc<dyn GeminiTransport>,
    ) -> Result<Self, LlmError> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            callbacks: None,
        })
    }

    /// Publish streaming callbacks to `bus`.
    pub fn with_callbacks(mut self, bus: Arc<EventBus>) -> Self {
        self.callbacks = Some(bus);
        self
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    /// Translate a conversation into a `generateContent` request.
    ///
    /// System messages are lifted into `systemInstruction`, in order; the
    /// remaining turns keep their order.
    pub(crate) fn build_request(&self, messages: &[Message]) -> GenerateContentRequest {
        let mut contents = Vec::with_capacity(messages.len());
        let mut system_parts = Vec::new();

        for msg in messages {
            let role = match msg.role {
                Role::User => USER_ROLE,
                Role::Assistant => MODEL_ROLE,
                Role::System => {
                    system_parts.push(Part::text(msg.content.clone()));
                    continue;
                }
            };
            contents.push(Content {
                role: Some(role.to_string()),
                parts: vec![Part::text(msg.content.clone())],
            });
        }

        let system_instruction = (!system_parts.is_empty()).then(|| Content {
            role: None,
            parts: system_parts,
        });

        GenerateContentRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                max_output_tokens: self.config.max_tokens,
            },
        }
    }
}
