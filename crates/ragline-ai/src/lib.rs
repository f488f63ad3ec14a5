//! LLM adapter layer for ragline.
//!
//! Provides a uniform chat / complete / embedding interface over hosted
//! model APIs:
//! - `GeminiSession`: Google Gemini chat, non-streaming and streaming (SSE)
//! - `SessionCache`: reuse one session per distinct configuration
//! - `MistralEmbedding`: Mistral AI text embeddings
//! - token estimation and per-model metadata

pub mod embedding;
pub mod gemini;
pub mod streaming;
pub mod tokens;

mod http;

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use ragline_common::{ConfigError, Event, RaglineError};

pub use embedding::{cosine_similarity, Embedding, MistralConfig, MistralEmbedding};
pub use gemini::{GeminiConfig, GeminiModel, GeminiOptions, GeminiSession, SessionCache};

/// Lazily-produced text fragments of a streaming reply, in arrival order.
///
/// The stream is forward-only; consuming the reply again requires a new call.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

/// Capability interface a model backend must satisfy to plug into the
/// retrieval pipeline.
#[async_trait]
pub trait Llm: Send + Sync {
    /// Whether `stream_chat` / `stream_complete` may be called.
    fn has_streaming(&self) -> bool;

    fn metadata(&self) -> LlmMetadata;

    /// Approximate prompt size in tokens. Informational only.
    fn tokens(&self, messages: &[Message]) -> Result<usize, LlmError>;

    async fn chat(
        &self,
        messages: &[Message],
        parent: Option<&Event>,
    ) -> Result<ChatResponse, LlmError>;

    async fn stream_chat(
        &self,
        messages: &[Message],
        parent: Option<&Event>,
    ) -> Result<TextStream, LlmError>;

    /// Single-prompt shorthand for `chat` with one user message.
    async fn complete(
        &self,
        prompt: &str,
        parent: Option<&Event>,
    ) -> Result<ChatResponse, LlmError> {
        self.chat(&[Message::user(prompt)], parent).await
    }

    async fn stream_complete(
        &self,
        prompt: &str,
        parent: Option<&Event>,
    ) -> Result<TextStream, LlmError> {
        self.stream_chat(&[Message::user(prompt)], parent).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reply to a non-streaming chat call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub message: Message,
    /// Vendor-reported usage, when the response carried it.
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total_tokens(&self) -> u64 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// Static description of a configured model.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmMetadata {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: Option<u32>,
    pub context_window: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
    #[error("API error: HTTP {status}: {message}")]
    ApiError { status: u16, message: String },
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Blocked by provider: {0}")]
    Blocked(String),
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),
}

impl LlmError {
    /// Workspace error for a failure on the embedding side. Config errors
    /// keep their own variant.
    pub fn into_embedding_error(self) -> RaglineError {
        match self {
            LlmError::Config(config) => RaglineError::Config(config),
            other => RaglineError::Embedding(other.to_string()),
        }
    }
}

impl From<LlmError> for RaglineError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Config(config) => RaglineError::Config(config),
            other => RaglineError::Llm(other.to_string()),
        }
    }
}
