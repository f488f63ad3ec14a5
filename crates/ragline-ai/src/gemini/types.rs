//! Wire types for the Gemini `generateContent` REST API.
//!
//! Responses are parsed into these types and then checked explicitly:
//! a reply without a usable candidate is a `MalformedResponse` (or
//! `Blocked`), never a silent empty string.

use serde::{Deserialize, Serialize};

use crate::{LlmError, Message, Role, TokenUsage};

/// Vendor role for assistant turns.
pub const MODEL_ROLE: &str = "model";
pub const USER_ROLE: &str = "user";
const FINISH_STOP: &str = "STOP";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    /// Concatenated text of all parts, or `None` when no part carries text.
    pub fn text(&self) -> Option<String> {
        let mut texts = self.parts.iter().filter_map(|p| p.text.as_deref()).peekable();
        texts.peek()?;
        Some(texts.collect())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f64,
    pub top_p: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u64,
    #[serde(default)]
    pub candidates_token_count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    pub fn usage(&self) -> Option<TokenUsage> {
        self.usage_metadata.as_ref().map(|meta| TokenUsage {
            input_tokens: meta.prompt_token_count,
            output_tokens: meta.candidates_token_count,
        })
    }

    fn check_blocked(&self) -> Result<(), LlmError> {
        match self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_ref())
        {
            Some(reason) => Err(LlmError::Blocked(reason.clone())),
            None => Ok(()),
        }
    }

    /// The first candidate as a uniform message.
    pub fn into_message(self) -> Result<Message, LlmError> {
        self.check_blocked()?;

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::MalformedResponse("no candidates in response".into()))?;

        let content = candidate.content.ok_or_else(|| {
            LlmError::MalformedResponse(format!(
                "candidate has no content (finish reason: {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })?;

        let text = content
            .text()
            .ok_or_else(|| LlmError::MalformedResponse("candidate has no text parts".into()))?;

        let role = match content.role.as_deref() {
            Some(USER_ROLE) => Role::User,
            _ => Role::Assistant,
        };

        Ok(Message::new(role, text))
    }

    /// Text carried by one streamed chunk.
    ///
    /// `Ok(None)` for chunks that only close the stream normally or report
    /// usage. A text-less candidate stopped for any reason other than `STOP`
    /// is reported as blocked.
    pub fn text_delta(&self) -> Result<Option<String>, LlmError> {
        self.check_blocked()?;

        match self.candidates.first() {
            Some(candidate) => match candidate.content.as_ref().and_then(Content::text) {
                Some(text) => Ok(Some(text)),
                None => match candidate.finish_reason.as_deref() {
                    None | Some(FINISH_STOP) => Ok(None),
                    Some(reason) => Err(LlmError::Blocked(reason.to_string())),
                },
            },
            None if self.usage_metadata.is_some() => Ok(None),
            None => Err(LlmError::MalformedResponse(
                "stream chunk has no candidates".into(),
            )),
        }
    }
}
