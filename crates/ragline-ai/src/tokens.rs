//! Approximate prompt token accounting.
//!
//! Counts use the `cl100k_base` BPE, which is not the tokenizer any Gemini
//! model uses; treat results as an estimate for logging and budgeting only.

use std::sync::OnceLock;

use tiktoken_rs::CoreBPE;

use crate::{LlmError, Message};

/// Framing overhead added for every message.
pub const TOKENS_PER_MESSAGE: usize = 3;
/// Overhead for priming the assistant reply.
pub const TOKENS_PER_REPLY: usize = 3;

fn bpe() -> Result<&'static CoreBPE, LlmError> {
    static BPE: OnceLock<Result<CoreBPE, String>> = OnceLock::new();
    BPE.get_or_init(|| tiktoken_rs::cl100k_base().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(|e| LlmError::Tokenizer(e.clone()))
}

/// Number of BPE tokens in `text`.
pub fn count_tokens(text: &str) -> Result<usize, LlmError> {
    Ok(bpe()?.encode_with_special_tokens(text).len())
}

/// Estimated size of a conversation as sent to the model.
pub fn estimate_chat_tokens(messages: &[Message]) -> Result<usize, LlmError> {
    let mut total = TOKENS_PER_REPLY;
    for message in messages {
        total += TOKENS_PER_MESSAGE;
        total += count_tokens(message.role.as_str())?;
        total += count_tokens(&message.content)?;
    }
    Ok(total)
}
