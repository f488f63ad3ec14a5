//! Llm trait implementation for GeminiSession (chat + streaming).

use async_trait::async_trait;
use futures_util::StreamExt;
use ragline_common::{CallbackEvent, Event, EventKind};
use tracing::{debug, warn};

use crate::tokens::estimate_chat_tokens;
use crate::{ChatResponse, Llm, LlmError, LlmMetadata, Message, TextStream};

use super::session::GeminiSession;

#[async_trait]
impl Llm for GeminiSession {
    fn has_streaming(&self) -> bool {
        self.config.streaming
    }

    fn metadata(&self) -> LlmMetadata {
        LlmMetadata {
            model: self.config.model.id().to_string(),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            max_tokens: self.config.max_tokens,
            context_window: self.config.model.context_window(),
        }
    }

    fn tokens(&self, messages: &[Message]) -> Result<usize, LlmError> {
        estimate_chat_tokens(messages)
    }

    async fn chat(
        &self,
        messages: &[Message],
        _parent: Option<&Event>,
    ) -> Result<ChatResponse, LlmError> {
        let request = self.build_request(messages);
        debug!(model = %self.config.model, messages = messages.len(), "chat");

        let response = self.transport.generate(self.config.model, &request).await?;
        let usage = response.usage();
        let message = response.into_message()?;

        Ok(ChatResponse { message, usage })
    }

    async fn stream_chat(
        &self,
        messages: &[Message],
        parent: Option<&Event>,
    ) -> Result<TextStream, LlmError> {
        if !self.has_streaming() {
            return Err(LlmError::Unsupported(format!(
                "streaming is disabled for this {} session",
                self.config.model
            )));
        }

        let request = self.build_request(messages);
        debug!(model = %self.config.model, messages = messages.len(), "stream_chat");

        let mut chunks = self
            .transport
            .stream_generate(self.config.model, &request)
            .await?;

        let callbacks = self.callbacks.clone();
        let event = match parent {
            Some(parent) => parent.child(EventKind::Llm),
            None => Event::new(EventKind::Llm),
        };

        let stream = async_stream::stream! {
            let mut index = 0usize;

            while let Some(chunk) = chunks.next().await {
                let delta = match chunk.and_then(|c| c.text_delta()) {
                    Ok(delta) => delta,
                    Err(e) => {
                        warn!("stream aborted after {index} fragments: {e}");
                        yield Err(e);
                        return;
                    }
                };
                let text = match delta {
                    Some(text) if !text.is_empty() => text,
                    _ => continue,
                };

                if let Some(bus) = &callbacks {
                    bus.publish(CallbackEvent::LlmStream {
                        event: event.clone(),
                        index,
                        token: Some(text.clone()),
                        is_done: false,
                    });
                }
                index += 1;
                yield Ok(text);
            }

            if let Some(bus) = &callbacks {
                bus.publish(CallbackEvent::LlmStream {
                    event,
                    index,
                    token: None,
                    is_done: true,
                });
            }
        };

        Ok(Box::pin(stream))
    }
}
