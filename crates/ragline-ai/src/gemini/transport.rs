//! Vendor client seam: how a session reaches the Gemini API.

use std::fmt;
use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use ragline_common::new_correlation_id;
use tracing::debug;

use crate::http::{build_client, ensure_success};
use crate::streaming::{parse_sse_stream, SseEvent};
use crate::LlmError;

use super::models::GeminiModel;
use super::types::{GenerateContentRequest, GenerateContentResponse};

/// Streamed response chunks, in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<GenerateContentResponse, LlmError>> + Send>>;

/// The vendor client a session forwards to.
#[async_trait]
pub trait GeminiTransport: Send + Sync {
    async fn generate(
        &self,
        model: GeminiModel,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError>;

    async fn stream_generate(
        &self,
        model: GeminiModel,
        request: &GenerateContentRequest,
    ) -> Result<ChunkStream, LlmError>;
}

/// Gemini REST client bound to one API key.
pub struct HttpTransport {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpTransport {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, LlmError> {
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: build_client()?,
        })
    }

    pub(crate) fn api_url(&self, model: GeminiModel, stream: bool) -> String {
        if stream {
            format!(
                "{}/models/{}:streamGenerateContent?alt=sse",
                self.base_url,
                model.id()
            )
        } else {
            format!("{}/models/{}:generateContent", self.base_url, model.id())
        }
    }

    async fn post(
        &self,
        url: &str,
        request: &GenerateContentRequest,
    ) -> Result<reqwest::Response, LlmError> {
        let response = self
            .http
            .post(url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        ensure_success(response).await
    }
}

#[async_trait]
impl GeminiTransport for HttpTransport {
    async fn generate(
        &self,
        model: GeminiModel,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, LlmError> {
        let request_id = new_correlation_id();
        debug!(%model, %request_id, "Gemini API request");

        let response = self.post(&self.api_url(model, false), request).await?;
        let parsed = response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        debug!(%request_id, candidates = parsed.candidates.len(), "Gemini API response");
        Ok(parsed)
    }

    async fn stream_generate(
        &self,
        model: GeminiModel,
        request: &GenerateContentRequest,
    ) -> Result<ChunkStream, LlmError> {
        let request_id = new_correlation_id();
        debug!(%model, %request_id, "Gemini API streaming request");

        let response = self.post(&self.api_url(model, true), request).await?;
        Ok(typed_chunks(parse_sse_stream(response)))
    }
}

/// Decode each SSE event's data as one response chunk.
pub(crate) fn typed_chunks<S>(events: S) -> ChunkStream
where
    S: Stream<Item = Result<SseEvent, LlmError>> + Send + 'static,
{
    Box::pin(events.map(|event| {
        let event = event?;
        serde_json::from_str::<GenerateContentResponse>(&event.data)
            .map_err(|e| LlmError::MalformedResponse(format!("bad stream chunk: {e}")))
    }))
}

#[cfg(test)]
mod tests {
    use futures_util::stream;
    use tokio_util::bytes::Bytes;

    use super::*;
    use crate::streaming::sse_events;

    #[test]
    fn api_urls() {
        let transport = HttpTransport::new("k", "https://example.test/v1beta/").unwrap();
        assert_eq!(
            transport.api_url(GeminiModel::GeminiPro, false),
            "https://example.test/v1beta/models/gemini-pro:generateContent"
        );
        assert_eq!(
            transport.api_url(GeminiModel::Aqa, true),
            "https://example.test/v1beta/models/aqa:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let transport = HttpTransport::new("secret-key", "https://example.test").unwrap();
        assert!(!format!("{transport:?}").contains("secret-key"));
    }

    #[tokio::test]
    async fn sse_body_becomes_typed_chunks() {
        let body = stream::iter(vec![
            Ok::<_, std::io::Error>(Bytes::from_static(
                b"data: {\"candidates\": [{\"content\": {\"parts\": [{\"text\": \"Mon\"}]}}]}\n\n",
            )),
            Ok(Bytes::from_static(b"data: not json\n\n")),
        ]);
        let chunks: Vec<_> = typed_chunks(sse_events(body)).collect().await;

        assert_eq!(chunks.len(), 2);
        let first = chunks[0].as_ref().unwrap();
        assert_eq!(first.text_delta().unwrap().as_deref(), Some("Mon"));
        assert!(
            matches!(chunks[1], Err(LlmError::MalformedResponse(ref m)) if m.contains("bad stream chunk"))
        );
    }

    #[tokio::test]
    async fn transport_errors_pass_through() {
        let events = stream::iter(vec![Err::<SseEvent, _>(LlmError::NetworkError("reset".into()))]);
        let chunks: Vec<_> = typed_chunks(events).collect().await;
        assert!(matches!(chunks[..], [Err(LlmError::NetworkError(_))]));
    }
}
