//! Server-Sent Events (SSE) streaming parser.
//!
//! Gemini's `streamGenerateContent?alt=sse` endpoint delivers one JSON
//! chunk per event. The parser is pull-based: nothing is read from the
//! connection until the consumer asks for the next event, and at most one
//! partial event is buffered.

use tokio_util::bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tokio::io::AsyncBufReadExt;
use tokio_util::io::StreamReader;

use crate::LlmError;

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The event type, when the server sent an `event:` field.
    pub event: Option<String>,
    /// The event data (JSON string for the vendor APIs).
    pub data: String,
}

/// Parse SSE events out of a reqwest response body.
pub fn parse_sse_stream(
    response: reqwest::Response,
) -> impl Stream<Item = Result<SseEvent, LlmError>> + Send + 'static {
    sse_events(response.bytes_stream())
}

/// Parse SSE events out of any byte stream.
///
/// Ends after the last event; a transport error is yielded once and ends
/// the stream.
pub fn sse_events<S, E>(bytes: S) -> impl Stream<Item = Result<SseEvent, LlmError>> + Send + 'static
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    let byte_stream = Box::pin(bytes.map(|result| result.map_err(std::io::Error::other)));
    let reader = tokio::io::BufReader::new(StreamReader::new(byte_stream));

    async_stream::stream! {
        let mut lines = reader.lines();
        let mut current_event: Option<String> = None;
        let mut current_data = String::new();

        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) => {
                    yield Err(LlmError::NetworkError(e.to_string()));
                    return;
                }
            };

            if line.is_empty() {
                // Empty line = end of event
                if !current_data.is_empty() {
                    yield Ok(SseEvent {
                        event: current_event.take(),
                        data: std::mem::take(&mut current_data),
                    });
                }
                current_event = None;
                continue;
            }

            if let Some(event_type) = field_value(&line, "event") {
                current_event = Some(event_type.to_string());
            } else if let Some(data) = field_value(&line, "data") {
                if !current_data.is_empty() {
                    current_data.push('\n');
                }
                current_data.push_str(data);
            }
            // Ignore other fields (id:, retry:, comments)
        }

        // Flush an event left open by a missing trailing blank line
        if !current_data.is_empty() {
            yield Ok(SseEvent {
                event: current_event,
                data: current_data,
            });
        }
    }
}

/// `field: value` or `field:value`, per the SSE grammar.
fn field_value<'a>(line: &'a str, field: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(field)?.strip_prefix(':')?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn byte_chunks(chunks: &[&'static str]) -> impl Stream<Item = Result<Bytes, std::io::Error>> {
        stream::iter(
            chunks
                .iter()
                .copied()
                .map(|c| Ok(Bytes::from_static(c.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    async fn collect(chunks: &[&'static str]) -> Vec<Result<SseEvent, LlmError>> {
        sse_events(byte_chunks(chunks)).collect().await
    }

    #[tokio::test]
    async fn parses_events_in_order() {
        let events = collect(&["data: {\"a\":1}\n\n", "data: {\"a\":2}\n\n"]).await;
        let data: Vec<_> = events.into_iter().map(|e| e.unwrap().data).collect();
        assert_eq!(data, vec!["{\"a\":1}", "{\"a\":2}"]);
    }

    #[tokio::test]
    async fn event_split_across_chunks() {
        let events = collect(&["da", "ta: {\"text\":", "\"Mon\"}\r\n", "\r\n"]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().data, "{\"text\":\"Mon\"}");
    }

    #[tokio::test]
    async fn event_type_and_multiline_data() {
        let events = collect(&["event: delta\ndata: one\ndata:two\n\n"]).await;
        let event = events[0].as_ref().unwrap();
        assert_eq!(event.event.as_deref(), Some("delta"));
        assert_eq!(event.data, "one\ntwo");
    }

    #[tokio::test]
    async fn comments_and_ids_ignored() {
        let events = collect(&[": keep-alive\nid: 7\nretry: 100\n\ndata: x\n\n"]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().data, "x");
    }

    #[tokio::test]
    async fn trailing_event_without_blank_line_is_flushed() {
        let events = collect(&["data: last"]).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].as_ref().unwrap().data, "last");
    }

    #[tokio::test]
    async fn transport_error_ends_stream() {
        let chunks = stream::iter(vec![
            Ok(Bytes::from_static(b"data: first\n\n")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset")),
            Ok(Bytes::from_static(b"data: never\n\n")),
        ]);
        let events: Vec<_> = sse_events(chunks).collect().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].as_ref().unwrap().data, "first");
        assert!(matches!(events[1], Err(LlmError::NetworkError(_))));
    }

    #[test]
    fn field_value_requires_exact_field() {
        assert_eq!(field_value("data: x", "data"), Some("x"));
        assert_eq!(field_value("data:x", "data"), Some("x"));
        assert_eq!(field_value("database: x", "data"), None);
    }
}
