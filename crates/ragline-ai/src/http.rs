//! Shared reqwest plumbing for the vendor clients.

use std::time::Duration;

use crate::LlmError;

/// Longest vendor error body echoed back in an `ApiError`.
const MAX_ERROR_CHARS: usize = 200;

/// Build the HTTP client used by one vendor handle.
///
/// Only connection setup is bounded; replies (and streams) may take as
/// long as the vendor needs.
pub(crate) fn build_client() -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| LlmError::NetworkError(format!("failed to build HTTP client: {e}")))
}

/// Turn a non-2xx response into the matching `LlmError`.
pub(crate) async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, LlmError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(LlmError::RateLimited);
    }
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(LlmError::ApiError {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Pull the human-readable message out of a vendor error body.
///
/// Google wraps it as `{"error": {"message": ...}}`, Mistral as
/// `{"message": ...}`; anything else is echoed (truncated).
pub(crate) fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = parsed.as_ref().and_then(|json| {
        json["error"]["message"]
            .as_str()
            .or_else(|| json["message"].as_str())
            .map(str::to_string)
    });
    message.unwrap_or_else(|| body.chars().take(MAX_ERROR_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_error_body() {
        let body = r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(error_message(body), "API key not valid.");
    }

    #[test]
    fn mistral_error_body() {
        let body = r#"{"object":"error","message":"Unauthorized","type":"invalid_request_error"}"#;
        assert_eq!(error_message(body), "Unauthorized");
    }

    #[test]
    fn plain_text_body_is_truncated() {
        let body = "x".repeat(500);
        assert_eq!(error_message(&body).len(), MAX_ERROR_CHARS);
    }

    #[test]
    fn client_builds() {
        assert!(build_client().is_ok());
    }
}
