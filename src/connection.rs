// Webhook transport layer. Every workflow call goes through this module, which
// owns the error normalization rules shared by the three automation workflows.
use lazy_static::lazy_static;
use log::{debug, error};
use reqwest::blocking::multipart::Form;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std_semaphore::Semaphore;

use crate::json_util::{format_json, parse_json_safely};

/// The maximum number of simultaneous webhook requests allowed.
///
/// The automation host throttles aggressively; this limit keeps a consumer that
/// shares the library across threads from overloading it. It's used in
/// conjunction with a semaphore acquired for the duration of each request.
const SIMULTANEOUS_REQUESTS_LIMIT: isize = 20;

// Global semaphore for managing simultaneous webhook requests.
lazy_static! {
    static ref SEMAPHORE: Semaphore = Semaphore::new(SIMULTANEOUS_REQUESTS_LIMIT);
}

/// Error produced by a workflow action.
///
/// One structure covers the whole taxonomy: validation errors detected locally
/// before any network call, transport errors where the webhook answered with a
/// non-success status, parse errors on local rubric import, and network
/// failures where the request itself did not complete.
///
/// Fields:
/// - `message`: Short human-readable summary (HTTP status or the local check that failed).
/// - `details`: Raw or pretty-printed response body, present only when the webhook answered with a non-success status.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WebhookError {
    pub message: String,
    pub details: Option<String>,
}

impl WebhookError {
    /// Builds a validation error: a required local input is missing or invalid.
    /// No network call was made.
    pub fn validation(message: impl Into<String>) -> Self {
        WebhookError {
            message: message.into(),
            details: None,
        }
    }

    /// Builds a network failure: the request itself did not complete (DNS,
    /// connection refused). The message text depends on the transport.
    pub fn network(message: impl Into<String>) -> Self {
        WebhookError {
            message: message.into(),
            details: None,
        }
    }

    /// Builds a transport error from a non-success HTTP status and the decoded
    /// response body. The body is pretty-printed when it parses as JSON and
    /// kept raw otherwise.
    fn transport(status: StatusCode, body: &str) -> Self {
        let details = match parse_json_safely(body) {
            Some(value) => format_json(&value),
            None => body.to_string(),
        };
        WebhookError {
            message: format!(
                "Error {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            ),
            details: Some(details),
        }
    }
}

impl fmt::Display for WebhookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for WebhookError {}

/// Successful webhook response: either a parsed JSON document or the raw body
/// text when the body is not valid JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookReply {
    Json(Value),
    Text(String),
}

/// Sends a single multipart POST to a workflow webhook and interprets the response.
///
/// The full response body is read as text regardless of status. On a
/// non-success status the call fails with a `WebhookError` carrying
/// `Error <status>: <status text>` and the decoded body as details. On success
/// the body is returned parsed as JSON when possible, raw otherwise.
///
/// One request, one response: no retries, no timeout beyond the transport
/// default, no streaming.
///
/// Arguments:
/// - `client`: HTTP client for executing requests.
/// - `url`: Webhook endpoint URL.
/// - `form`: Multipart body to send.
///
/// Returns:
/// - `Result<WebhookReply, WebhookError>`: The interpreted response or a normalized error.
pub fn send_webhook_request(
    client: &Client,
    url: &str,
    form: Form,
) -> Result<WebhookReply, WebhookError> {
    let _guard = SEMAPHORE.access();

    debug!("POST {}", url);
    let response = client.post(url).multipart(form).send().map_err(|e| {
        error!("Webhook request to {} failed: {}", url, e);
        WebhookError::network(e.to_string())
    })?;

    let status = response.status();
    // Lê o corpo como texto independente do status
    let body = response.text().map_err(|e| {
        error!("Failed to read webhook response body: {}", e);
        WebhookError::network(format!("Failed to read response body: {}", e))
    })?;

    if !status.is_success() {
        error!("Webhook {} answered with status {}", url, status);
        return Err(WebhookError::transport(status, &body));
    }

    match parse_json_safely(&body) {
        Some(value) => Ok(WebhookReply::Json(value)),
        None => Ok(WebhookReply::Text(body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_pretty_prints_json_body() {
        let err = WebhookError::transport(StatusCode::INTERNAL_SERVER_ERROR, "{\"error\":\"boom\"}");
        assert_eq!(err.message, "Error 500: Internal Server Error");
        assert_eq!(err.details.as_deref(), Some("{\n  \"error\": \"boom\"\n}"));
    }

    #[test]
    fn test_transport_error_keeps_raw_text_body() {
        let err = WebhookError::transport(StatusCode::BAD_GATEWAY, "<html>gateway down</html>");
        assert_eq!(err.message, "Error 502: Bad Gateway");
        assert_eq!(err.details.as_deref(), Some("<html>gateway down</html>"));
    }

    #[test]
    fn test_validation_error_has_no_details() {
        let err = WebhookError::validation("No file selected");
        assert_eq!(err.message, "No file selected");
        assert!(err.details.is_none());
        assert_eq!(err.to_string(), "No file selected");
    }
}
