//! HTTP utilities for admin API calls

use super::{ApiError, ApiResult};
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        format!(
            "{}... [truncated, {} bytes total]",
            &body[..MAX_LOG_BODY_LENGTH],
            body.len()
        )
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Pull a usable message out of an error body, falling back to the
/// status line when the body is not structured.
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

/// HTTP client wrapper for admin API calls
#[derive(Clone)]
pub struct AdminHttpClient {
    client: Client,
}

impl AdminHttpClient {
    /// Create a new HTTP client
    pub fn new() -> ApiResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("netgw/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request to the admin API
    pub async fn get(&self, url: &str, token: &str) -> ApiResult<Value> {
        self.request(Method::GET, url, token, None).await
    }

    /// Make a POST request to the admin API
    pub async fn post(&self, url: &str, token: &str, body: Option<&Value>) -> ApiResult<Value> {
        self.request(Method::POST, url, token, body).await
    }

    /// Make a PUT request to the admin API
    pub async fn put(&self, url: &str, token: &str, body: Option<&Value>) -> ApiResult<Value> {
        self.request(Method::PUT, url, token, body).await
    }

    /// Make a DELETE request to the admin API
    pub async fn delete(&self, url: &str, token: &str) -> ApiResult<Value> {
        self.request(Method::DELETE, url, token, None).await
    }

    async fn request(
        &self,
        method: Method,
        url: &str,
        token: &str,
        body: Option<&Value>,
    ) -> ApiResult<Value> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url).bearer_auth(token);

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        // Handle empty response
        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Payload(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("[truncated, 500 bytes total]"));
        assert!(sanitized.len() < body.len());
    }

    #[test]
    fn sanitize_strips_control_characters() {
        let sanitized = sanitize_for_log("ok\x07\nline");
        assert_eq!(sanitized, "okline");
    }

    #[test]
    fn error_message_prefers_body_message() {
        let message = error_message(
            StatusCode::CONFLICT,
            r#"{"message": "gateway still in use"}"#,
        );
        assert_eq!(message, "gateway still in use");
    }

    #[test]
    fn error_message_falls_back_to_status_reason() {
        let message = error_message(StatusCode::NOT_FOUND, "not json");
        assert_eq!(message, "Not Found");
    }
}
