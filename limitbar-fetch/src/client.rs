//! HTTP client wrapper.
//!
//! Wraps `reqwest` with request/response tracing, debug logging, and a
//! uniform status-to-error mapping: 401/403 become
//! [`FetchError::Unauthenticated`] (credential invalid), other non-success
//! statuses carry a truncated body preview, and a 200 that is not JSON is an
//! explicit error instead of a confusing parse failure.

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::debug_log::DebugLog;
use crate::error::FetchError;

/// Default request timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum length of error body previews.
const BODY_PREVIEW_LEN: usize = 200;

/// User agent string for limitbar.
const USER_AGENT: &str = concat!("limitbar/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// HTTP Client
// ============================================================================

/// Shared HTTP client for provider fetches and auth flows.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    timeout_secs: u64,
    debug: Arc<DebugLog>,
}

impl HttpClient {
    /// Creates a client with the default timeout and no debug log.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with a custom timeout.
    ///
    /// # Panics
    ///
    /// Panics if the underlying client cannot be built, which only happens
    /// when the system TLS configuration is fundamentally broken.
    pub fn with_timeout(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| panic!("Failed to create HTTP client: {e}"));

        Self {
            inner: client,
            timeout_secs: timeout.as_secs(),
            debug: Arc::new(DebugLog::disabled()),
        }
    }

    /// Attaches a debug log to this client.
    pub fn with_debug_log(mut self, debug: Arc<DebugLog>) -> Self {
        self.debug = debug;
        self
    }

    /// Performs a GET request and parses the JSON response.
    #[instrument(skip(self, headers), fields(url = %url))]
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        tag: &str,
        url: &str,
        headers: HeaderMap,
    ) -> Result<T, FetchError> {
        self.request_json(tag, Method::GET, url, headers, Body::None)
            .await
    }

    /// Performs a POST request with a JSON body and parses the JSON response.
    #[instrument(skip(self, headers, body), fields(url = %url))]
    pub async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        tag: &str,
        url: &str,
        headers: HeaderMap,
        body: &serde_json::Value,
    ) -> Result<T, FetchError> {
        self.request_json(tag, Method::POST, url, headers, Body::Json(body.clone()))
            .await
    }

    /// Performs a POST request with a form-encoded body and parses the JSON
    /// response.
    #[instrument(skip(self, headers, body), fields(url = %url))]
    pub async fn post_form<T: serde::de::DeserializeOwned>(
        &self,
        tag: &str,
        url: &str,
        headers: HeaderMap,
        body: String,
    ) -> Result<T, FetchError> {
        self.request_json(tag, Method::POST, url, headers, Body::Form(body))
            .await
    }

    async fn request_json<T: serde::de::DeserializeOwned>(
        &self,
        tag: &str,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Body,
    ) -> Result<T, FetchError> {
        let method_str = method.as_str().to_string();
        if self.debug.is_enabled() {
            self.debug
                .log(tag, "request", &method_str, url, None, Some(&headers))
                .await;
        }

        let mut request = self.inner.request(method, url).headers(headers);
        request = match body {
            Body::None => request,
            Body::Json(json) => request.json(&json),
            Body::Form(form) => request
                .header(
                    reqwest::header::CONTENT_TYPE,
                    "application/x-www-form-urlencoded",
                )
                .body(form),
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout_secs)
            } else {
                FetchError::Http(e)
            }
        })?;
        let status = response.status();
        self.debug
            .log(tag, "response", &method_str, url, Some(status.as_u16()), None)
            .await;
        debug!(status = %status, "Response received");

        let text = response.text().await?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(FetchError::Unauthenticated);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                body: preview(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            FetchError::InvalidResponse(format!("Expected JSON, got: {} ({e})", preview(&text)))
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

enum Body {
    None,
    Json(serde_json::Value),
    Form(String),
}

/// Truncates a response body for inclusion in error messages.
fn preview(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= BODY_PREVIEW_LEN {
        trimmed.to_string()
    } else {
        let mut end = BODY_PREVIEW_LEN;
        while !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &trimmed[..end])
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_long_bodies() {
        let long = "x".repeat(400);
        let short = preview(&long);
        assert!(short.len() < 210);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_preview_keeps_short_bodies() {
        assert_eq!(preview("  hello  "), "hello");
    }

    #[test]
    fn test_preview_respects_char_boundaries() {
        let s = "é".repeat(300);
        let p = preview(&s);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn test_client_creation() {
        let _ = HttpClient::new();
        let _ = HttpClient::with_timeout(Duration::from_secs(5));
    }
}
