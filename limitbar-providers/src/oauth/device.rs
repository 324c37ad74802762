//! OAuth 2.0 Device Authorization Grant (RFC 8628).
//!
//! Used by providers without a local browser redirect. The flow:
//!
//! 1. **Start**: request a device code and user code
//! 2. **Display**: show the user the verification URL and user code
//! 3. **Poll**: hit the token endpoint at the provider's interval until the
//!    user authorizes, the code expires, or the wait elapses
//! 4. **Complete**: return the access token

use limitbar_fetch::HttpClient;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Deserialize;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

use super::error::AuthError;

/// Fallback device-code lifetime when the provider omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: u64 = 900;

/// Floor for the poll interval; never poll faster than the provider allows.
const MIN_POLL_INTERVAL_SECS: u64 = 5;

/// Cap applied when the provider keeps answering `slow_down`.
const MAX_POLL_INTERVAL_SECS: u64 = 30;

// ============================================================================
// Types
// ============================================================================

/// Device flow start response.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceFlowStart {
    /// The device verification code.
    pub device_code: String,
    /// The user verification code to display.
    pub user_code: String,
    /// The verification URL.
    pub verification_uri: String,
    /// Seconds until the codes expire.
    #[serde(default)]
    pub expires_in: Option<u64>,
    /// Minimum polling interval in seconds.
    #[serde(default)]
    pub interval: Option<u64>,
}

/// One poll outcome.
#[derive(Debug, Clone)]
pub enum DevicePoll {
    /// User has not yet authorized - keep polling.
    Pending,
    /// Polling too fast - increase the interval.
    SlowDown,
    /// User authorized - here is the access token.
    AccessToken(String),
    /// The device code expired.
    Expired,
    /// The user denied access.
    Denied,
}

#[derive(Debug, Deserialize)]
struct PollResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

// ============================================================================
// Device Flow
// ============================================================================

/// Generic device-flow runner, parameterized by provider endpoints.
#[derive(Debug, Clone)]
pub struct DeviceFlow {
    client_id: &'static str,
    scopes: &'static str,
    device_code_url: &'static str,
    token_url: &'static str,
    tag: &'static str,
}

impl DeviceFlow {
    /// Creates a flow for the given provider endpoints.
    pub fn new(
        tag: &'static str,
        client_id: &'static str,
        scopes: &'static str,
        device_code_url: &'static str,
        token_url: &'static str,
    ) -> Self {
        Self {
            client_id,
            scopes,
            device_code_url,
            token_url,
            tag,
        }
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Requests a device code and user code.
    #[instrument(skip(self, http))]
    pub async fn start(&self, http: &HttpClient) -> Result<DeviceFlowStart, AuthError> {
        debug!("Requesting device code");

        let body = format!("client_id={}&scope={}", self.client_id, self.scopes);
        let start: DeviceFlowStart = http
            .post_form(self.tag, self.device_code_url, Self::headers(), body)
            .await
            .map_err(|e| AuthError::TokenExchange(format!("device code request failed: {e}")))?;

        debug!(
            user_code = %start.user_code,
            verification_uri = %start.verification_uri,
            "Device flow started"
        );
        Ok(start)
    }

    /// Polls the token endpoint once.
    #[instrument(skip(self, http, device_code))]
    pub async fn poll(&self, http: &HttpClient, device_code: &str) -> Result<DevicePoll, AuthError> {
        let body = format!(
            "client_id={}&device_code={device_code}&grant_type=urn:ietf:params:oauth:grant-type:device_code",
            self.client_id,
        );

        let response: PollResponse = http
            .post_form(self.tag, self.token_url, Self::headers(), body)
            .await
            .map_err(|e| AuthError::TokenExchange(format!("device poll failed: {e}")))?;

        if let Some(token) = response.access_token {
            return Ok(DevicePoll::AccessToken(token));
        }

        match response.error.as_deref() {
            Some("authorization_pending") => Ok(DevicePoll::Pending),
            Some("slow_down") => Ok(DevicePoll::SlowDown),
            Some("expired_token") => Ok(DevicePoll::Expired),
            Some("access_denied") => Ok(DevicePoll::Denied),
            Some(error) => {
                warn!(error, "Unexpected device-flow error");
                Err(AuthError::TokenExchange(
                    response.error_description.unwrap_or_else(|| error.to_string()),
                ))
            }
            None => Err(AuthError::InvalidResponse(
                "device poll response carried neither token nor error".to_string(),
            )),
        }
    }

    /// Runs the complete flow: start, hand codes to `on_start`, poll until a
    /// terminal outcome.
    ///
    /// The wait is bounded by the device code's `expires_in`; the poll
    /// interval respects the provider minimum and backs off on `slow_down`.
    #[instrument(skip(self, http, on_start))]
    pub async fn run<F>(&self, http: &HttpClient, on_start: F) -> Result<String, AuthError>
    where
        F: FnOnce(&DeviceFlowStart),
    {
        let start = self.start(http).await?;
        on_start(&start);

        let expires_in = start.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let deadline = Instant::now() + Duration::from_secs(expires_in);
        let mut interval = start.interval.unwrap_or(MIN_POLL_INTERVAL_SECS).max(MIN_POLL_INTERVAL_SECS);

        loop {
            if Instant::now() >= deadline {
                return Err(AuthError::LoginTimeout(expires_in));
            }

            tokio::time::sleep(Duration::from_secs(interval)).await;

            match self.poll(http, &start.device_code).await? {
                DevicePoll::Pending => {}
                DevicePoll::SlowDown => {
                    interval = next_interval(interval);
                    debug!(interval, "Provider asked to slow down");
                }
                DevicePoll::AccessToken(token) => return Ok(token),
                DevicePoll::Expired => return Err(AuthError::LoginTimeout(expires_in)),
                DevicePoll::Denied => return Err(AuthError::LoginDenied),
            }
        }
    }
}

/// Backs the interval off by 5 seconds, capped.
fn next_interval(current: u64) -> u64 {
    (current + 5).min(MAX_POLL_INTERVAL_SECS)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_device_code_response() {
        let json = r#"{
            "device_code": "3584d83530557fdd1f46af8289938c8ef79f9dc5",
            "user_code": "WDJB-MJHT",
            "verification_uri": "https://github.com/login/device",
            "expires_in": 900,
            "interval": 5
        }"#;

        let start: DeviceFlowStart = serde_json::from_str(json).unwrap();
        assert_eq!(start.user_code, "WDJB-MJHT");
        assert_eq!(start.verification_uri, "https://github.com/login/device");
        assert_eq!(start.expires_in, Some(900));
        assert_eq!(start.interval, Some(5));
    }

    #[test]
    fn test_parse_device_code_response_without_interval() {
        let json = r#"{
            "device_code": "d",
            "user_code": "U-C",
            "verification_uri": "https://example.test/device"
        }"#;

        let start: DeviceFlowStart = serde_json::from_str(json).unwrap();
        assert_eq!(start.interval, None);
        assert_eq!(start.expires_in, None);
    }

    #[test]
    fn test_poll_response_variants() {
        let pending: PollResponse =
            serde_json::from_str(r#"{"error": "authorization_pending"}"#).unwrap();
        assert_eq!(pending.error.as_deref(), Some("authorization_pending"));

        let token: PollResponse =
            serde_json::from_str(r#"{"access_token": "gho_abc", "token_type": "bearer", "scope": "read:user"}"#)
                .unwrap();
        assert_eq!(token.access_token.as_deref(), Some("gho_abc"));
    }

    #[test]
    fn test_slow_down_backoff_caps() {
        assert_eq!(next_interval(5), 10);
        assert_eq!(next_interval(10), 15);
        assert_eq!(next_interval(28), 30);
        assert_eq!(next_interval(30), 30);
    }
}
