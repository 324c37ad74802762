//! One-shot localhost callback listener for the OAuth code flow.
//!
//! The login flow binds a short-lived listener on a provider-specific port,
//! sends the user to the provider's consent screen, and waits for the
//! redirect carrying the authorization code. The wait is bounded by the
//! login timeout, and a callback whose `state` does not match the value
//! generated for this attempt is rejected - a stray or injected redirect
//! must not complete someone else's login.

use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};
use url::Url;

use super::error::AuthError;

/// Default bound on the whole login wait.
pub const LOGIN_TIMEOUT_SECS: u64 = 120;

const SUCCESS_HTML: &str = "<html><body><h1>Login complete</h1>\
<p>You may close this window and return to the terminal.</p></body></html>";
const ERROR_HTML: &str = "<html><body><h1>Login failed</h1>\
<p>You may close this window and retry.</p></body></html>";

/// Query parameters delivered by the provider redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackPayload {
    /// Authorization code, on success.
    pub code: Option<String>,
    /// State echoed back by the provider.
    pub state: Option<String>,
    /// Error code, when the provider reports one.
    pub error: Option<String>,
}

/// Waits for the authorization code on `127.0.0.1:port`.
///
/// Connections for other paths (browser favicon probes and the like) get a
/// 404 and the wait continues. Returns the authorization code, or
/// `LoginTimeout` / `StateMismatch` / `LoginDenied` per the outcome. The
/// bound port is released when this returns.
pub async fn wait_for_authorization_code(
    port: u16,
    path: &str,
    expected_state: &str,
    timeout: Duration,
) -> Result<String, AuthError> {
    let listener = TcpListener::bind(("127.0.0.1", port)).await?;
    debug!(port, path, "Callback listener bound");

    let result = tokio::time::timeout(timeout, async {
        loop {
            let (socket, addr) = listener.accept().await?;
            debug!(peer = %addr, "Callback connection");

            match handle_connection(socket, path).await {
                Ok(Some(payload)) => return check_payload(payload, expected_state),
                Ok(None) => continue, // wrong path, keep waiting
                Err(e) => {
                    warn!(error = %e, "Malformed callback request, still waiting");
                    continue;
                }
            }
        }
    })
    .await;

    match result {
        Ok(inner) => inner,
        Err(_) => Err(AuthError::LoginTimeout(timeout.as_secs())),
    }
}

/// Reads one request; answers and returns its payload when the path matches.
async fn handle_connection(
    mut socket: TcpStream,
    expected_path: &str,
) -> Result<Option<CallbackPayload>, AuthError> {
    let mut buffer = vec![0u8; 8192];
    let size = socket.read(&mut buffer).await?;
    if size == 0 {
        return Err(AuthError::InvalidResponse("empty callback request".to_string()));
    }

    let request = String::from_utf8_lossy(&buffer[..size]);
    let target = extract_request_target(&request)?;

    let url = Url::parse(&format!("http://127.0.0.1{target}"))
        .map_err(|e| AuthError::InvalidResponse(format!("invalid callback target: {e}")))?;

    if url.path() != expected_path {
        respond(&mut socket, "HTTP/1.1 404 Not Found", "").await;
        return Ok(None);
    }

    let mut payload = CallbackPayload {
        code: None,
        state: None,
        error: None,
    };
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => payload.code = Some(value.to_string()),
            "state" => payload.state = Some(value.to_string()),
            "error" => payload.error = Some(value.to_string()),
            _ => {}
        }
    }

    let (status, body) = if payload.error.is_some() || payload.code.is_none() {
        ("HTTP/1.1 400 Bad Request", ERROR_HTML)
    } else {
        ("HTTP/1.1 200 OK", SUCCESS_HTML)
    };
    respond(&mut socket, status, body).await;

    Ok(Some(payload))
}

fn extract_request_target(request: &str) -> Result<&str, AuthError> {
    let first = request
        .lines()
        .next()
        .ok_or_else(|| AuthError::InvalidResponse("malformed callback request".to_string()))?;
    let mut parts = first.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let target = parts.next().unwrap_or_default();
    if method != "GET" || target.is_empty() {
        return Err(AuthError::InvalidResponse(
            "callback request must be GET".to_string(),
        ));
    }
    Ok(target)
}

/// Validates the payload against the state generated for this attempt.
fn check_payload(payload: CallbackPayload, expected_state: &str) -> Result<String, AuthError> {
    if let Some(error) = payload.error {
        return if error == "access_denied" {
            Err(AuthError::LoginDenied)
        } else {
            Err(AuthError::TokenExchange(error))
        };
    }

    match payload.state.as_deref() {
        Some(state) if state == expected_state => {}
        _ => return Err(AuthError::StateMismatch),
    }

    payload
        .code
        .ok_or_else(|| AuthError::InvalidResponse("callback missing code".to_string()))
}

async fn respond(socket: &mut TcpStream, status: &str, body: &str) {
    let response = format!(
        "{status}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len(),
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

// ============================================================================
// Tests
// ============================================================================
