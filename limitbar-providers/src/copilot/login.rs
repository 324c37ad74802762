//! Copilot interactive login - GitHub device flow.

use limitbar_fetch::HttpClient;
use limitbar_store::Credential;
use tracing::{info, instrument};

use crate::oauth::{AuthError, DeviceFlow, browser};

// ============================================================================
// Constants
// ============================================================================

/// VS Code's Copilot extension client id (public, embedded in the extension).
pub const CLIENT_ID: &str = "Iv1.b507a08c87ecfe98";

/// Scope needed by the Copilot usage API.
pub const SCOPES: &str = "read:user";

/// GitHub device-code endpoint.
pub const DEVICE_CODE_URL: &str = "https://github.com/login/device/code";

/// GitHub token endpoint polled during the flow.
pub const ACCESS_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";

// ============================================================================
// Login
// ============================================================================

/// Runs the GitHub device flow and returns the new credential.
///
/// Displays the user code and verification URL, opens the browser, then
/// polls until the user authorizes or the device code expires.
#[instrument(skip(http))]
pub async fn login(http: &HttpClient) -> Result<Credential, AuthError> {
    let flow = DeviceFlow::new(
        "copilot-oauth",
        CLIENT_ID,
        SCOPES,
        DEVICE_CODE_URL,
        ACCESS_TOKEN_URL,
    );

    let token = flow
        .run(http, |start| {
            println!();
            println!("GitHub Copilot Login — Device Flow");
            println!("───────────────────────────────────");
            println!("  Your code: {}", start.user_code);
            println!("  Visit:     {}", start.verification_uri);
            println!();
            println!("Waiting for authorization (press Ctrl-C to cancel)…");
            browser::open_in_browser(&start.verification_uri);
        })
        .await?;

    info!("Copilot device-flow login complete");

    // GitHub device-flow tokens carry no refresh token and no expiry; the
    // token is valid until revoked in GitHub settings.
    Ok(Credential::new(token))
}
