//! ChatGPT account-id extraction from the access-token JWT.
//!
//! The token's payload carries the account id under the
//! `https://api.openai.com/auth` claim. The signature is not verified - the
//! token came straight from the token endpoint and is only being read, not
//! trusted as an assertion.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::Value;

/// JWT claim holding OpenAI auth metadata.
const AUTH_CLAIM: &str = "https://api.openai.com/auth";

/// Extracts the ChatGPT account id from an access-token JWT.
///
/// Returns `None` for anything that is not a well-formed JWT carrying the
/// expected claim.
pub fn extract_account_id(access_token: &str) -> Option<String> {
    let payload_segment = access_token.split('.').nth(1)?;
    let payload_bytes = URL_SAFE_NO_PAD.decode(payload_segment).ok()?;
    let payload: Value = serde_json::from_slice(&payload_bytes).ok()?;

    payload
        .get(AUTH_CLAIM)?
        .get("chatgpt_account_id")?
        .as_str()
        .map(String::from)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_jwt(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{header}.{body}.fakesig")
    }

    #[test]
    fn test_extract_account_id() {
        let jwt = fake_jwt(&serde_json::json!({
            "https://api.openai.com/auth": {"chatgpt_account_id": "test-account-456"}
        }));
        assert_eq!(extract_account_id(&jwt).as_deref(), Some("test-account-456"));
    }

    #[test]
    fn test_extract_returns_none_for_bad_jwt() {
        assert_eq!(extract_account_id("not.a.valid-jwt"), None);
        assert_eq!(extract_account_id("nodots"), None);
        assert_eq!(extract_account_id(""), None);
    }

    #[test]
    fn test_extract_returns_none_without_claim() {
        let jwt = fake_jwt(&serde_json::json!({"sub": "user-1"}));
        assert_eq!(extract_account_id(&jwt), None);
    }
}
