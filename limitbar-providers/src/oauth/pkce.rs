//! PKCE verifier/challenge generation for the OAuth code flow.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// A PKCE verifier with its S256 challenge.
#[derive(Debug, Clone)]
pub struct PkcePair {
    /// The code verifier sent with the token exchange.
    pub verifier: String,
    /// The code challenge sent with the authorization request.
    pub challenge: String,
}

/// Generates a fresh PKCE pair (S256 method).
pub fn generate_pkce_pair() -> PkcePair {
    let mut random = [0u8; 64];
    rand::thread_rng().fill_bytes(&mut random);

    let verifier = URL_SAFE_NO_PAD.encode(random);
    let challenge = code_challenge_s256(&verifier);

    PkcePair {
        verifier,
        challenge,
    }
}

/// Computes the S256 challenge for a verifier.
pub fn code_challenge_s256(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Generates a random state value for one login attempt.
///
/// Distinct from the verifier so a callback observer learns nothing about
/// the PKCE secret.
pub fn generate_state() -> String {
    let mut random = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut random);
    URL_SAFE_NO_PAD.encode(random)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifier_length_within_rfc_bounds() {
        let pair = generate_pkce_pair();
        assert!(pair.verifier.len() >= 43);
        assert!(pair.verifier.len() <= 128);
    }

    #[test]
    fn test_challenge_matches_verifier() {
        let pair = generate_pkce_pair();
        assert_eq!(pair.challenge, code_challenge_s256(&pair.verifier));
    }

    #[test]
    fn test_known_challenge_value() {
        // RFC 7636 appendix B test vector.
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            code_challenge_s256(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_state_is_unique_per_attempt() {
        assert_ne!(generate_state(), generate_state());
    }
}
