//! Shared OAuth plumbing for provider login flows.
//!
//! - [`pkce`]: verifier/challenge generation (S256)
//! - [`callback`]: one-shot localhost listener for the code flow
//! - [`device`]: RFC 8628 device-flow poller
//! - [`browser`]: best-effort browser launching
//! - [`error`]: the auth-flow error taxonomy

pub mod browser;
pub mod callback;
pub mod device;
pub mod error;
pub mod pkce;

pub use callback::{LOGIN_TIMEOUT_SECS, wait_for_authorization_code};
pub use device::{DeviceFlow, DeviceFlowStart, DevicePoll};
pub use error::AuthError;
pub use pkce::{PkcePair, generate_pkce_pair, generate_state};
