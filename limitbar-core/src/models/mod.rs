//! Domain models for limitbar.

pub mod provider;
pub mod result;
pub mod usage;

pub use provider::{Identity, ProviderCategory, ProviderKind, ProviderMetadata};
pub use result::{FetchStatus, ProviderResult};
pub use usage::{SpendUsage, UsagePayload, UsageWindow};
