// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # limitbar Core
//!
//! Core types and models shared across the limitbar crates:
//!
//! - Provider identity and static metadata
//! - Usage payloads (quota windows, spend/budget)
//! - The per-cycle result envelope
//!
//! ## Key Types
//!
//! - [`ProviderKind`] - Enum of supported providers, with stable string ids
//! - [`ProviderMetadata`] - Static capabilities and display info
//! - [`ProviderResult`] - One result per enabled provider per fetch cycle
//! - [`UsagePayload`] - Subscription quota windows or API spend
//! - [`FetchStatus`] - `ok` / `error` / `unauthenticated`

pub mod models;

pub use models::{
    FetchStatus,
    Identity,
    ProviderCategory,
    ProviderKind,
    ProviderMetadata,
    ProviderResult,
    SpendUsage,
    UsagePayload,
    UsageWindow,
};
