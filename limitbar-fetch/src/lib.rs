// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # limitbar Fetch
//!
//! The fetch layer of limitbar:
//!
//! - [`HttpClient`]: reqwest wrapper with tracing, debug logging, and uniform
//!   status-to-error mapping
//! - [`DebugLog`]: env-gated JSON-lines HTTP log
//! - [`FetchProvider`] + [`FetchContext`]: the single contract the
//!   orchestrator depends on
//! - [`run_cycle`]: the concurrent fan-out fetch cycle
//!
//! ## Usage
//!
//! ```ignore
//! use limitbar_fetch::{FetchContext, run_cycle};
//!
//! let ctx = FetchContext::builder()
//!     .auth(auth_store)
//!     .settings(settings)
//!     .build();
//! let results = run_cycle(&providers, &ctx).await;
//! ```

pub mod client;
pub mod context;
pub mod debug_log;
pub mod error;
pub mod orchestrator;

pub use client::HttpClient;
pub use context::{DEFAULT_FETCH_TIMEOUT_SECS, FetchContext, FetchContextBuilder, FetchProvider};
pub use debug_log::DebugLog;
pub use error::FetchError;
pub use orchestrator::run_cycle;
