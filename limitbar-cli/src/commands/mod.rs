//! CLI command implementations.

pub mod init_config;
pub mod login;
pub mod logout;
pub mod snapshot;
pub mod watch;
