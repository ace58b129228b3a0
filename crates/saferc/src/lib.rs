//! saferc - Local target store for vault clients
//!
//! Keeps a set of named targets (server URL, auth token, TLS policy) in
//! `~/.saferc`, tracks which one is current, mirrors the current one into
//! `~/.svtoken` for other tooling, and exports it into the environment of
//! commands that talk to the server.
//!
//! Older single-target config files are migrated on load.

pub mod config;
pub mod error;
pub mod legacy;
pub mod session;
pub mod target;

pub use config::{Config, SessionFile, Vault};
pub use error::{Error, Result};
pub use legacy::LegacyConfig;
pub use session::Applied;
