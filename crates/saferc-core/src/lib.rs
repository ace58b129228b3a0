//! saferc core - shared plumbing for the saferc target store
//!
//! Resolves the home directory the way the vault tooling expects, names the
//! well-known files kept there, and abstracts the process environment behind
//! a small key-value trait so it can be swapped out in tests.

pub mod env;
pub mod paths;

pub use env::{Environment, MemoryEnv, ProcessEnv};
pub use paths::{home_dir, Paths};
