//! Exporting a target into the environment
//!
//! Vault clients read their server and credentials from `VAULT_ADDR`,
//! `VAULT_TOKEN` and `VAULT_SKIP_VERIFY`. Applying a target sets those for
//! this process (and so for anything it spawns).
//!
//! With no target selected, a token already in the environment is left
//! alone; otherwise `~/.vault-token`, as written by other vault tooling, is
//! used if present.

use crate::config::Config;
use crate::error::Result;
use saferc_core::{Environment, Paths};
use std::fs;
use tracing::debug;

pub const VAULT_ADDR: &str = "VAULT_ADDR";
pub const VAULT_TOKEN: &str = "VAULT_TOKEN";
pub const VAULT_SKIP_VERIFY: &str = "VAULT_SKIP_VERIFY";

/// What [`Config::apply`] exported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    /// Address and token of a resolved target
    Target { url: String, skip_verify: bool },
    /// Token read from the fallback token file
    FallbackToken,
    /// Nothing to export
    Nothing,
}

impl Config {
    /// Export the target named by `which` (empty for current) into `env`
    ///
    /// Resolution errors come back fatal: this runs before the command
    /// does anything, and an ambiguous or missing target cannot be guessed.
    pub fn apply(&self, which: &str, paths: &Paths, env: &mut impl Environment) -> Result<Applied> {
        let vault = self.vault(which).map_err(|e| e.fatal())?;

        if let Some(v) = vault {
            env.set(VAULT_ADDR, &v.url);
            env.set(VAULT_TOKEN, &v.token);
            if v.skip_verify {
                env.set(VAULT_SKIP_VERIFY, "1");
            }
            return Ok(Applied::Target {
                url: v.url.clone(),
                skip_verify: v.skip_verify,
            });
        }

        if env.get_non_empty(VAULT_TOKEN).is_some() {
            return Ok(Applied::Nothing);
        }

        match fs::read_to_string(&paths.fallback_token) {
            Ok(token) => {
                debug!("using token from {}", paths.fallback_token.display());
                env.set(VAULT_TOKEN, token.trim());
                Ok(Applied::FallbackToken)
            }
            Err(e) => {
                debug!("no fallback token at {}: {}", paths.fallback_token.display(), e);
                Ok(Applied::Nothing)
            }
        }
    }
}
