//! Standard paths used by saferc

use crate::env::Environment;
use std::path::{Path, PathBuf};

/// Primary config file name
pub const CONFIG_FILE: &str = ".saferc";
/// Session file name (projection of the current target)
pub const SESSION_FILE: &str = ".svtoken";
/// Plaintext token file left behind by other vault tooling
pub const FALLBACK_TOKEN_FILE: &str = ".vault-token";

/// Standard saferc paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    /// Home directory everything else lives under
    pub home: PathBuf,
    /// Primary config file (~/.saferc)
    pub config: PathBuf,
    /// Session file (~/.svtoken)
    pub session: PathBuf,
    /// Fallback token file (~/.vault-token)
    pub fallback_token: PathBuf,
}

impl Paths {
    /// Paths under the home directory resolved from `env`
    pub fn new(env: &impl Environment) -> Self {
        Self::under(home_dir(env))
    }

    /// Paths under an explicit directory
    pub fn under(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            config: home.join(CONFIG_FILE),
            session: home.join(SESSION_FILE),
            fallback_token: home.join(FALLBACK_TOKEN_FILE),
            home,
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}

/// Resolve the user's home directory
///
/// POSIX reads `HOME`. Windows reads `USERPROFILE`, then `HOMEDRIVE` +
/// `HOMEPATH`. If the variables come up empty, `dirs::home_dir()` is tried
/// before settling on an empty path.
pub fn home_dir(env: &impl Environment) -> PathBuf {
    let home = home_from_env(env, cfg!(windows));
    if !home.is_empty() {
        return PathBuf::from(home);
    }

    match dirs::home_dir() {
        Some(dir) => dir,
        None => {
            tracing::warn!("could not determine home directory, using working directory");
            PathBuf::new()
        }
    }
}

fn home_from_env(env: &impl Environment, windows: bool) -> String {
    if windows {
        if let Some(profile) = env.get_non_empty("USERPROFILE") {
            return profile;
        }
        let drive = env.get("HOMEDRIVE").unwrap_or_default();
        let path = env.get("HOMEPATH").unwrap_or_default();
        return format!("{}{}", drive, path);
    }
    env.get("HOME").unwrap_or_default()
}
