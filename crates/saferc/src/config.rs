//! The target store
//!
//! Files:
//! - ~/.saferc  - every target, plus which one is current
//! - ~/.svtoken - just the current target, for tools that only need that
//!
//! `.svtoken` is derived state. It is rewritten (or removed) every time the
//! config is persisted and never edited on its own.

use crate::error::{Error, Result};
use crate::legacy::LegacyConfig;
use saferc_core::Paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Version written by this tool. Zero (or absent) marks an old-style file.
pub const CONFIG_VERSION: u32 = 1;

/// A remote vault and the credentials used to reach it
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub token: String,

    #[serde(default)]
    pub skip_verify: bool,
}

/// The ~/.saferc document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub version: u32,

    /// Alias of the current target, empty when none is selected
    #[serde(default)]
    pub current: String,

    #[serde(default)]
    pub vaults: BTreeMap<String, Vault>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            current: String::new(),
            vaults: BTreeMap::new(),
        }
    }
}

/// The ~/.svtoken document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    /// Server URL (named `vault`, not `url`, in this file)
    pub vault: String,
    pub token: String,
    pub skip_verify: bool,
}

impl From<&Vault> for SessionFile {
    fn from(v: &Vault) -> Self {
        Self {
            vault: v.url.clone(),
            token: v.token.clone(),
            skip_verify: v.skip_verify,
        }
    }
}

impl Config {
    /// Load from ~/.saferc
    pub fn load(paths: &Paths) -> Result<Self> {
        Self::load_from(&paths.config)
    }

    /// Load from a specific path
    ///
    /// A missing or unparsable file yields the default document. The only
    /// error is an old-style file that cannot be decoded, which is fatal.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!("no config at {}: {}", path.display(), e);
                return Ok(Self::default());
            }
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self = match serde_yaml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring unparsable config {}: {}", path.display(), e);
                return Ok(Self::default());
            }
        };

        if config.version != 0 {
            return Ok(config);
        }

        info!("migrating old-style config at {}", path.display());
        let legacy = LegacyConfig::parse(&content).map_err(|source| Error::LegacyFormat {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(legacy.convert())
    }

    /// Alias of the current target, if one is selected
    pub fn current(&self) -> Option<&str> {
        Some(self.current.as_str()).filter(|c| !c.is_empty())
    }

    /// All targets in alias order
    pub fn targets(&self) -> impl Iterator<Item = (&str, &Vault)> {
        self.vaults.iter().map(|(alias, v)| (alias.as_str(), v))
    }

    /// Projection of the current target for ~/.svtoken
    pub fn session(&self) -> Result<Option<SessionFile>> {
        Ok(self.vault("")?.map(SessionFile::from))
    }

    /// Write ~/.saferc, then bring ~/.svtoken in line with it
    pub fn persist(&self, paths: &Paths) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        write_private(&paths.config, &content)?;
        debug!("wrote config to {}", paths.config.display());

        match self.session()? {
            None => {
                if let Err(e) = fs::remove_file(&paths.session) {
                    if e.kind() != std::io::ErrorKind::NotFound {
                        warn!("could not remove {}: {}", paths.session.display(), e);
                    }
                }
                Ok(())
            }
            Some(session) => {
                let content = serde_yaml::to_string(&session)?;
                write_private(&paths.session, &content)?;
                debug!("wrote session to {}", paths.session.display());
                Ok(())
            }
        }
    }
}

/// Replace `path` with `content`, readable by the owner only
fn write_private(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|e| Error::io(path, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| Error::io(path, e))?;

    #[cfg(unix)]
    {
        use std::fs::Permissions;
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(file.path(), Permissions::from_mode(0o600))
            .map_err(|e| Error::io(path, e))?;
    }

    file.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}
