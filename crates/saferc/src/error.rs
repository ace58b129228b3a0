//! Errors for the target store

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Target store errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("More than one target for Vault at '{0}' (maybe try an alias?)")]
    Ambiguous(String),

    #[error("Unknown target '{0}'")]
    UnknownTarget(String),

    #[error("Current target vault '{0}' not found in ~/.saferc")]
    TargetNotFound(String),

    #[error("No target selected")]
    NoTargetSelected,

    #[error("Failed to parse old-style config {}: {source}", .path.display())]
    LegacyFormat {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to encode config: {0}")]
    Encode(#[from] serde_yaml::Error),

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Fatal(Box<Error>),
}

impl Error {
    /// Whether the caller should stop rather than carry on
    ///
    /// A corrupt old-style config file and anything the session applier
    /// could not resolve are terminal; everything else is an ordinary failure
    /// of the requested operation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::LegacyFormat { .. } | Self::Fatal(_))
    }

    pub(crate) fn fatal(self) -> Self {
        if self.is_fatal() {
            self
        } else {
            Self::Fatal(Box::new(self))
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
