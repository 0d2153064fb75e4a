use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to open simfile {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to allocate working file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("Failed to write working file for {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to overwrite simfile {}: {source}", .path.display())]
    Overwrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Failed to rename working file {} to {}: {source}",
        .working.display(),
        .path.display()
    )]
    Rename {
        path: PathBuf,
        /// Where the rewritten content was left, if it survived the failure
        working: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Coarse failure category, one per user-facing message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileOpen,
    TempFile,
    Overwrite,
    Rename,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::FileOpen { .. } => ErrorKind::FileOpen,
            Error::TempFile(_) | Error::Write { .. } => ErrorKind::TempFile,
            Error::Overwrite { .. } => ErrorKind::Overwrite,
            Error::Rename { .. } => ErrorKind::Rename,
        }
    }

    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::FileOpen { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }

    /// Check if the target was left without its content in place.
    ///
    /// Only a failed rename after the original was deleted gets here; the
    /// rewritten content is still in the working file.
    pub fn needs_manual_fix(&self) -> bool {
        matches!(self, Error::Rename { path, working, .. } if !path.exists() && working.exists())
    }
}
