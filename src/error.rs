//! Error types and process exit codes.

use crate::archive::ArchiveError;
use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Process exit codes, one per failure class.
pub mod exit_code {
    /// Sorting completed.
    pub const SUCCESS: u8 = 0;
    /// An I/O failure aborted the run, possibly mid-way.
    pub const FATAL_IO: u8 = 1;
    /// Wrong command-line arguments.
    pub const USAGE: u8 = 2;
    /// The target folder does not exist.
    pub const NOT_FOUND: u8 = 3;
    /// The filter configuration could not be loaded.
    pub const CONFIG: u8 = 4;
}

/// Errors that stop a sorting run.
#[derive(Debug, Error)]
pub enum CleanError {
    /// The folder to organize does not exist.
    #[error("Folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    /// The path exists but is not a directory.
    #[error("Not a folder: {}", .0.display())]
    NotAFolder(PathBuf),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A filesystem operation failed.
    #[error("{action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to walk {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("Failed to encode summary: {0}")]
    Json(#[from] serde_json::Error),
}

impl CleanError {
    /// Wraps an I/O error with the action and path it concerns.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Wraps a directory walk error.
    pub fn walk(path: impl Into<PathBuf>, source: walkdir::Error) -> Self {
        Self::Walk {
            path: path.into(),
            source,
        }
    }

    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::FolderNotFound(_) | Self::NotAFolder(_) => exit_code::NOT_FOUND,
            Self::Config(_) => exit_code::CONFIG,
            Self::Io { .. } | Self::Walk { .. } | Self::Archive(_) | Self::Json(_) => {
                exit_code::FATAL_IO
            }
        }
    }
}

/// Result type for sorting operations.
pub type CleanResult<T> = Result<T, CleanError>;
