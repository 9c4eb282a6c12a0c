//! Error taxonomy and process exit codes.
//!
//! Only `InvalidPath` and the configuration errors abort a run. Read and
//! parse failures are caught per file and surface as `ignored` entries in the
//! report; a dirty notebook is an outcome, never an error.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported notebook format version {major}.{minor} (expected 4.x)")]
    UnsupportedVersion { major: u32, minor: u32 },

    #[error("invalid metadata pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid exclude pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to load {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },
}

impl Error {
    /// Exit code used when this error ends the run.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Error::InvalidPath(_) => ExitCode::InvalidPath,
            _ => ExitCode::Usage,
        }
    }
}

/// Process exit statuses understood by pre-commit style callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Clean = 0,
    Dirty = 1,
    Usage = 2,
    InvalidPath = 3,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}
