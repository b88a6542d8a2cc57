//! Error types for pg2my.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// The main error type for porting operations.
#[derive(Debug, Error)]
pub enum PortError {
    /// File could not be read or written.
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unsupported `.returning()` calls survived a full rewrite pass.
    #[error("{path}: {count} unsupported .returning() call(s) left after rewrite")]
    Residual { path: PathBuf, count: usize },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PortError {
    /// Create an I/O error for the given file.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a residual-clause error for the given file.
    pub fn residual(path: &Path, count: usize) -> Self {
        Self::Residual {
            path: path.to_path_buf(),
            count,
        }
    }
}

/// Result type alias for porting operations.
pub type PortResult<T> = Result<T, PortError>;
