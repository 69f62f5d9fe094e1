//! Output error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while emitting tables.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The output directory cannot be created or written to.
    #[error("output directory is not writable: {path}: {source}")]
    NotWritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File I/O error.
    #[error("failed to {operation} file {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Delimited writer failure.
    #[error("failed to write table {path}: {message}")]
    Csv { path: PathBuf, message: String },

    #[error("failed to serialize manifest: {source}")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// A staged file could not be moved into place.
    #[error("failed to move {temp_path} to {target_path}: {source}")]
    AtomicRename {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dataset names become directory and file stems.
    #[error("invalid dataset name '{0}'")]
    InvalidDatasetName(String),

    /// The separator would collide with the header syntax or line structure.
    #[error("invalid field separator {0:?}")]
    InvalidSeparator(char),
}

impl OutputError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
