//! Error types for EB-NeRD source ingestion.

use std::path::PathBuf;
use thiserror::Error;

use fairrec_model::SchemaError;

/// Errors that can occur while loading raw sources.
#[derive(Debug, Error)]
pub enum IngestError {
    // === File System Errors ===
    /// A required source file is missing.
    #[error("source file not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Failed to open or read a source file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Extension is neither parquet nor csv.
    #[error("unsupported source format for {path} (expected .parquet or .csv)")]
    UnsupportedFormat { path: PathBuf },

    // === Parsing Errors ===
    /// Polars failed to decode the file.
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Failed DataFrame operation after loading.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    // === Schema Errors ===
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl From<polars::prelude::PolarsError> for IngestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IngestError::SourceNotFound {
            path: PathBuf::from("/data/train/behaviors.parquet"),
        };
        assert_eq!(
            err.to_string(),
            "source file not found: /data/train/behaviors.parquet"
        );
    }

    #[test]
    fn test_error_from_polars() {
        let polars_err = polars::prelude::PolarsError::ColumnNotFound("user_id".into());
        let ingest_err: IngestError = polars_err.into();
        assert!(matches!(ingest_err, IngestError::DataFrame { .. }));
    }

    #[test]
    fn test_schema_error_is_transparent() {
        let err: IngestError = SchemaError::MissingColumn {
            column: "user_id".to_string(),
            source_name: "behaviors.csv".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "required column 'user_id' not found in behaviors.csv"
        );
    }
}
