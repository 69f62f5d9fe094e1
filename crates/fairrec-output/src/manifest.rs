//! Dataset manifest written next to the atomic files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use fairrec_model::{DropReport, TableKind};

use crate::error::{OutputError, Result};

/// Per-file entry in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableManifest {
    pub table: TableKind,
    pub file: String,
    pub rows: usize,
    pub bytes: u64,
    /// Lowercase hex SHA-256 of the file contents.
    pub sha256: String,
}

/// Contents of `<dataset>.manifest.json`.
///
/// Holds nothing time-dependent so that re-running the normalizer on the
/// same inputs yields a byte-identical manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetManifest {
    pub dataset: String,
    pub separator: String,
    pub tables: Vec<TableManifest>,
    pub dropped: DropReport,
}

impl DatasetManifest {
    pub fn file_name(dataset: &str) -> String {
        format!("{dataset}.manifest.json")
    }

    pub fn table(&self, table: TableKind) -> Option<&TableManifest> {
        self.tables.iter().find(|entry| entry.table == table)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec_pretty(self)
            .map_err(|source| OutputError::Serialization { source })?;
        bytes.push(b'\n');
        Ok(bytes)
    }

    /// Reads a manifest previously written by the emitter.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| OutputError::io("read", path, e))?;
        serde_json::from_slice(&bytes).map_err(|source| OutputError::Serialization { source })
    }
}
