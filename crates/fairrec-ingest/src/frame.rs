//! Loading a source file into a Polars DataFrame.

use std::fs::File;
use std::path::Path;

use polars::prelude::{Column, CsvReadOptions, DataFrame, ParquetReader, SerReader};

use fairrec_model::SchemaError;

use crate::error::{IngestError, Result};

/// On-disk encoding of a source table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Parquet,
    Csv,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension().and_then(|ext| ext.to_str())?;
        if ext.eq_ignore_ascii_case("parquet") {
            Some(Self::Parquet)
        } else if ext.eq_ignore_ascii_case("csv") {
            Some(Self::Csv)
        } else {
            None
        }
    }
}

/// Reads a parquet or CSV source into a DataFrame.
pub fn load_frame(path: &Path) -> Result<DataFrame> {
    let format = SourceFormat::from_path(path).ok_or_else(|| IngestError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    if !path.is_file() {
        return Err(IngestError::SourceNotFound {
            path: path.to_path_buf(),
        });
    }

    let df = match format {
        SourceFormat::Parquet => {
            let file = File::open(path).map_err(|e| IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            })?;
            ParquetReader::new(file)
                .finish()
                .map_err(|e| IngestError::Parse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?
        }
        SourceFormat::Csv => CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .map_err(|e| IngestError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .finish()
            .map_err(|e| IngestError::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?,
    };

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded source frame"
    );
    Ok(df)
}

/// Display name of a source used in schema errors.
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map_or_else(|| path.display().to_string(), str::to_string)
}

/// Looks up a required column and checks its type.
pub fn required_column<'a>(
    df: &'a DataFrame,
    name: &str,
    source: &str,
    accepts: fn(&polars::prelude::DataType) -> bool,
) -> Result<&'a Column> {
    let column = df.column(name).map_err(|_| SchemaError::MissingColumn {
        column: name.to_string(),
        source_name: source.to_string(),
    })?;
    check_dtype(column, name, source, accepts)?;
    Ok(column)
}

/// Looks up an optional column; absent columns are logged and yield `None`.
pub fn optional_column<'a>(
    df: &'a DataFrame,
    name: &str,
    source: &str,
    accepts: fn(&polars::prelude::DataType) -> bool,
) -> Result<Option<&'a Column>> {
    match df.column(name) {
        Ok(column) => {
            check_dtype(column, name, source, accepts)?;
            Ok(Some(column))
        }
        Err(_) => {
            tracing::debug!(column = name, source, "optional column absent");
            Ok(None)
        }
    }
}

fn check_dtype(
    column: &Column,
    name: &str,
    source: &str,
    accepts: fn(&polars::prelude::DataType) -> bool,
) -> Result<()> {
    if accepts(column.dtype()) {
        Ok(())
    } else {
        Err(SchemaError::UnexpectedColumnType {
            column: name.to_string(),
            source_name: source.to_string(),
            found: column.dtype().to_string(),
        }
        .into())
    }
}
