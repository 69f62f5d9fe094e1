//! Delimited writer for a single atomic file.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, WriterBuilder};

use fairrec_model::{AtomicRow, FieldSpec, TableKind};

use crate::digest::DigestWriter;
use crate::error::{OutputError, Result};
use crate::manifest::TableManifest;

/// Writes `rows` under the header for `table` and syncs the file to disk.
///
/// The framework loader does not understand quoting, so cells never get
/// quoted; any occurrence of the separator inside a cell is replaced by a
/// space.
pub(crate) fn write_table<R, I>(
    path: &Path,
    table: TableKind,
    rows: I,
    separator: char,
) -> Result<TableManifest>
where
    R: AtomicRow,
    I: IntoIterator<Item = R>,
{
    let file = File::create(path).map_err(|e| OutputError::io("create", path, e))?;
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter_byte(separator)?)
        .quote_style(QuoteStyle::Never)
        .has_headers(false)
        .from_writer(DigestWriter::new(file));

    let header: Vec<String> = table.fields().iter().map(FieldSpec::header).collect();
    writer
        .write_record(&header)
        .map_err(|e| csv_error(path, &e))?;

    let mut count = 0usize;
    for row in rows {
        let cells: Vec<String> = row
            .cells()
            .into_iter()
            .map(|cell| clean_cell(cell, separator))
            .collect();
        writer
            .write_record(&cells)
            .map_err(|e| csv_error(path, &e))?;
        count += 1;
    }

    writer.flush().map_err(|e| OutputError::io("write", path, e))?;
    let digest_writer = writer.into_inner().map_err(|e| OutputError::Csv {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let (mut file, sha256, bytes) = digest_writer.finish();
    file.flush().map_err(|e| OutputError::io("write", path, e))?;
    file.sync_all().map_err(|e| OutputError::io("sync", path, e))?;

    tracing::debug!(table = table.extension(), rows = count, bytes, "wrote table");

    Ok(TableManifest {
        table,
        file: file_name(path),
        rows: count,
        bytes,
        sha256,
    })
}

/// Separator as a single byte; `:` and line breaks clash with the format.
pub(crate) fn delimiter_byte(separator: char) -> Result<u8> {
    if !separator.is_ascii() || matches!(separator, ':' | '\n' | '\r' | ' ') {
        return Err(OutputError::InvalidSeparator(separator));
    }
    Ok(separator as u8)
}

/// Replaces the separator and line breaks, then collapses the resulting
/// whitespace so `token_seq` cells never gain empty tokens.
fn clean_cell(cell: String, separator: char) -> String {
    if cell.contains(separator) || cell.contains(['\n', '\r']) {
        cell.replace([separator, '\n', '\r'], " ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        cell
    }
}

fn csv_error(path: &Path, error: &csv::Error) -> OutputError {
    OutputError::Csv {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
