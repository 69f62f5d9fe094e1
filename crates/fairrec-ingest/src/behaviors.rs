//! Behavior log reader.

use std::path::Path;

use polars::prelude::{AnyValue, Column};

use fairrec_model::{InteractionMode, RawBehavior};

use crate::columns::BehaviorColumns;
use crate::error::Result;
use crate::frame::{load_frame, optional_column, required_column, source_name};
use crate::polars_utils::{
    any_to_bool, any_to_f64, any_to_timestamp, any_to_token, any_to_token_list, is_list_dtype,
    is_numeric_dtype, is_timestamp_dtype, is_token_dtype,
};

/// Options for reading the behavior log.
#[derive(Debug, Clone, Default)]
pub struct BehaviorReadOptions {
    pub columns: BehaviorColumns,
    pub mode: InteractionMode,
    /// Read at most this many rows.
    pub max_rows: Option<usize>,
}

/// Reads the behavior log into typed rows.
///
/// The user and timestamp columns are always required; `article_id` is
/// required in article mode and the in-view/clicked lists in impression
/// mode. Demographic columns are optional. Null cells are kept as `None`
/// so the normalizer can count them.
pub fn read_behaviors(path: &Path, options: &BehaviorReadOptions) -> Result<Vec<RawBehavior>> {
    let df = load_frame(path)?;
    let source = source_name(path);
    let cols = &options.columns;

    let user = required_column(&df, &cols.user, &source, is_token_dtype)?;
    let timestamp = required_column(&df, &cols.timestamp, &source, is_timestamp_dtype)?;
    let (article, inview, clicked) = match options.mode {
        InteractionMode::Article => (
            Some(required_column(&df, &cols.article, &source, is_token_dtype)?),
            None,
            None,
        ),
        InteractionMode::Impressions => (
            optional_column(&df, &cols.article, &source, is_token_dtype)?,
            Some(required_column(&df, &cols.inview, &source, is_list_dtype)?),
            Some(required_column(&df, &cols.clicked, &source, is_list_dtype)?),
        ),
    };
    let gender = optional_column(&df, &cols.gender, &source, is_numeric_dtype)?;
    let age = optional_column(&df, &cols.age, &source, is_numeric_dtype)?;
    let subscriber = optional_column(&df, &cols.is_subscriber, &source, is_numeric_dtype)?;

    let height = options
        .max_rows
        .map_or(df.height(), |limit| limit.min(df.height()));
    let mut rows = Vec::with_capacity(height);
    for idx in 0..height {
        rows.push(RawBehavior {
            user: any_to_token(user.get(idx)?),
            article: any_to_token(cell(article, idx)?),
            timestamp: any_to_timestamp(timestamp.get(idx)?),
            inview: any_to_token_list(cell(inview, idx)?),
            clicked: any_to_token_list(cell(clicked, idx)?),
            gender: any_to_f64(cell(gender, idx)?),
            age: any_to_f64(cell(age, idx)?),
            is_subscriber: any_to_bool(cell(subscriber, idx)?),
        });
    }

    tracing::info!(
        source = %source,
        rows = rows.len(),
        total_rows = df.height(),
        "read behavior log"
    );
    Ok(rows)
}

fn cell(column: Option<&Column>, idx: usize) -> Result<AnyValue<'_>> {
    match column {
        Some(column) => Ok(column.get(idx)?),
        None => Ok(AnyValue::Null),
    }
}
