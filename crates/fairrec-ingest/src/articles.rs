//! Article metadata reader.

use std::path::Path;

use polars::prelude::{AnyValue, Column};

use fairrec_model::RawArticle;

use crate::columns::ArticleColumns;
use crate::error::Result;
use crate::frame::{load_frame, optional_column, required_column, source_name};
use crate::polars_utils::{any_to_bool, any_to_token, is_numeric_dtype, is_text_dtype, is_token_dtype};

/// Reads the article metadata; only the article id column is mandatory.
pub fn read_articles(path: &Path, columns: &ArticleColumns) -> Result<Vec<RawArticle>> {
    let df = load_frame(path)?;
    let source = source_name(path);

    let article = required_column(&df, &columns.article, &source, is_token_dtype)?;
    let title = optional_column(&df, &columns.title, &source, is_text_dtype)?;
    let category = optional_column(&df, &columns.category, &source, is_text_dtype)?;
    let premium = optional_column(&df, &columns.premium, &source, is_numeric_dtype)?;

    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        rows.push(RawArticle {
            article: any_to_token(article.get(idx)?),
            title: any_to_token(cell(title, idx)?),
            category: any_to_token(cell(category, idx)?),
            premium: any_to_bool(cell(premium, idx)?),
        });
    }

    tracing::info!(source = %source, rows = rows.len(), "read article metadata");
    Ok(rows)
}

fn cell(column: Option<&Column>, idx: usize) -> Result<AnyValue<'_>> {
    match column {
        Some(column) => Ok(column.get(idx)?),
        None => Ok(AnyValue::Null),
    }
}
