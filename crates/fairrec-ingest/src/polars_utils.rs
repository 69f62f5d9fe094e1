//! Polars AnyValue conversions into the raw record field types.

use polars::prelude::{AnyValue, DataType, Series, TimeUnit as PolarsTimeUnit};

use fairrec_model::{RawTimestamp, TimeUnit};

/// Converts a Polars AnyValue to a String representation.
/// Returns empty string for Null.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int8(v) => v.to_string(),
        AnyValue::Int16(v) => v.to_string(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt8(v) => v.to_string(),
        AnyValue::UInt16(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::UInt64(v) => v.to_string(),
        AnyValue::Float32(v) => fairrec_model::format_numeric(f64::from(v)),
        AnyValue::Float64(v) => fairrec_model::format_numeric(v),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        AnyValue::Boolean(b) => if b { "1" } else { "0" }.to_string(),
        other => other.to_string(),
    }
}

/// Converts AnyValue to a trimmed String, returning None if the result is empty.
pub fn any_to_token(value: AnyValue<'_>) -> Option<String> {
    let s = any_to_string(value);
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Converts an AnyValue to f64, returning None for non-numeric or null values.
pub fn any_to_f64(value: AnyValue<'_>) -> Option<f64> {
    let number = match value {
        AnyValue::Null => None,
        AnyValue::Int8(v) => Some(f64::from(v)),
        AnyValue::Int16(v) => Some(f64::from(v)),
        AnyValue::Int32(v) => Some(f64::from(v)),
        AnyValue::Int64(v) => Some(v as f64),
        AnyValue::UInt8(v) => Some(f64::from(v)),
        AnyValue::UInt16(v) => Some(f64::from(v)),
        AnyValue::UInt32(v) => Some(f64::from(v)),
        AnyValue::UInt64(v) => Some(v as f64),
        AnyValue::Float32(v) => Some(f64::from(v)),
        AnyValue::Float64(v) => Some(v),
        AnyValue::Boolean(b) => Some(if b { 1.0 } else { 0.0 }),
        AnyValue::String(s) => parse_f64(s),
        AnyValue::StringOwned(s) => parse_f64(&s),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

/// Converts an AnyValue to bool; numeric values are true when non-zero.
pub fn any_to_bool(value: AnyValue<'_>) -> Option<bool> {
    match value {
        AnyValue::Boolean(b) => Some(b),
        AnyValue::String(s) => parse_bool(s),
        AnyValue::StringOwned(s) => parse_bool(&s),
        other => any_to_f64(other).map(|v| v != 0.0),
    }
}

/// Converts a timestamp cell into its raw representation.
pub fn any_to_timestamp(value: AnyValue<'_>) -> Option<RawTimestamp> {
    match value {
        AnyValue::Null => None,
        AnyValue::Datetime(v, unit, _) => Some(RawTimestamp::Datetime {
            value: v,
            unit: convert_unit(unit),
        }),
        AnyValue::DatetimeOwned(v, unit, _) => Some(RawTimestamp::Datetime {
            value: v,
            unit: convert_unit(unit),
        }),
        AnyValue::Int8(v) => Some(RawTimestamp::Epoch(i64::from(v))),
        AnyValue::Int16(v) => Some(RawTimestamp::Epoch(i64::from(v))),
        AnyValue::Int32(v) => Some(RawTimestamp::Epoch(i64::from(v))),
        AnyValue::Int64(v) => Some(RawTimestamp::Epoch(v)),
        AnyValue::UInt8(v) => Some(RawTimestamp::Epoch(i64::from(v))),
        AnyValue::UInt16(v) => Some(RawTimestamp::Epoch(i64::from(v))),
        AnyValue::UInt32(v) => Some(RawTimestamp::Epoch(i64::from(v))),
        AnyValue::UInt64(v) => i64::try_from(v).ok().map(RawTimestamp::Epoch),
        AnyValue::Float32(v) => float_epoch(f64::from(v)),
        AnyValue::Float64(v) => float_epoch(v),
        AnyValue::String(s) => text_timestamp(s),
        AnyValue::StringOwned(s) => text_timestamp(&s),
        _ => None,
    }
}

/// Converts a list cell (or its textual `[a, b]` rendering) into tokens.
pub fn any_to_token_list(value: AnyValue<'_>) -> Vec<String> {
    match value {
        AnyValue::Null => Vec::new(),
        AnyValue::List(series) => series_tokens(&series),
        AnyValue::String(s) => parse_token_list(s),
        AnyValue::StringOwned(s) => parse_token_list(&s),
        other => any_to_token(other).into_iter().collect(),
    }
}

fn series_tokens(series: &Series) -> Vec<String> {
    (0..series.len())
        .filter_map(|idx| series.get(idx).ok().and_then(any_to_token))
        .collect()
}

/// Parses `[1, 2, 3]`, `1 2 3` or `1,2,3` into tokens.
pub fn parse_token_list(raw: &str) -> Vec<String> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .split(|ch: char| ch == ',' || ch.is_whitespace())
        .map(|part| part.trim().trim_matches(|ch| ch == '\'' || ch == '"'))
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_f64(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn float_epoch(v: f64) -> Option<RawTimestamp> {
    if v.is_finite() {
        Some(RawTimestamp::Epoch(v.trunc() as i64))
    } else {
        None
    }
}

fn text_timestamp(raw: &str) -> Option<RawTimestamp> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<i64>() {
        Ok(epoch) => Some(RawTimestamp::Epoch(epoch)),
        Err(_) => Some(RawTimestamp::Text(trimmed.to_string())),
    }
}

fn convert_unit(unit: PolarsTimeUnit) -> TimeUnit {
    match unit {
        PolarsTimeUnit::Nanoseconds => TimeUnit::Nanoseconds,
        PolarsTimeUnit::Microseconds => TimeUnit::Microseconds,
        PolarsTimeUnit::Milliseconds => TimeUnit::Milliseconds,
    }
}

/// Column types that can hold an identifier.
pub fn is_token_dtype(dtype: &DataType) -> bool {
    dtype.is_integer() || matches!(dtype, DataType::String | DataType::Null)
}

/// Column types that can hold a numeric demographic value or flag.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    dtype.is_integer()
        || dtype.is_float()
        || matches!(dtype, DataType::Boolean | DataType::String | DataType::Null)
}

pub fn is_timestamp_dtype(dtype: &DataType) -> bool {
    dtype.is_integer()
        || dtype.is_float()
        || matches!(
            dtype,
            DataType::Datetime(_, _) | DataType::String | DataType::Null
        )
}

pub fn is_list_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::List(_) | DataType::String | DataType::Null)
}

pub fn is_text_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Null) || dtype.is_integer()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_list_from_text() {
        assert_eq!(parse_token_list("[9770989, 9770960]"), vec!["9770989", "9770960"]);
        assert_eq!(parse_token_list("1 2  3"), vec!["1", "2", "3"]);
        assert!(parse_token_list("[]").is_empty());
    }

    #[test]
    fn token_trims_and_rejects_empty() {
        assert_eq!(any_to_token(AnyValue::String("  u1 ")), Some("u1".to_string()));
        assert_eq!(any_to_token(AnyValue::String("   ")), None);
        assert_eq!(any_to_token(AnyValue::Null), None);
        assert_eq!(any_to_token(AnyValue::UInt32(42)), Some("42".to_string()));
    }

    #[test]
    fn timestamps_from_cells() {
        assert_eq!(
            any_to_timestamp(AnyValue::Int64(1_683_000_000)),
            Some(RawTimestamp::Epoch(1_683_000_000))
        );
        assert_eq!(
            any_to_timestamp(AnyValue::String("2023-05-18 07:33:21")),
            Some(RawTimestamp::Text("2023-05-18 07:33:21".to_string()))
        );
        assert_eq!(any_to_timestamp(AnyValue::String("")), None);
        assert_eq!(any_to_timestamp(AnyValue::Float64(f64::NAN)), None);
    }

    #[test]
    fn bool_parsing() {
        assert_eq!(any_to_bool(AnyValue::Boolean(true)), Some(true));
        assert_eq!(any_to_bool(AnyValue::String("False")), Some(false));
        assert_eq!(any_to_bool(AnyValue::Int32(0)), Some(false));
        assert_eq!(any_to_bool(AnyValue::Null), None);
    }
}
