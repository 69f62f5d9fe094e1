//! Conversion of raw timestamps to epoch seconds.
//!
//! All interaction timestamps are emitted as whole seconds since the Unix
//! epoch (UTC). Sub-second precision is floored.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use fairrec_model::{RawTimestamp, TimeUnit};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Converts a raw timestamp to epoch seconds; `None` when it cannot be interpreted.
pub fn to_epoch_seconds(raw: &RawTimestamp) -> Option<i64> {
    match raw {
        RawTimestamp::Epoch(value) => Some(epoch_from_integer(*value)),
        RawTimestamp::Datetime { value, unit } => Some(value.div_euclid(unit_divisor(*unit))),
        RawTimestamp::Text(text) => parse_text(text),
    }
}

/// Integer epochs of unknown unit: the magnitude picks the unit.
///
/// Seconds stay below 10^11 until the year 5138, so anything larger is
/// milliseconds, microseconds or nanoseconds.
fn epoch_from_integer(value: i64) -> i64 {
    let magnitude = value.unsigned_abs();
    if magnitude >= 100_000_000_000_000_000 {
        value.div_euclid(1_000_000_000)
    } else if magnitude >= 100_000_000_000_000 {
        value.div_euclid(1_000_000)
    } else if magnitude >= 100_000_000_000 {
        value.div_euclid(1_000)
    } else {
        value
    }
}

fn unit_divisor(unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => 1_000_000_000,
        TimeUnit::Microseconds => 1_000_000,
        TimeUnit::Milliseconds => 1_000,
    }
}

fn parse_text(text: &str) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.timestamp());
    }
    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed.and_utc().timestamp());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_units_by_magnitude() {
        assert_eq!(to_epoch_seconds(&RawTimestamp::Epoch(1_683_000_000)), Some(1_683_000_000));
        assert_eq!(
            to_epoch_seconds(&RawTimestamp::Epoch(1_683_000_000_123)),
            Some(1_683_000_000)
        );
        assert_eq!(
            to_epoch_seconds(&RawTimestamp::Epoch(1_683_000_000_123_456)),
            Some(1_683_000_000)
        );
        assert_eq!(
            to_epoch_seconds(&RawTimestamp::Epoch(1_683_000_000_123_456_789)),
            Some(1_683_000_000)
        );
    }

    #[test]
    fn datetime_units() {
        let raw = RawTimestamp::Datetime {
            value: 1_683_000_000_999_999,
            unit: TimeUnit::Microseconds,
        };
        assert_eq!(to_epoch_seconds(&raw), Some(1_683_000_000));
        let before_epoch = RawTimestamp::Datetime {
            value: -1,
            unit: TimeUnit::Milliseconds,
        };
        assert_eq!(to_epoch_seconds(&before_epoch), Some(-1));
    }

    #[test]
    fn text_forms() {
        let text = |s: &str| to_epoch_seconds(&RawTimestamp::Text(s.to_string()));
        assert_eq!(text("2023-05-02T04:00:00Z"), Some(1_683_000_000));
        assert_eq!(text("2023-05-02T06:00:00+02:00"), Some(1_683_000_000));
        assert_eq!(text("2023-05-02 04:00:00"), Some(1_683_000_000));
        assert_eq!(text("2023-05-02 04:00:00.750"), Some(1_683_000_000));
        assert_eq!(text("2023-05-02"), Some(1_682_985_600));
        assert_eq!(text("yesterday"), None);
        assert_eq!(text("  "), None);
    }
}
