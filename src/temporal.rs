//! Date and timestamp literal decoding.
//!
//! CQL2 temporal literals arrive as quoted strings (`DATE('2020-01-01')`,
//! `TIMESTAMP('2020-01-01T00:00:00Z')`, interval bounds). Decoding tries the
//! accepted formats longest-pattern-first: a candidate must both match the
//! format structurally and name a real calendar instant. The structural check
//! is regex-level; calendar validity goes through the `time` crate.

use std::sync::LazyLock;

use regex::Regex;
use time::{Date, Month, Time};

use crate::ast::Scalar;

static TIMESTAMP_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    // Longest first: fractional seconds and zone, zone only, fractional
    // seconds only, bare local timestamp.
    [
        r"^(\d{4})-(\d{2})-(\d{2})[Tt](\d{2}):(\d{2}):(\d{2})\.\d+(?:[Zz]|([+-])(\d{2}):(\d{2}))$",
        r"^(\d{4})-(\d{2})-(\d{2})[Tt](\d{2}):(\d{2}):(\d{2})(?:[Zz]|([+-])(\d{2}):(\d{2}))$",
        r"^(\d{4})-(\d{2})-(\d{2})[Tt](\d{2}):(\d{2}):(\d{2})\.\d+$",
        r"^(\d{4})-(\d{2})-(\d{2})[Tt](\d{2}):(\d{2}):(\d{2})$",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("timestamp pattern"))
    .collect()
});

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("date pattern"));

fn field(caps: &regex::Captures<'_>, index: usize) -> Option<u32> {
    caps.get(index).and_then(|m| m.as_str().parse().ok())
}

/// Calendar check for a year/month/day triple.
fn valid_date(year: u32, month: u32, day: u32) -> bool {
    let Ok(month) = u8::try_from(month) else {
        return false;
    };
    let Ok(month) = Month::try_from(month) else {
        return false;
    };
    let Ok(day) = u8::try_from(day) else {
        return false;
    };
    Date::from_calendar_date(year as i32, month, day).is_ok()
}

/// Clock check for an hour/minute/second triple.
fn valid_time(hour: u32, minute: u32, second: u32) -> bool {
    match (u8::try_from(hour), u8::try_from(minute), u8::try_from(second)) {
        (Ok(h), Ok(m), Ok(s)) => Time::from_hms(h, m, s).is_ok(),
        _ => false,
    }
}

fn valid_offset(caps: &regex::Captures<'_>) -> bool {
    // Groups 7..9 only participate when an explicit +hh:mm offset matched.
    match (field(caps, 8), field(caps, 9)) {
        (Some(h), Some(m)) => h <= 23 && m <= 59,
        _ => true,
    }
}

/// Decode a date literal: `YYYY-MM-DD`, calendrically valid.
pub fn decode_date(text: &str) -> Result<Scalar, String> {
    if let Some(caps) = DATE_PATTERN.captures(text) {
        let (year, month, day) = (
            field(&caps, 1).unwrap_or(0),
            field(&caps, 2).unwrap_or(0),
            field(&caps, 3).unwrap_or(0),
        );
        if valid_date(year, month, day) {
            return Ok(Scalar::Date(text.to_string()));
        }
    }
    Err(format!("'{}' is not a valid date", text))
}

/// Decode a timestamp literal, trying the accepted formats longest-first.
pub fn decode_timestamp(text: &str) -> Result<Scalar, String> {
    for pattern in TIMESTAMP_PATTERNS.iter() {
        let Some(caps) = pattern.captures(text) else {
            continue;
        };
        let date_ok = valid_date(
            field(&caps, 1).unwrap_or(0),
            field(&caps, 2).unwrap_or(0),
            field(&caps, 3).unwrap_or(0),
        );
        let time_ok = valid_time(
            field(&caps, 4).unwrap_or(99),
            field(&caps, 5).unwrap_or(99),
            field(&caps, 6).unwrap_or(99),
        );
        if date_ok && time_ok && valid_offset(&caps) {
            return Ok(Scalar::Timestamp(text.to_string()));
        }
        // Structurally matched but calendrically bogus; longer patterns have
        // already been ruled out, so this is the final answer.
        break;
    }
    Err(format!("'{}' is not a valid timestamp", text))
}

/// Decode either a timestamp or a date, preferring the longer timestamp
/// forms. Interval bounds use this.
pub fn decode_temporal(text: &str) -> Result<Scalar, String> {
    decode_timestamp(text)
        .or_else(|_| decode_date(text))
        .map_err(|_| format!("'{}' is not a valid date or timestamp", text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_date() {
        assert_eq!(
            decode_date("2020-02-29"),
            Ok(Scalar::Date("2020-02-29".to_string()))
        );
        assert!(decode_date("2021-02-29").is_err());
        assert!(decode_date("2020-13-01").is_err());
        assert!(decode_date("2020-1-1").is_err());
    }

    #[test]
    fn test_decode_timestamp() {
        assert!(decode_timestamp("2020-01-01T00:00:00Z").is_ok());
        assert!(decode_timestamp("2020-01-01T12:31:22.483Z").is_ok());
        assert!(decode_timestamp("2020-01-01T12:31:22+02:00").is_ok());
        assert!(decode_timestamp("2020-01-01T12:31:22").is_ok());
        assert!(decode_timestamp("2020-01-01T25:00:00Z").is_err());
        assert!(decode_timestamp("2020-01-01").is_err());
    }

    #[test]
    fn test_decode_temporal_prefers_timestamp() {
        assert!(matches!(
            decode_temporal("2020-01-01T00:00:00Z"),
            Ok(Scalar::Timestamp(_))
        ));
        assert!(matches!(decode_temporal("2020-01-01"), Ok(Scalar::Date(_))));
        assert!(decode_temporal("..").is_err());
    }
}
