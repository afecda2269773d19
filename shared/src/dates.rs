//! Lenient timestamp parsing for request payloads.
//!
//! Browsers post date inputs as `2026-03-01`, datetime-local inputs as
//! `2026-03-01T09:30`, and serialized dates as RFC 3339. All three are
//! accepted; naive values are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

pub(crate) fn parse(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

pub(crate) fn deserialize_optional<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {s}"))),
    }
}

/// For partial updates: a missing key never reaches this function, so
/// `null` or `""` becomes `Some(None)`.
pub(crate) fn deserialize_patch<'de, D>(
    deserializer: D,
) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn accepts_browser_formats() {
        let rfc = parse("2026-03-01T09:30:00+02:00").unwrap();
        assert_eq!(rfc.hour(), 7);

        let local = parse("2026-03-01T09:30").unwrap();
        assert_eq!((local.hour(), local.minute()), (9, 30));

        let day = parse("2026-03-01").unwrap();
        assert_eq!((day.year(), day.month(), day.day()), (2026, 3, 1));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("next tuesday").is_none());
    }
}
