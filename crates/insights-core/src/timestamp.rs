//! Timestamp parsing and storage formatting
//!
//! Timestamps are stored as UTC text in `STORAGE_FORMAT`. The format is fixed
//! width up to the seconds, and `%.f` prints nothing for whole seconds, so text
//! comparison in SQLite orders the same way as the timestamps themselves.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Format used for the `added` and `published` columns
pub const STORAGE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    // Source dataset style, after commas are stripped: "January 20 2017 03:51:25"
    "%B %d %Y %H:%M:%S",
];

/// Parse a user- or file-supplied timestamp
///
/// Accepts RFC 3339 (offsets are converted to UTC), ISO-like naive date-times
/// (interpreted as UTC), bare dates (midnight UTC) and the long month-name form
/// used by the source dataset. Returns `None` for anything else.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Format a timestamp for storage and SQL comparison
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(STORAGE_FORMAT).to_string()
}

/// Parse a timestamp previously written with `format_timestamp`
pub fn parse_stored_timestamp(s: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, STORAGE_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2017, 1, 20, 3, 51, 25).unwrap();

        assert_eq!(parse_timestamp("2017-01-20T03:51:25Z"), Some(expected));
        assert_eq!(parse_timestamp("2017-01-20T05:51:25+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2017-01-20 03:51:25"), Some(expected));
        assert_eq!(parse_timestamp("2017-01-20T03:51:25"), Some(expected));
        assert_eq!(parse_timestamp("January 20 2017 03:51:25"), Some(expected));
        assert_eq!(
            parse_timestamp("2017-01-20"),
            Some(Utc.with_ymd_and_hms(2017, 1, 20, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2017-13-45"), None);
    }

    #[test]
    fn test_storage_format_round_trip_orders_as_text() {
        let whole = Utc.with_ymd_and_hms(2017, 1, 20, 3, 51, 25).unwrap();
        let stored = format_timestamp(&whole);
        assert_eq!(stored, "2017-01-20 03:51:25");
        assert_eq!(parse_stored_timestamp(&stored), Some(whole));

        let later = parse_timestamp("2017-01-20T03:51:25.5").unwrap();
        let later_stored = format_timestamp(&later);
        assert!(stored < later_stored);
        assert_eq!(parse_stored_timestamp(&later_stored), Some(later));
    }
}
