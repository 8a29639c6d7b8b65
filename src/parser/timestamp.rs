//! Timestamp resolution
//!
//! Turns the timestamp text found in a log line into an absolute UTC instant.
//! Epoch numbers and absolute formats (ISO-8601, RFC 2822, CLF) are tried
//! first; syslog stamps
//! such as `Nov 06 09:12:04` carry no year, so a reference year is supplied.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;

static SYSLOG_STAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Z][a-z]{2})\s+(\d{1,2}) (\d{2}:\d{2}:\d{2})").expect("valid syslog stamp regex")
});

/// Formats carrying an explicit UTC offset
const OFFSET_FORMATS: &[&str] = &[
    "%d/%b/%Y:%H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f %z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
];

/// Formats without an offset; read as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Epoch values at or above this are milliseconds, below it seconds
const EPOCH_MILLIS_FLOOR: i64 = 1_000_000_000_000;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Leading syslog stamp of a line (`Mon DD HH:MM:SS`), if any
pub fn syslog_prefix(line: &str) -> Option<&str> {
    SYSLOG_STAMP.find(line).map(|m| m.as_str())
}

/// Resolves raw timestamp text into an absolute instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimestampResolver {
    reference_year: i32,
}

impl TimestampResolver {
    /// Resolver using the current year for syslog stamps
    pub fn new() -> Self {
        TimestampResolver {
            reference_year: Utc::now().year(),
        }
    }

    pub fn with_reference_year(reference_year: i32) -> Self {
        TimestampResolver { reference_year }
    }

    pub fn reference_year(&self) -> i32 {
        self.reference_year
    }

    /// Resolve `raw` to an instant; `None` when no known format matches
    pub fn resolve(&self, raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        parse_absolute(raw).or_else(|| self.parse_syslog(raw))
    }

    fn parse_syslog(&self, raw: &str) -> Option<DateTime<Utc>> {
        let caps = SYSLOG_STAMP.captures(raw)?;
        let month = MONTHS.iter().position(|m| *m == &caps[1])? as u32 + 1;
        let day: u32 = caps[2].parse().ok()?;
        let date = NaiveDate::from_ymd_opt(self.reference_year, month, day)?;
        let time = NaiveTime::parse_from_str(&caps[3], "%H:%M:%S").ok()?;
        Some(date.and_time(time).and_utc())
    }
}

impl Default for TimestampResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_epoch(raw: &str) -> Option<DateTime<Utc>> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let ts: i64 = raw.parse().ok()?;
    if ts >= EPOCH_MILLIS_FLOOR {
        Utc.timestamp_millis_opt(ts).single()
    } else {
        Utc.timestamp_opt(ts, 0).single()
    }
}

fn parse_absolute(raw: &str) -> Option<DateTime<Utc>> {
    if let Some(dt) = parse_epoch(raw) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.and_utc());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> TimestampResolver {
        TimestampResolver::with_reference_year(2025)
    }

    #[test]
    fn test_iso8601_utc() {
        let parsed = resolver().resolve("2025-01-01T00:00:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_iso8601_with_offset_and_fraction() {
        let parsed = resolver().resolve("2025-03-04T10:00:00.250+02:00").unwrap();
        assert_eq!(parsed.timestamp_millis(), Utc.with_ymd_and_hms(2025, 3, 4, 8, 0, 0).unwrap().timestamp_millis() + 250);
    }

    #[test]
    fn test_naive_datetime_read_as_utc() {
        let parsed = resolver().resolve("2024-06-30 23:59:59").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap());
    }

    #[test]
    fn test_rfc2822() {
        let parsed = resolver().resolve("Tue, 1 Jul 2003 10:52:37 +0200").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2003, 7, 1, 8, 52, 37).unwrap());
    }

    #[test]
    fn test_clf_bracket_form() {
        let parsed = resolver().resolve("10/Oct/2000:13:55:36 -0700").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2000, 10, 10, 20, 55, 36).unwrap());
    }

    #[test]
    fn test_date_only() {
        let parsed = resolver().resolve("2025-02-14").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 2, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_iso8601_basic_offset() {
        let parsed = resolver().resolve("2025-01-01T10:00:00+0000").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap());

        let parsed = resolver().resolve("2025-01-01T10:00:00.123+0100").unwrap();
        assert_eq!(
            parsed.timestamp_millis(),
            Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap().timestamp_millis() + 123
        );
    }

    #[test]
    fn test_slash_date_only() {
        let parsed = resolver().resolve("2025/01/01").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_us_month_first_datetime() {
        let parsed = resolver().resolve("01/15/2025 10:00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_epoch_millis_and_seconds() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(resolver().resolve("1735725600000"), Some(expected));
        assert_eq!(resolver().resolve("1735725600"), Some(expected));
        assert!(resolver().resolve("-1735725600").is_none());
    }

    #[test]
    fn test_syslog_uses_reference_year() {
        let parsed = resolver().resolve("Nov 06 09:12:04").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 11, 6, 9, 12, 4).unwrap());

        let parsed = TimestampResolver::with_reference_year(2019)
            .resolve("Nov 6 09:12:04")
            .unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2019, 11, 6, 9, 12, 4).unwrap());
    }

    #[test]
    fn test_syslog_prefix_of_longer_text() {
        let parsed = resolver().resolve("Jan  3 01:02:03 host sshd[1]: hello").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 1, 3, 1, 2, 3).unwrap());
    }

    #[test]
    fn test_invalid_syslog_day_unresolved() {
        assert!(resolver().resolve("Feb 30 10:00:00").is_none());
        assert!(resolver().resolve("Foo 12 10:00:00").is_none());
    }

    #[test]
    fn test_garbage_unresolved() {
        let r = resolver();
        assert!(r.resolve("not a date").is_none());
        assert!(r.resolve("").is_none());
        assert!(r.resolve("   ").is_none());
        assert!(r.resolve("ERROR").is_none());
        assert!(r.resolve("99/99/9999").is_none());
    }

    #[test]
    fn test_deterministic() {
        let r = resolver();
        for raw in ["2025-01-01T00:00:00Z", "Nov 06 09:12:04", "garbage"] {
            assert_eq!(r.resolve(raw), r.resolve(raw));
        }
    }

    #[test]
    fn test_syslog_prefix() {
        assert_eq!(
            syslog_prefix("Nov 06 09:12:04 sshd[2145]: Failed password"),
            Some("Nov 06 09:12:04")
        );
        assert_eq!(syslog_prefix("sshd: Nov 06 09:12:04"), None);
    }
}
