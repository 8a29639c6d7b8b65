//! Brute force detection
//!
//! Counts failed authentication attempts per source address inside a
//! sliding time window. The first window that reaches the threshold is
//! reported; later (possibly larger) windows for the same source are not.

use chrono::Duration;

use super::timeline::{window_end, window_from_seconds, TimedRecord};
use crate::config::BruteForceConfig;
use crate::models::BruteForceFinding;

/// Whether a status text signals a failed attempt
///
/// Deliberately loose: any status containing "fail" or "unauthorized", plus
/// the HTTP codes 401 and 403.
pub fn is_failure_status(status: &str) -> bool {
    let status = status.trim().to_lowercase();
    status.contains("fail") || status.contains("unauthorized") || status == "401" || status == "403"
}

/// Detects bursts of failed attempts from a single source
#[derive(Debug, Clone)]
pub struct BruteForceDetector {
    window: Duration,
    attempt_threshold: usize,
}

impl BruteForceDetector {
    pub fn new(window: Duration, attempt_threshold: usize) -> Self {
        BruteForceDetector {
            window,
            attempt_threshold,
        }
    }

    pub fn from_config(config: &BruteForceConfig) -> Self {
        Self::new(window_from_seconds(config.window_seconds), config.attempt_threshold)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn attempt_threshold(&self) -> usize {
        self.attempt_threshold
    }

    /// Scan one source's time-ordered records for a qualifying window
    pub fn scan(&self, ip: &str, timeline: &[TimedRecord<'_>]) -> Option<BruteForceFinding> {
        for start in 0..timeline.len() {
            let end = window_end(timeline, start, self.window);
            let attempts = timeline[start..end]
                .iter()
                .filter(|entry| entry.record.status.as_deref().is_some_and(is_failure_status))
                .count();

            if attempts >= self.attempt_threshold {
                log::debug!(
                    "Brute force from {}: {} failed attempt(s) within {}s (threshold: {})",
                    ip,
                    attempts,
                    self.window.num_seconds(),
                    self.attempt_threshold
                );
                return Some(BruteForceFinding {
                    ip: ip.to_string(),
                    attempts,
                    first_seen: timeline[start].record.parsed_time,
                });
            }
        }
        None
    }
}

impl Default for BruteForceDetector {
    fn default() -> Self {
        Self::from_config(&BruteForceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnresolvedTimePolicy;
    use crate::detection::timeline::build_timeline;
    use crate::models::LogRecord;
    use chrono::{DateTime, TimeZone, Utc};

    fn base() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn attempt(offset_ms: i64, status: &str) -> LogRecord {
        let at = base() + Duration::milliseconds(offset_ms);
        LogRecord {
            source_ip: Some("10.0.0.1".to_string()),
            dest_ip: None,
            raw_time: Some(at.to_rfc3339()),
            parsed_time: Some(at),
            request: Some("POST /login".to_string()),
            status: Some(status.to_string()),
            port: Some(22),
            raw: format!("attempt at {}", offset_ms),
        }
    }

    fn scan(detector: &BruteForceDetector, records: &[LogRecord]) -> Option<BruteForceFinding> {
        let refs: Vec<&LogRecord> = records.iter().collect();
        let timeline = build_timeline(&refs, base() + Duration::days(1), UnresolvedTimePolicy::TreatAsNow);
        detector.scan("10.0.0.1", &timeline)
    }

    #[test]
    fn test_failure_statuses() {
        assert!(is_failure_status("Failed"));
        assert!(is_failure_status("authentication FAILURE"));
        assert!(is_failure_status("401"));
        assert!(is_failure_status(" 403 "));
        assert!(is_failure_status("Unauthorized"));
        assert!(!is_failure_status("OK"));
        assert!(!is_failure_status("200"));
        assert!(!is_failure_status("4010"));
    }

    #[test]
    fn test_below_threshold() {
        let detector = BruteForceDetector::new(Duration::minutes(10), 5);
        let records: Vec<_> = (0..4).map(|i| attempt(i * 1000, "Failed")).collect();
        assert!(scan(&detector, &records).is_none());
    }

    #[test]
    fn test_exact_threshold_at_window_edge() {
        let detector = BruteForceDetector::new(Duration::minutes(10), 5);
        let mut records: Vec<_> = (0..4).map(|_| attempt(0, "Failed")).collect();
        records.push(attempt(10 * 60 * 1000, "Failed"));

        let finding = scan(&detector, &records).expect("threshold reached inside window");
        assert_eq!(finding.ip, "10.0.0.1");
        assert_eq!(finding.attempts, 5);
        assert_eq!(finding.first_seen, Some(base()));
    }

    #[test]
    fn test_one_millisecond_outside_window() {
        let detector = BruteForceDetector::new(Duration::minutes(10), 5);
        let mut records: Vec<_> = (0..4).map(|_| attempt(0, "Failed")).collect();
        records.push(attempt(10 * 60 * 1000 + 1, "Failed"));

        assert!(scan(&detector, &records).is_none());
    }

    #[test]
    fn test_successes_do_not_count() {
        let detector = BruteForceDetector::new(Duration::minutes(10), 3);
        let records = vec![
            attempt(0, "Failed"),
            attempt(1000, "OK"),
            attempt(2000, "200"),
            attempt(3000, "401"),
        ];
        assert!(scan(&detector, &records).is_none());
    }

    #[test]
    fn test_missing_status_not_a_failure() {
        let detector = BruteForceDetector::new(Duration::minutes(10), 1);
        let mut record = attempt(0, "ignored");
        record.status = None;
        assert!(scan(&detector, &[record]).is_none());
    }

    #[test]
    fn test_first_qualifying_window_wins() {
        let detector = BruteForceDetector::new(Duration::minutes(1), 2);
        let records = vec![
            attempt(0, "Failed"),
            attempt(10_000, "Failed"),
            attempt(20_000, "Failed"),
            attempt(30_000, "Failed"),
        ];
        let finding = scan(&detector, &records).unwrap();
        // All four fit in the first window, so the anchor at 0 reports 4
        assert_eq!(finding.attempts, 4);
        assert_eq!(finding.first_seen, Some(base()));
    }

    #[test]
    fn test_later_window_found_after_gap() {
        let detector = BruteForceDetector::new(Duration::minutes(1), 3);
        let records = vec![
            attempt(0, "Failed"),
            attempt(5 * 60 * 1000, "Failed"),
            attempt(5 * 60 * 1000 + 1000, "Failed"),
            attempt(5 * 60 * 1000 + 2000, "Failed"),
        ];
        let finding = scan(&detector, &records).unwrap();
        assert_eq!(finding.attempts, 3);
        assert_eq!(finding.first_seen, Some(base() + Duration::minutes(5)));
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let detector = BruteForceDetector::new(Duration::minutes(10), 3);
        let records = vec![
            attempt(2000, "Failed"),
            attempt(0, "Failed"),
            attempt(1000, "Failed"),
        ];
        let finding = scan(&detector, &records).unwrap();
        assert_eq!(finding.first_seen, Some(base()));
    }

    #[test]
    fn test_defaults() {
        let detector = BruteForceDetector::default();
        assert_eq!(detector.window(), Duration::minutes(10));
        assert_eq!(detector.attempt_threshold(), 5);
    }
}
