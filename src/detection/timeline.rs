//! Per-source grouping and time ordering shared by the windowed detectors.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

use crate::config::UnresolvedTimePolicy;
use crate::models::LogRecord;

/// Records of one source address, in input order
#[derive(Debug)]
pub struct SourceGroup<'a> {
    pub ip: &'a str,
    pub records: Vec<&'a LogRecord>,
}

/// A record placed on its source's timeline
#[derive(Debug, Clone, Copy)]
pub struct TimedRecord<'a> {
    pub at: DateTime<Utc>,
    pub record: &'a LogRecord,
}

/// Group records by source address, ordered by first appearance
///
/// Records without an address all land in the `unknown` group.
pub fn group_by_source(records: &[LogRecord]) -> Vec<SourceGroup<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<SourceGroup<'_>> = Vec::new();

    for record in records {
        let ip = record.source_key();
        let slot = *index.entry(ip).or_insert_with(|| {
            groups.push(SourceGroup {
                ip,
                records: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].records.push(record);
    }

    groups
}

/// Order a group's records by time
///
/// The sort is stable, so records sharing an instant keep input order.
pub fn build_timeline<'a>(
    records: &[&'a LogRecord],
    now: DateTime<Utc>,
    policy: UnresolvedTimePolicy,
) -> Vec<TimedRecord<'a>> {
    let mut timeline: Vec<TimedRecord<'a>> = records
        .iter()
        .filter_map(|&record| match (record.parsed_time, policy) {
            (Some(at), _) => Some(TimedRecord { at, record }),
            (None, UnresolvedTimePolicy::TreatAsNow) => Some(TimedRecord { at: now, record }),
            (None, UnresolvedTimePolicy::Exclude) => None,
        })
        .collect();
    timeline.sort_by_key(|entry| entry.at);
    timeline
}

/// Window length from configured seconds, saturating on overflow
pub fn window_from_seconds(seconds: i64) -> Duration {
    Duration::try_seconds(seconds).unwrap_or(Duration::MAX)
}

/// Exclusive end index of the window anchored at `start`
///
/// An entry is inside when it is at most `window` after the anchor.
pub fn window_end(timeline: &[TimedRecord<'_>], start: usize, window: Duration) -> usize {
    let anchor = timeline[start].at;
    timeline[start..]
        .iter()
        .position(|entry| entry.at - anchor > window)
        .map_or(timeline.len(), |offset| start + offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(ip: Option<&str>, at: Option<DateTime<Utc>>, raw: &str) -> LogRecord {
        LogRecord {
            source_ip: ip.map(str::to_string),
            dest_ip: None,
            raw_time: at.map(|t| t.to_rfc3339()),
            parsed_time: at,
            request: None,
            status: None,
            port: None,
            raw: raw.to_string(),
        }
    }

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_groups_in_first_appearance_order() {
        let records = vec![
            record(Some("2.2.2.2"), None, "a"),
            record(None, None, "b"),
            record(Some("1.1.1.1"), None, "c"),
            record(Some("2.2.2.2"), None, "d"),
            record(None, None, "e"),
        ];
        let groups = group_by_source(&records);

        let ips: Vec<&str> = groups.iter().map(|g| g.ip).collect();
        assert_eq!(ips, vec!["2.2.2.2", "unknown", "1.1.1.1"]);
        assert_eq!(groups[0].records.len(), 2);
        assert_eq!(groups[1].records[1].raw, "e");
    }

    #[test]
    fn test_unresolved_sorts_as_now() {
        let now = t(1000);
        let records = vec![
            record(Some("1.1.1.1"), None, "unresolved-1"),
            record(Some("1.1.1.1"), Some(t(50)), "late"),
            record(Some("1.1.1.1"), None, "unresolved-2"),
            record(Some("1.1.1.1"), Some(t(10)), "early"),
        ];
        let refs: Vec<&LogRecord> = records.iter().collect();
        let timeline = build_timeline(&refs, now, UnresolvedTimePolicy::TreatAsNow);

        let order: Vec<&str> = timeline.iter().map(|e| e.record.raw.as_str()).collect();
        assert_eq!(order, vec!["early", "late", "unresolved-1", "unresolved-2"]);
        assert_eq!(timeline[2].at, now);
        assert_eq!(timeline[3].at, now);
    }

    #[test]
    fn test_unresolved_excluded() {
        let records = vec![
            record(Some("1.1.1.1"), None, "unresolved"),
            record(Some("1.1.1.1"), Some(t(10)), "resolved"),
        ];
        let refs: Vec<&LogRecord> = records.iter().collect();
        let timeline = build_timeline(&refs, t(1000), UnresolvedTimePolicy::Exclude);

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].record.raw, "resolved");
    }

    #[test]
    fn test_window_end_is_inclusive_of_boundary() {
        let records = vec![
            record(None, Some(t(0)), "a"),
            record(None, Some(t(60)), "b"),
            record(None, Some(t(61)), "c"),
            record(None, Some(t(200)), "d"),
        ];
        let refs: Vec<&LogRecord> = records.iter().collect();
        let timeline = build_timeline(&refs, t(1000), UnresolvedTimePolicy::TreatAsNow);

        assert_eq!(window_end(&timeline, 0, Duration::seconds(60)), 2);
        assert_eq!(window_end(&timeline, 1, Duration::seconds(60)), 3);
        assert_eq!(window_end(&timeline, 3, Duration::seconds(60)), 4);
        assert_eq!(window_end(&timeline, 0, Duration::seconds(1000)), 4);
    }
}
