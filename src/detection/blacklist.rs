use std::collections::HashMap;

use crate::models::{BlacklistFinding, LogRecord};

/// Counts occurrences of known-bad source addresses
#[derive(Debug, Clone, Default)]
pub struct BlacklistMatcher {
    addresses: Vec<String>,
}

impl BlacklistMatcher {
    /// Build from a list of addresses; blanks and duplicates are dropped
    pub fn new<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for address in addresses {
            let address = address.as_ref().trim();
            if !address.is_empty() && !unique.iter().any(|a| a == address) {
                unique.push(address.to_string());
            }
        }
        BlacklistMatcher { addresses: unique }
    }

    pub fn addresses(&self) -> &[String] {
        &self.addresses
    }

    /// One finding per blacklisted address seen at least once, in blacklist order
    pub fn scan(&self, records: &[LogRecord]) -> Vec<BlacklistFinding> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for ip in records.iter().filter_map(|r| r.source_ip.as_deref()) {
            *counts.entry(ip).or_insert(0) += 1;
        }

        self.addresses
            .iter()
            .filter_map(|address| {
                counts.get(address.as_str()).map(|&count| BlacklistFinding {
                    ip: address.clone(),
                    count,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from(ip: Option<&str>) -> LogRecord {
        LogRecord {
            source_ip: ip.map(str::to_string),
            dest_ip: None,
            raw_time: None,
            parsed_time: None,
            request: None,
            status: None,
            port: None,
            raw: "line".to_string(),
        }
    }

    #[test]
    fn test_counts_literal_occurrences() {
        let matcher = BlacklistMatcher::new(["203.0.113.45", "198.51.100.23", "192.0.2.1"]);
        let records = vec![
            from(Some("198.51.100.23")),
            from(Some("203.0.113.45")),
            from(Some("10.0.0.1")),
            from(None),
            from(Some("203.0.113.45")),
            from(Some("203.0.113.45")),
        ];

        assert_eq!(
            matcher.scan(&records),
            vec![
                BlacklistFinding { ip: "203.0.113.45".to_string(), count: 3 },
                BlacklistFinding { ip: "198.51.100.23".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_no_match_no_finding() {
        let matcher = BlacklistMatcher::new(["203.0.113.45"]);
        assert!(matcher.scan(&[from(Some("10.0.0.1")), from(None)]).is_empty());
        assert!(matcher.scan(&[]).is_empty());
    }

    #[test]
    fn test_exact_match_only() {
        let matcher = BlacklistMatcher::new(["10.0.0.1"]);
        assert!(matcher.scan(&[from(Some("10.0.0.10"))]).is_empty());
    }

    #[test]
    fn test_duplicates_and_blanks_dropped() {
        let matcher = BlacklistMatcher::new(vec![" 10.0.0.1 ", "10.0.0.1", "", "10.0.0.2"]);
        assert_eq!(matcher.addresses(), ["10.0.0.1", "10.0.0.2"]);
        assert_eq!(matcher.scan(&[from(Some("10.0.0.1"))]).len(), 1);
    }
}
