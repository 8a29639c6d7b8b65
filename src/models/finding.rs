use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::LogRecord;

/// Repeated authentication failures from one source inside a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BruteForceFinding {
    pub ip: String,
    pub attempts: usize,
    /// Anchor time of the qualifying window
    pub first_seen: Option<DateTime<Utc>>,
}

/// Many distinct destination ports touched by one source inside a window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortScanFinding {
    pub ip: String,
    pub unique_ports: usize,
    /// Up to ten of the ports seen, ascending
    pub sample_ports: Vec<u16>,
    pub first_seen: Option<DateTime<Utc>>,
}

/// Occurrences of a blacklisted source address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlacklistFinding {
    pub ip: String,
    pub count: usize,
}

/// All findings of one detection run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Findings {
    pub brute_force: Vec<BruteForceFinding>,
    pub port_scans: Vec<PortScanFinding>,
    pub blacklisted: Vec<BlacklistFinding>,
}

impl Findings {
    pub fn total(&self) -> usize {
        self.brute_force.len() + self.port_scans.len() + self.blacklisted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total_records: usize,
    pub brute_force: usize,
    pub port_scans: usize,
    pub blacklisted: usize,
}

/// Result of parsing and analyzing one batch of log text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub summary: Summary,
    pub records: Vec<LogRecord>,
    pub findings: Findings,
}

impl AnalysisReport {
    pub fn new(records: Vec<LogRecord>, findings: Findings) -> Self {
        let summary = Summary {
            total_records: records.len(),
            brute_force: findings.brute_force.len(),
            port_scans: findings.port_scans.len(),
            blacklisted: findings.blacklisted.len(),
        };
        AnalysisReport {
            summary,
            records,
            findings,
        }
    }
}
