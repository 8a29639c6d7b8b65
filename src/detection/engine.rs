use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};

use super::blacklist::BlacklistMatcher;
use super::brute_force::BruteForceDetector;
use super::port_scan::PortScanDetector;
use super::timeline::{build_timeline, group_by_source, SourceGroup};
use super::DetectionError;
use crate::config::{ConfigError, DetectionConfig, UnresolvedTimePolicy};
use crate::models::{Findings, LogRecord};

/// Runs all detectors over one batch of records
#[derive(Debug, Clone)]
pub struct AnomalyDetector {
    brute_force: BruteForceDetector,
    port_scan: PortScanDetector,
    blacklist: BlacklistMatcher,
    unresolved_time: UnresolvedTimePolicy,
}

impl AnomalyDetector {
    /// Build from configuration; fails if a threshold is missing or invalid
    pub fn new(config: &DetectionConfig) -> Result<Self, ConfigError> {
        let unique_port_threshold = config.validate()?;
        Ok(AnomalyDetector {
            brute_force: BruteForceDetector::from_config(&config.brute_force),
            port_scan: PortScanDetector::from_config(&config.port_scan, unique_port_threshold),
            blacklist: BlacklistMatcher::new(&config.blacklist),
            unresolved_time: config.unresolved_time,
        })
    }

    pub fn from_parts(
        brute_force: BruteForceDetector,
        port_scan: PortScanDetector,
        blacklist: BlacklistMatcher,
        unresolved_time: UnresolvedTimePolicy,
    ) -> Self {
        AnomalyDetector {
            brute_force,
            port_scan,
            blacklist,
            unresolved_time,
        }
    }

    /// Detect using the current time for unresolved timestamps
    pub fn detect(&self, records: &[LogRecord]) -> Findings {
        self.detect_at(records, Utc::now())
    }

    /// Detect with an explicit "now" for unresolved timestamps
    pub fn detect_at(&self, records: &[LogRecord], now: DateTime<Utc>) -> Findings {
        let groups = group_by_source(records);
        let mut findings = Findings::default();
        for group in &groups {
            self.scan_source(group, now, &mut findings);
        }
        self.finish(records, groups.len(), findings)
    }

    /// Detect, checking `cancel` before each source address is scanned
    pub fn detect_cancellable(
        &self,
        records: &[LogRecord],
        now: DateTime<Utc>,
        cancel: &AtomicBool,
    ) -> Result<Findings, DetectionError> {
        let groups = group_by_source(records);
        let total = groups.len();
        let mut findings = Findings::default();

        for (scanned, group) in groups.iter().enumerate() {
            if cancel.load(Ordering::SeqCst) {
                log::warn!("Detection cancelled after {} of {} source(s)", scanned, total);
                return Err(DetectionError::Cancelled { scanned, total });
            }
            self.scan_source(group, now, &mut findings);
        }

        Ok(self.finish(records, total, findings))
    }

    fn scan_source(&self, group: &SourceGroup<'_>, now: DateTime<Utc>, findings: &mut Findings) {
        let timeline = build_timeline(&group.records, now, self.unresolved_time);
        if let Some(finding) = self.brute_force.scan(group.ip, &timeline) {
            findings.brute_force.push(finding);
        }
        if let Some(finding) = self.port_scan.scan(group.ip, &timeline) {
            findings.port_scans.push(finding);
        }
    }

    fn finish(&self, records: &[LogRecord], sources: usize, mut findings: Findings) -> Findings {
        findings.blacklisted = self.blacklist.scan(records);

        log::debug!(
            "Scanned {} record(s) from {} source(s): {} brute force, {} port scan, {} blacklisted",
            records.len(),
            sources,
            findings.brute_force.len(),
            findings.port_scans.len(),
            findings.blacklisted.len()
        );
        findings
    }
}
