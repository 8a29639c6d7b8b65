//! Port scan detection
//!
//! Looks for a single source touching many distinct destination ports inside
//! a short window. Only records that carry a port take part.

use chrono::Duration;
use std::collections::BTreeSet;

use super::timeline::{window_end, window_from_seconds, TimedRecord};
use crate::config::PortScanConfig;
use crate::models::PortScanFinding;

const SAMPLE_PORTS: usize = 10;

/// Detects many distinct ports probed by one source
#[derive(Debug, Clone)]
pub struct PortScanDetector {
    window: Duration,
    unique_port_threshold: usize,
}

impl PortScanDetector {
    pub fn new(window: Duration, unique_port_threshold: usize) -> Self {
        PortScanDetector {
            window,
            unique_port_threshold,
        }
    }

    /// Build from configuration whose threshold has already been validated
    pub fn from_config(config: &PortScanConfig, unique_port_threshold: usize) -> Self {
        Self::new(window_from_seconds(config.window_seconds), unique_port_threshold)
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn unique_port_threshold(&self) -> usize {
        self.unique_port_threshold
    }

    /// Scan one source's time-ordered records for a qualifying window
    pub fn scan(&self, ip: &str, timeline: &[TimedRecord<'_>]) -> Option<PortScanFinding> {
        let with_ports: Vec<TimedRecord<'_>> = timeline
            .iter()
            .filter(|entry| entry.record.port.is_some())
            .copied()
            .collect();

        for start in 0..with_ports.len() {
            let end = window_end(&with_ports, start, self.window);
            let ports: BTreeSet<u16> = with_ports[start..end]
                .iter()
                .filter_map(|entry| entry.record.port)
                .collect();

            if ports.len() >= self.unique_port_threshold {
                log::debug!(
                    "Port scan from {}: {} distinct port(s) within {}s (threshold: {})",
                    ip,
                    ports.len(),
                    self.window.num_seconds(),
                    self.unique_port_threshold
                );
                return Some(PortScanFinding {
                    ip: ip.to_string(),
                    unique_ports: ports.len(),
                    sample_ports: ports.iter().copied().take(SAMPLE_PORTS).collect(),
                    first_seen: with_ports[start].record.parsed_time,
                });
            }
        }
        None
    }
}
