//! Heuristic detectors over normalized records
//!
//! Brute-force and port-scan detection share the same per-source timeline
//! and forward-only window scan: every record is tried as a window anchor,
//! in time order, and the first qualifying window per source is reported.
//! Blacklist matching ignores time entirely.

pub mod blacklist;
pub mod brute_force;
pub mod engine;
pub mod port_scan;
pub mod timeline;

pub use blacklist::BlacklistMatcher;
pub use brute_force::{is_failure_status, BruteForceDetector};
pub use engine::AnomalyDetector;
pub use port_scan::PortScanDetector;

use thiserror::Error;

/// Errors that can end a detection run early
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("Detection cancelled after {scanned} of {total} source(s)")]
    Cancelled { scanned: usize, total: usize },
}
