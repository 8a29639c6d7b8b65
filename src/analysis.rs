//! Parse-and-detect pipeline over one batch of log text.

use chrono::{DateTime, Utc};
use std::sync::atomic::AtomicBool;

use crate::config::{Config, ConfigError};
use crate::detection::{AnomalyDetector, DetectionError};
use crate::input::{decode, InputError};
use crate::models::AnalysisReport;
use crate::parser::BatchParser;

/// Parses log text and runs every detector over the resulting records
pub struct Analyzer {
    parser: BatchParser,
    detector: AnomalyDetector,
}

impl Analyzer {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Analyzer {
            parser: BatchParser::from_config(&config.parser),
            detector: AnomalyDetector::new(&config.detection)?,
        })
    }

    pub fn from_parts(parser: BatchParser, detector: AnomalyDetector) -> Self {
        Analyzer { parser, detector }
    }

    pub fn parser(&self) -> &BatchParser {
        &self.parser
    }

    pub fn detector(&self) -> &AnomalyDetector {
        &self.detector
    }

    pub fn analyze(&self, text: &str) -> AnalysisReport {
        self.analyze_at(text, Utc::now())
    }

    /// Analyze with an explicit "now" for records whose time is unresolved
    pub fn analyze_at(&self, text: &str, now: DateTime<Utc>) -> AnalysisReport {
        let records = self.parser.parse(text);
        let findings = self.detector.detect_at(&records, now);
        AnalysisReport::new(records, findings)
    }

    /// Analyze raw bytes; fails only if they are not valid UTF-8
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<AnalysisReport, InputError> {
        let text = decode(bytes)?;
        Ok(self.analyze(text))
    }

    /// Analyze, stopping between source addresses once `cancel` is raised
    pub fn analyze_cancellable(
        &self,
        text: &str,
        cancel: &AtomicBool,
    ) -> Result<AnalysisReport, DetectionError> {
        let records = self.parser.parse(text);
        let findings = self.detector.detect_cancellable(&records, Utc::now(), cancel)?;
        Ok(AnalysisReport::new(records, findings))
    }
}
