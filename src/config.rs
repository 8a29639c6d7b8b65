use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading, saving or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(
        "Port-scan unique-port threshold is not configured \
         (set detection.port_scan.unique_port_threshold or pass --port-scan-threshold)"
    )]
    MissingPortScanThreshold,

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Configuration for a logwarden analysis run
///
/// There is deliberately no built-in port-scan threshold: `Config::default()`
/// leaves it unset and analysis refuses to start until one is supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Line parsing configuration
    #[serde(default)]
    pub parser: ParserConfig,
    /// Detection rules configuration
    #[serde(default)]
    pub detection: DetectionConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Line parsing configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Year assumed for syslog timestamps, which carry none (default: current year)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_year: Option<i32>,
    /// Field-name aliases for each canonical record field
    #[serde(default)]
    pub aliases: AliasTable,
}

/// Field-name aliases, in priority order, for each canonical record field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasTable {
    pub source_ip: Vec<String>,
    pub dest_ip: Vec<String>,
    pub time: Vec<String>,
    pub request: Vec<String>,
    pub status: Vec<String>,
    pub port: Vec<String>,
    pub raw: Vec<String>,
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for AliasTable {
    fn default() -> Self {
        AliasTable {
            source_ip: names(&["srcIP", "ip", "client", "src", "source"]),
            dest_ip: names(&["destIP", "dst", "destination", "server", "dest"]),
            time: names(&["time", "timestamp", "ts", "date"]),
            request: names(&["request", "method", "msg"]),
            status: names(&["status", "code", "result"]),
            port: names(&["port", "destination_port"]),
            raw: names(&["raw"]),
        }
    }
}

/// How windowed detectors treat records whose time could not be resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedTimePolicy {
    /// Use the detection run's "now" instant
    #[default]
    TreatAsNow,
    /// Leave the record out of brute-force and port-scan windows
    Exclude,
}

/// Detection rules configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Known-bad source addresses
    #[serde(default = "default_blacklist")]
    pub blacklist: Vec<String>,
    #[serde(default)]
    pub unresolved_time: UnresolvedTimePolicy,
    #[serde(default)]
    pub brute_force: BruteForceConfig,
    #[serde(default)]
    pub port_scan: PortScanConfig,
}

fn default_blacklist() -> Vec<String> {
    names(&["203.0.113.45", "198.51.100.23"])
}

impl Default for DetectionConfig {
    fn default() -> Self {
        DetectionConfig {
            blacklist: default_blacklist(),
            unresolved_time: UnresolvedTimePolicy::default(),
            brute_force: BruteForceConfig::default(),
            port_scan: PortScanConfig::default(),
        }
    }
}

/// Brute-force detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BruteForceConfig {
    /// Time window in seconds (default: 600 = 10 minutes)
    pub window_seconds: i64,
    /// Failed attempts within the window that raise a finding
    pub attempt_threshold: usize,
}

impl Default for BruteForceConfig {
    fn default() -> Self {
        BruteForceConfig {
            window_seconds: 600,
            attempt_threshold: 5,
        }
    }
}

/// Port-scan detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortScanConfig {
    /// Time window in seconds (default: 300 = 5 minutes)
    #[serde(default = "default_port_scan_window")]
    pub window_seconds: i64,
    /// Distinct ports within the window that raise a finding (required)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_port_threshold: Option<usize>,
}

fn default_port_scan_window() -> i64 {
    300
}

impl Default for PortScanConfig {
    fn default() -> Self {
        PortScanConfig {
            window_seconds: default_port_scan_window(),
            unique_port_threshold: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: "json", "jsonl", or "console"
    pub format: String,
    /// Output file path (stdout when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            format: "console".to_string(),
            file_path: None,
        }
    }
}

impl Config {
    /// Default configuration with the given port-scan threshold
    pub fn new(unique_port_threshold: usize) -> Self {
        let mut config = Config::default();
        config.detection.port_scan.unique_port_threshold = Some(unique_port_threshold);
        config
    }

    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }
}

impl DetectionConfig {
    /// Check thresholds and windows; returns the port-scan threshold
    pub fn validate(&self) -> Result<usize, ConfigError> {
        if self.brute_force.window_seconds < 0 {
            return Err(ConfigError::InvalidValue {
                field: "detection.brute_force.window_seconds",
                reason: format!("must not be negative, got {}", self.brute_force.window_seconds),
            });
        }
        if self.brute_force.attempt_threshold == 0 {
            return Err(ConfigError::InvalidValue {
                field: "detection.brute_force.attempt_threshold",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.port_scan.window_seconds < 0 {
            return Err(ConfigError::InvalidValue {
                field: "detection.port_scan.window_seconds",
                reason: format!("must not be negative, got {}", self.port_scan.window_seconds),
            });
        }
        match self.port_scan.unique_port_threshold {
            None => Err(ConfigError::MissingPortScanThreshold),
            Some(0) => Err(ConfigError::InvalidValue {
                field: "detection.port_scan.unique_port_threshold",
                reason: "must be at least 1".to_string(),
            }),
            Some(threshold) => Ok(threshold),
        }
    }
}
