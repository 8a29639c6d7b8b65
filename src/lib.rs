pub mod analysis;
pub mod config;
pub mod detection;
pub mod error;
pub mod input;
pub mod models;
pub mod output;
pub mod parser;

// Re-export commonly used types
pub use analysis::Analyzer;
pub use config::{Config, ConfigError, UnresolvedTimePolicy};
pub use detection::{AnomalyDetector, DetectionError};
pub use error::LogwardenError;
pub use input::{AsyncFileSource, FileSource, InputError};
pub use models::{AnalysisReport, Findings, LogRecord};
pub use output::{OutputFormat, OutputHandler};
pub use parser::{BatchParser, LineParser, RecordNormalizer, TimestampResolver};
