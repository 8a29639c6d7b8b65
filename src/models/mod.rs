pub mod finding;
pub mod record;

pub use finding::{
    AnalysisReport, BlacklistFinding, BruteForceFinding, Findings, PortScanFinding, Summary,
};
pub use record::{FieldBag, FieldValue, LogRecord, UNKNOWN_SOURCE};
