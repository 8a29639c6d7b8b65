//! Log text parsing: line classification, normalization and timestamp
//! resolution, stitched together by the batch parser.

pub mod batch;
pub mod line;
pub mod normalizer;
pub mod timestamp;

pub use batch::BatchParser;
pub use line::{FormatMatcher, LineParser};
pub use normalizer::RecordNormalizer;
pub use timestamp::TimestampResolver;
