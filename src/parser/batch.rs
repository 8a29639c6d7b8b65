use super::line::LineParser;
use super::normalizer::RecordNormalizer;
use super::timestamp::TimestampResolver;
use crate::config::ParserConfig;
use crate::models::LogRecord;

/// Turns a whole log file's text into ordered records
pub struct BatchParser {
    line_parser: LineParser,
    normalizer: RecordNormalizer,
}

impl BatchParser {
    pub fn new(line_parser: LineParser, normalizer: RecordNormalizer) -> Self {
        BatchParser {
            line_parser,
            normalizer,
        }
    }

    /// Standard matcher chain with the configured aliases and reference year
    pub fn from_config(config: &ParserConfig) -> Self {
        let resolver = match config.reference_year {
            Some(year) => TimestampResolver::with_reference_year(year),
            None => TimestampResolver::new(),
        };
        BatchParser::new(
            LineParser::new(),
            RecordNormalizer::new(config.aliases.clone(), resolver),
        )
    }

    pub fn normalizer(&self) -> &RecordNormalizer {
        &self.normalizer
    }

    /// Parse every non-blank line, preserving input order
    pub fn parse(&self, text: &str) -> Vec<LogRecord> {
        let mut lines = 0usize;
        let records: Vec<LogRecord> = text
            .lines()
            .inspect(|_| lines += 1)
            .filter_map(|line| self.line_parser.parse_line(line))
            .map(|bag| self.normalizer.normalize(&bag))
            .collect();

        log::debug!(
            "Parsed {} record(s) from {} line(s), {} blank line(s) skipped",
            records.len(),
            lines,
            lines - records.len()
        );
        records
    }
}

impl Default for BatchParser {
    fn default() -> Self {
        BatchParser::new(LineParser::new(), RecordNormalizer::default())
    }
}
