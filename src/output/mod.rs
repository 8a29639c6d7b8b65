use crate::models::{
    AnalysisReport, BlacklistFinding, BruteForceFinding, PortScanFinding, Summary,
};
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while writing a report
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Output handler for analysis reports
pub struct OutputHandler {
    format: OutputFormat,
    writer: Option<Box<dyn Write + Send>>,
    preview: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Jsonl,
    Console,
}

impl OutputFormat {
    pub fn from_name(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "jsonl" => OutputFormat::Jsonl,
            "console" => OutputFormat::Console,
            other => {
                log::warn!("Unknown output format '{}', using console", other);
                OutputFormat::Console
            }
        }
    }
}

/// One JSON line per summary or finding
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum ReportLine<'a> {
    Summary(&'a Summary),
    BruteForce(&'a BruteForceFinding),
    PortScan(&'a PortScanFinding),
    Blacklisted(&'a BlacklistFinding),
}

impl OutputHandler {
    /// Create a handler writing to `file_path`, or stdout when absent
    pub fn new(format: OutputFormat, file_path: Option<PathBuf>) -> Result<Self, OutputError> {
        let writer: Option<Box<dyn Write + Send>> = match file_path {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(path)?;
                Some(Box::new(BufWriter::new(file)))
            }
            None => None,
        };

        Ok(OutputHandler {
            format,
            writer,
            preview: 10,
        })
    }

    /// Handler writing to an arbitrary sink
    pub fn with_writer(format: OutputFormat, writer: Box<dyn Write + Send>) -> Self {
        OutputHandler {
            format,
            writer: Some(writer),
            preview: 10,
        }
    }

    /// Number of records listed by the console format
    pub fn with_preview(mut self, preview: usize) -> Self {
        self.preview = preview;
        self
    }

    /// Write an analysis report
    pub fn write_report(&mut self, report: &AnalysisReport) -> Result<(), OutputError> {
        match self.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(report)?;
                self.write_output(&format!("{}\n", json))?;
            }
            OutputFormat::Jsonl => {
                let mut lines = vec![serde_json::to_string(&ReportLine::Summary(&report.summary))?];
                for finding in &report.findings.brute_force {
                    lines.push(serde_json::to_string(&ReportLine::BruteForce(finding))?);
                }
                for finding in &report.findings.port_scans {
                    lines.push(serde_json::to_string(&ReportLine::PortScan(finding))?);
                }
                for finding in &report.findings.blacklisted {
                    lines.push(serde_json::to_string(&ReportLine::Blacklisted(finding))?);
                }
                self.write_output(&format!("{}\n", lines.join("\n")))?;
            }
            OutputFormat::Console => {
                let output = render_console(report, self.preview);
                self.write_output(&output)?;
            }
        }
        Ok(())
    }

    fn write_output(&mut self, data: &str) -> Result<(), OutputError> {
        match &mut self.writer {
            Some(writer) => {
                writer.write_all(data.as_bytes())?;
                writer.flush()?;
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(data.as_bytes())?;
                stdout.flush()?;
            }
        }
        Ok(())
    }

    /// Flush any buffered output
    pub fn flush(&mut self) -> Result<(), OutputError> {
        if let Some(writer) = &mut self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

fn format_time(time: Option<chrono::DateTime<chrono::Utc>>) -> String {
    time.map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "unresolved".to_string())
}

fn render_console(report: &AnalysisReport, preview: usize) -> String {
    let summary = &report.summary;
    let mut out = format!(
        "Records: {}\nBrute force: {}\nPort scans: {}\nBlacklisted: {}\n",
        summary.total_records, summary.brute_force, summary.port_scans, summary.blacklisted
    );

    for f in &report.findings.brute_force {
        out.push_str(&format!(
            "[Brute Force] {} - {} failed attempt(s), first seen {}\n",
            f.ip,
            f.attempts,
            format_time(f.first_seen)
        ));
    }
    for f in &report.findings.port_scans {
        let sample: Vec<String> = f.sample_ports.iter().map(|p| p.to_string()).collect();
        out.push_str(&format!(
            "[Port Scan] {} - {} distinct port(s) ({}), first seen {}\n",
            f.ip,
            f.unique_ports,
            sample.join(", "),
            format_time(f.first_seen)
        ));
    }
    for f in &report.findings.blacklisted {
        out.push_str(&format!("[Blacklisted] {} - {} occurrence(s)\n", f.ip, f.count));
    }

    let shown = preview.min(report.records.len());
    if shown > 0 {
        out.push_str(&format!("\nFirst {} of {} record(s):\n", shown, report.records.len()));
        for r in report.records.iter().take(shown) {
            out.push_str(&format!(
                "  {} -> {} | {} | {} | port {} | {}\n",
                r.source_ip.as_deref().unwrap_or("-"),
                r.dest_ip.as_deref().unwrap_or("-"),
                r.raw_time.as_deref().unwrap_or("-"),
                r.status.as_deref().unwrap_or("-"),
                r.port.map_or_else(|| "-".to_string(), |p| p.to_string()),
                r.request.as_deref().unwrap_or(&r.raw)
            ));
        }
    }
    out
}
