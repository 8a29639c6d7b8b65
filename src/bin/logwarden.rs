use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use structopt::StructOpt;

use logwarden::config::Config;
use logwarden::input::FileSource;
use logwarden::output::{OutputFormat, OutputHandler};
use logwarden::{Analyzer, LogwardenError};

/// Security log analyzer command line interface
#[derive(StructOpt, Debug)]
#[structopt(name = "logwarden", about = "Normalize security logs and flag brute force, port scans and blacklisted sources")]
pub enum Cli {
    /// Parse a log file and report anomalies
    Analyze {
        /// Path to log file
        #[structopt(short, long)]
        file: PathBuf,
        /// Path to configuration file
        #[structopt(short, long)]
        config: Option<PathBuf>,
        /// Distinct ports within the port-scan window that raise a finding
        #[structopt(long)]
        port_scan_threshold: Option<usize>,
        /// Output format: json, jsonl or console
        #[structopt(long)]
        format: Option<String>,
        /// Write the report to this file instead of stdout
        #[structopt(short, long)]
        output: Option<PathBuf>,
        /// Number of records to list in console output
        #[structopt(short = "n", long, default_value = "10")]
        show: usize,
    },
    /// Generate a default configuration file
    Config {
        /// Output path for the configuration file
        #[structopt(short, long, default_value = "logwarden.toml")]
        output: PathBuf,
        /// Distinct ports within the port-scan window that raise a finding
        #[structopt(long)]
        port_scan_threshold: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::from_args() {
        Cli::Analyze {
            file,
            config,
            port_scan_threshold,
            format,
            output,
            show,
        } => {
            let mut config = match config {
                Some(path) => Config::from_file(&path)?,
                None => Config::default(),
            };
            if let Some(threshold) = port_scan_threshold {
                config.detection.port_scan.unique_port_threshold = Some(threshold);
            }
            if let Some(format) = format {
                config.output.format = format;
            }
            if let Some(path) = output {
                config.output.file_path = Some(path);
            }

            if let Err(e) = analyze(&file, &config, show) {
                log::error!("{}", e);
                std::process::exit(1);
            }
        }
        Cli::Config {
            output,
            port_scan_threshold,
        } => {
            let config = Config::new(port_scan_threshold);
            config.to_file(&output)?;
            println!("Default configuration written to: {:?}", output);
        }
    }

    Ok(())
}

fn analyze(file: &Path, config: &Config, show: usize) -> Result<(), LogwardenError> {
    let analyzer = Analyzer::new(config)?;

    // Ctrl+C stops the scan between source addresses
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("Received interrupt, stopping analysis...");
        flag.store(true, Ordering::SeqCst);
    }) {
        log::warn!("Could not install interrupt handler: {}", e);
    }

    let source = FileSource::new(file);
    let text = source.read_text()?;
    log::info!("Analyzing {:?}", source.path());

    let report = analyzer.analyze_cancellable(&text, &cancel)?;
    log::info!(
        "Parsed {} record(s); {} finding(s)",
        report.summary.total_records,
        report.findings.total()
    );

    let format = OutputFormat::from_name(&config.output.format);
    let mut output = OutputHandler::new(format, config.output.file_path.clone())?.with_preview(show);
    output.write_report(&report)?;
    output.flush()?;
    Ok(())
}
