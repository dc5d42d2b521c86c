//! Document Safety Checker - Command Line Interface
//!
//! Inspects a batch of uploaded files of one declared family and reports
//! which of them may be kept. Accepted files can be copied to an output
//! directory; rejected ones are never written anywhere.

use std::path::PathBuf;
use std::process;

use clap::{Arg, ArgAction, Command};
use docguard::utils::{init_logging, LogLevel};
use docguard::{BatchRunner, DocumentFamily, Inspector, ReportFormat, ReportFormatter, ScanConfig};
use tracing::{error, info};

const EXIT_ACCEPTED: i32 = 0;
const EXIT_USAGE: i32 = 1;
const EXIT_REJECTED: i32 = 2;

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let log_level = matches.get_one::<LogLevel>("verbose").copied().unwrap_or(LogLevel::Info);
    if let Err(e) = init_logging(log_level) {
        eprintln!("{}", e);
        process::exit(EXIT_USAGE);
    }

    let family = match matches.get_one::<String>("type").map(|tag| tag.parse::<DocumentFamily>()) {
        Some(Ok(family)) => family,
        Some(Err(e)) => {
            error!("{}", e);
            process::exit(EXIT_USAGE);
        }
        None => {
            error!("--type is required");
            process::exit(EXIT_USAGE);
        }
    };

    // Load configuration
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => match ScanConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load config file {}: {}", path.display(), e);
                process::exit(EXIT_USAGE);
            }
        },
        None => ScanConfig::default(),
    };

    // Override config with CLI arguments
    if let Some(workers) = matches.get_one::<usize>("workers") {
        config.workers = *workers;
    }
    if let Err(e) = config.validate() {
        error!("{}", e);
        process::exit(EXIT_USAGE);
    }

    let output_dir = matches.get_one::<PathBuf>("output-dir").cloned();
    if let Some(dir) = &output_dir {
        if !dir.is_dir() {
            error!("Output directory does not exist: {}", dir.display());
            process::exit(EXIT_USAGE);
        }
    }

    let inputs: Vec<PathBuf> = matches
        .get_many::<PathBuf>("files")
        .map(|files| files.cloned().collect())
        .unwrap_or_default();

    info!("Inspecting {} file(s) as {}", inputs.len(), family);
    let runner = BatchRunner::new(Inspector::new(family, &config), config.workers, output_dir);
    let report = match runner.run(inputs).await {
        Ok(report) => report,
        Err(e) => {
            error!("Batch failed: {}", e);
            process::exit(EXIT_USAGE);
        }
    };

    // Callers see one uniform outcome per file
    for entry in &report.entries {
        let outcome = if entry.accepted { "accepted" } else { "rejected" };
        match &entry.sha256 {
            Some(digest) => println!("{}\t{}\t{}", entry.path.display(), outcome, digest),
            None => println!("{}\t{}", entry.path.display(), outcome),
        }
    }

    if let Some(report_path) = matches.get_one::<PathBuf>("report") {
        let format = matches.get_one::<ReportFormat>("format").copied().unwrap_or(ReportFormat::Text);
        match ReportFormatter::write(&report, format, report_path) {
            Ok(()) => info!("Report written to {}", report_path.display()),
            Err(e) => {
                error!("Failed to write report: {}", e);
                process::exit(EXIT_USAGE);
            }
        }
    }

    process::exit(if report.all_accepted() { EXIT_ACCEPTED } else { EXIT_REJECTED });
}

fn build_cli() -> Command {
    Command::new("docguard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Classifies uploaded documents as safe or unsafe and sanitizes images")
        .long_about(
            "Checks office documents for macros and embedded objects, PDFs for scripts and \
             attached files, and rewrites images through a lossy round-trip that destroys \
             hidden payloads. Every failure is reported as a plain rejection.",
        )
        // Input
        .arg(
            Arg::new("type")
                .short('t')
                .long("type")
                .value_name("FAMILY")
                .required(true)
                .help("Declared family: excel, word, powerpoint, pdf or image"),
        )
        .arg(
            Arg::new("files")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .num_args(1..)
                .required(true)
                .help("Files to inspect"),
        )
        // Configuration
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Configuration file (JSON/YAML)"),
        )
        .arg(
            Arg::new("workers")
                .short('w')
                .long("workers")
                .value_name("N")
                .value_parser(clap::value_parser!(usize))
                .help("Number of files inspected concurrently"),
        )
        // Output and reporting
        .arg(
            Arg::new("output-dir")
                .short('o')
                .long("output-dir")
                .value_name("DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Directory receiving accepted (and sanitized) files"),
        )
        .arg(
            Arg::new("report")
                .short('r')
                .long("report")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("Write a scan report"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_parser(clap::value_parser!(ReportFormat))
                .default_value("text")
                .help("Report format"),
        )
        // Logging
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .value_parser(clap::value_parser!(LogLevel))
                .default_value("info")
                .action(ArgAction::Set)
                .help("Set logging verbosity"),
        )
}
