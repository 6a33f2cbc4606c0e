//! memloc Command Line Interface
//!
//! Usage:
//!   memloc [OPTIONS] <query-file>
//!   memloc --help
//!
//! Examples:
//!   memloc pairs.json                       # Intersect every pair, text report
//!   memloc --emit=json -o out.json pairs.json
//!   memloc --threshold=2 --verify pairs.json  # Tight budget, brute-force check
//!   memloc -vvv --trace pairs.json          # Dump every solution to the log

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use memloc::analysis::verify::DEFAULT_VERIFY_LIMIT;
use memloc::query::{self, QueryFile, QueryReport};
use memloc::EngineConfig;
use std::fs;
use std::path::PathBuf;

/// memloc - intersect strided memory location ranges
#[derive(Parser, Debug)]
#[command(name = "memloc")]
#[command(author = "memloc Contributors")]
#[command(version)]
#[command(about = "Intersection and difference of memory location ranges", long_about = None)]
struct Cli {
    /// Query file (JSON)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Maximum number of gap progressions per complement dimension
    #[arg(long)]
    threshold: Option<usize>,

    /// Do not compute complements
    #[arg(long)]
    no_complements: bool,

    /// Report format
    #[arg(long, default_value = "text")]
    emit: EmitKind,

    /// Check every result by brute-force enumeration
    #[arg(long)]
    verify: bool,

    /// Maximum number of bytes enumerated per location when verifying
    #[arg(long, default_value_t = DEFAULT_VERIFY_LIMIT)]
    verify_limit: u64,

    /// Log a dump of every exact solution (needs -vvv)
    #[arg(long)]
    trace: bool,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress warnings)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmitKind {
    /// Human-readable solution dumps
    Text,
    /// JSON array of reports
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.quiet {
        log::LevelFilter::Error
    } else {
        match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    info!("memloc v{}", memloc::VERSION);
    debug!("Input file: {:?}", cli.input);

    let file = query::load_queries(&cli.input)
        .with_context(|| format!("Failed to load query file: {:?}", cli.input))?;

    let config = build_config(&cli, &file);
    debug!("Engine config: {:?}", config);

    let verify_limit = cli.verify.then_some(cli.verify_limit);
    let reports = query::run_all(&file, &config, verify_limit);

    let output = match cli.emit {
        EmitKind::Text => query::render_text(&reports),
        EmitKind::Json => query::render_json(&reports).context("Failed to render report")?,
    };
    write_output(&cli.output, &output)?;

    let failed = failed_checks(&reports);
    if failed > 0 {
        bail!("{} of {} results failed verification", failed, reports.len());
    }
    Ok(())
}

fn build_config(cli: &Cli, file: &QueryFile) -> EngineConfig {
    let mut config = file.engine_config();

    // Override with CLI flags
    if let Some(threshold) = cli.threshold {
        config.threshold = threshold;
    }
    if cli.no_complements {
        config.compute_complements = false;
    }
    if cli.trace {
        config.trace = true;
    }
    config
}

fn failed_checks(reports: &[QueryReport]) -> usize {
    reports
        .iter()
        .filter(|r| {
            let failed = r.failed_verification();
            if failed {
                warn!("{} failed verification", r.name);
            }
            failed
        })
        .count()
}

fn write_output(path: &Option<PathBuf>, content: &str) -> Result<()> {
    match path {
        Some(p) => {
            fs::write(p, content)
                .with_context(|| format!("Failed to write output file: {:?}", p))?;
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
