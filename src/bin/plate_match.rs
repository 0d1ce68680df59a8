//! Runs one match pass over a timestamps file and prints the report as JSON.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use serde::Serialize;

use plate_match::common::{PageSegMode, PipelineConfig};
use plate_match::data::{insights, records, MatchReport};
use plate_match::match_engine::MatchEngine;

#[derive(Parser)]
#[command(name = "plate_match")]
#[command(version, about = "Match vehicle images against an approved plate list", long_about = None)]
struct Cli {
    /// Headerless `filename,timestamp` file (defaults to <BASE_DIR>/timestamps.txt)
    #[arg(value_name = "RECORDS")]
    records: Option<PathBuf>,

    /// JSON config file (defaults to the user config dir, then built-in defaults)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory the image filenames are resolved against
    #[arg(short, long)]
    base_dir: Option<PathBuf>,

    /// Path or name of the tesseract executable
    #[arg(long)]
    tesseract_cmd: Option<String>,

    /// Page segmentation mode: single_block, single_line, single_word (or 6, 7, 8)
    #[arg(long, value_parser = parse_psm)]
    psm: Option<PageSegMode>,

    /// Per-image OCR timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Maximum concurrent OCR calls
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Ignore OCR reads below this confidence (0-100)
    #[arg(long)]
    min_confidence: Option<f32>,

    /// Approved plate; repeat to replace the configured list
    #[arg(short, long = "approved", value_name = "PLATE")]
    approved: Vec<String>,

    /// Include per-hour vehicle counts in the output
    #[arg(long)]
    hourly: bool,

    /// Log per-stage timings
    #[arg(long)]
    profile: bool,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

#[derive(Serialize)]
struct Output {
    #[serde(flatten)]
    report: MatchReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    hourly_movement: Option<BTreeMap<u32, usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    hourly_matches: Option<BTreeMap<u32, usize>>,
}

fn parse_psm(value: &str) -> Result<PageSegMode, String> {
    PageSegMode::from_str(value).ok_or_else(|| {
        format!(
            "unknown mode `{value}`, expected one of {}",
            PageSegMode::all_page_seg_modes().join(", ")
        )
    })
}

fn build_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::load_default()?,
    };

    if let Some(dir) = &cli.base_dir {
        config = config.with_base_dir(dir);
    }
    if let Some(cmd) = &cli.tesseract_cmd {
        config = config.with_tesseract_cmd(cmd);
    }
    if let Some(mode) = cli.psm {
        config = config.with_page_seg_mode(mode);
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_ocr_timeout_ms(ms);
    }
    if let Some(n) = cli.workers {
        config = config.with_max_in_flight(n);
    }
    if cli.min_confidence.is_some() {
        config = config.with_min_confidence(cli.min_confidence);
    }
    if !cli.approved.is_empty() {
        config.approved_plates = cli.approved.clone();
    }
    if cli.profile {
        config = config.with_profile(true);
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let registry = config.build_registry()?;

    let records_path = cli
        .records
        .clone()
        .unwrap_or_else(|| config.base_dir.join("timestamps.txt"));
    let records = records::read_records(&records_path)?;

    let extractor = plate_match::init_extractor(&config)?;
    let engine = MatchEngine::new(&config, extractor);
    let report = plate_match::run_match(&engine, &records, &registry)
        .context("match pass aborted")?;

    let output = Output {
        hourly_movement: cli.hourly.then(|| insights::hourly_movement(&records)),
        hourly_matches: cli.hourly.then(|| insights::hourly_matches(&report.matches)),
        report,
    };
    let json = if cli.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{json}");
    Ok(())
}
