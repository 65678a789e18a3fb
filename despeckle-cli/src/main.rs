//! despeckle CLI: adaptive median filtering of gray-scale image files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use serde::Serialize;

use common::log_setup::{level_for_verbosity, setup_logging};
use common::timing::{format_millis, measure};
use despeckle::batch::{run_batch, BatchOptions, BatchSummary, DEFAULT_OUTPUT_PREFIX};
use despeckle::{FilterConfig, MAX_WINDOW_RADIUS, MIN_WINDOW_RADIUS};

#[derive(Debug, Parser)]
#[command(name = "despeckle")]
#[command(
    about = "Adaptive median filter for gray-scale images. Writes a filtered copy of every input file."
)]
#[command(version)]
struct Cli {
    /// One or more gray-scale image files.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Window radius ws (1..=5); the filter window is (2*ws+1) x (2*ws+1).
    #[arg(
        short,
        long,
        default_value_t = MIN_WINDOW_RADIUS,
        value_parser = RangedU64ValueParser::<usize>::new().range(MIN_WINDOW_RADIUS as u64..=MAX_WINDOW_RADIUS as u64)
    )]
    window: usize,

    /// Adaptive threshold t (0 = plain median filter). Higher values replace fewer pixels.
    #[arg(short, long, default_value_t = 0.0, value_parser = parse_threshold)]
    threshold: f32,

    /// Print per-image details (format, color type, filter statistics).
    #[arg(short, long)]
    verbose: bool,

    /// Directory for filtered images (default: next to each input).
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Prefix of the output file names.
    #[arg(long, default_value = DEFAULT_OUTPUT_PREFIX)]
    prefix: String,

    /// Replace output files that already exist.
    #[arg(long)]
    overwrite: bool,

    /// Write a JSON report of the run to this path.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Also write logs to daily rolling files in this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn filter_config(&self) -> FilterConfig {
        FilterConfig::new(self.window, self.threshold)
    }

    fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            output_dir: self.output_dir.clone(),
            prefix: self.prefix.clone(),
            overwrite: self.overwrite,
        }
    }
}

fn parse_threshold(s: &str) -> std::result::Result<f32, String> {
    let value: f32 = s
        .trim()
        .parse()
        .map_err(|e| format!("invalid threshold '{}': {}", s, e))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!(
            "threshold must be a finite number >= 0, got {}",
            value
        ));
    }
    Ok(value)
}

#[derive(Serialize)]
struct RunReport<'a> {
    config: &'a FilterConfig,
    #[serde(flatten)]
    summary: &'a BatchSummary,
}

fn write_report(path: &Path, config: &FilterConfig, summary: &BatchSummary) -> Result<()> {
    let report = RunReport { config, summary };
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report {}", path.display()))?;
    tracing::info!("Report written to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(level_for_verbosity(cli.verbose), cli.log_dir.as_deref())?;

    let config = cli.filter_config();
    let options = cli.batch_options();

    tracing::debug!(
        window_radius = config.window_radius,
        window = %format!("{0}x{0}", config.window_side()),
        threshold = config.threshold,
        output_dir = ?options.output_dir,
        prefix = %options.prefix,
        debug_build = common::is_debug(),
        "Options"
    );

    let (summary, elapsed) = measure(|| run_batch(&cli.files, &config, &options));
    let summary = summary.context("Invalid filter parameters")?;

    println!("{} image(s) filtered.", summary.filtered_count());
    tracing::info!(
        filtered = summary.filtered_count(),
        skipped = summary.skipped.len(),
        replaced = summary.total_replaced(),
        elapsed = %format_millis(elapsed),
        "Batch finished"
    );

    if let Some(report_path) = &cli.report {
        write_report(report_path, &config, &summary)?;
    }

    Ok(())
}
