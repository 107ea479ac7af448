//! Generates the synthetic shop dataset into `data/raw`.
//!
//! The binary takes no arguments; it uses the production configuration and
//! stamps every record with the time the run started.

use std::io::{self, Write};
use std::process::ExitCode;

use camino::Utf8Path;
use clap::Parser;
use mockable::DefaultClock;
use thiserror::Error;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use shop_data::output::DEFAULT_OUTPUT_DIR;
use shop_data::{
    DatasetSummary, GenerationConfig, GenerationError, OutputError, WrittenFile, generate_dataset,
    ingestion_timestamp, write_dataset,
};

/// `generate-shop-data` command arguments.
///
/// There are none beyond `--help` and `--version`.
#[derive(Debug, Parser)]
#[command(
    name = "generate-shop-data",
    about = "Generate the synthetic shop dataset into data/raw",
    version
)]
struct CliArgs {}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

fn main() -> ExitCode {
    let CliArgs {} = CliArgs::parse();
    init_tracing();
    match run() {
        Ok(files) => {
            write_banner(&files);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "dataset generation failed");
            if let Err(write_err) = writeln!(io::stderr().lock(), "error: {err}") {
                drop(write_err);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = fmt().with_env_filter(filter).try_init() {
        warn!(error = %err, "tracing init failed");
    }
}

fn run() -> Result<Vec<WrittenFile>, RunError> {
    let config = GenerationConfig::default();
    let loaded_at = ingestion_timestamp(&DefaultClock);

    let dataset = generate_dataset(&config, loaded_at)?;
    log_summary(&DatasetSummary::from_dataset(&dataset));

    Ok(write_dataset(&dataset, Utf8Path::new(DEFAULT_OUTPUT_DIR))?)
}

fn log_summary(summary: &DatasetSummary) {
    info!(
        customers = summary.customers,
        orders = summary.orders,
        sessions = summary.sessions,
        ad_performance_rows = summary.ad_performance_rows,
        total = summary.total_records(),
        "dataset generated"
    );
    for (country, count) in &summary.customers_by_country {
        info!(country = country.as_str(), count, "customers by country");
    }
    for (status, share) in &summary.orders_by_status {
        info!(
            status = status.as_str(),
            count = share.count,
            percent = %share.percent,
            "orders by status"
        );
    }
    info!(revenue = %summary.completed_revenue, "completed order revenue");
    for (source, count) in &summary.sessions_by_source {
        info!(source = source.as_str(), count, "sessions by source");
    }
    info!(
        spend = %summary.total_ad_spend,
        conversions = summary.total_conversions,
        "ad performance totals"
    );
}

fn write_banner(files: &[WrittenFile]) {
    let mut out = io::stdout().lock();
    let mut lines = vec!["Dataset generation complete:".to_owned()];
    lines.extend(
        files
            .iter()
            .map(|file| format!("  {} ({} rows)", file.path, file.rows)),
    );
    if let Err(err) = writeln!(out, "{}", lines.join("\n")) {
        drop(err);
    }
}
