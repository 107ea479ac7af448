//! Loads the generated shop dataset into the warehouse.
//!
//! Settings come from `WAREHOUSE_*` variables, optionally seeded by a `.env`
//! file. The binary takes no arguments.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use mockable::DefaultClock;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use shop_data::ingestion_timestamp;
use warehouse_loader::{LoadError, LoadReport, PostgresWarehouseSink, WarehouseSettings};

/// `load-to-warehouse` command arguments.
///
/// There are none beyond `--help` and `--version`.
#[derive(Debug, Parser)]
#[command(
    name = "load-to-warehouse",
    about = "Load the generated shop dataset into the warehouse",
    version
)]
struct CliArgs {}

fn main() -> ExitCode {
    let CliArgs {} = CliArgs::parse();
    init_tracing();
    match run() {
        Ok(report) => {
            write_banner(&report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "warehouse load failed");
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

fn run() -> Result<LoadReport, LoadError> {
    let settings = WarehouseSettings::load()?;
    let credentials = settings.credentials()?;
    let data_dir = settings.data_dir();
    let loaded_at = ingestion_timestamp(&DefaultClock);
    info!(data_dir = %data_dir, %loaded_at, "starting warehouse load");

    let report = warehouse_loader::load_warehouse(&data_dir, loaded_at, || {
        PostgresWarehouseSink::connect(&credentials)
    })?;

    for table in &report.tables {
        info!(
            table = %table.table,
            submitted = table.submitted,
            verified = table.verified,
            "table loaded"
        );
    }
    Ok(report)
}

fn write_banner(report: &LoadReport) {
    let mut out = io::stdout().lock();
    let mut lines = vec![format!(
        "Warehouse load complete ({} rows, loaded at {}):",
        report.total_rows(),
        report.loaded_at
    )];
    lines.extend(
        report
            .tables
            .iter()
            .map(|table| format!("  {} ({} rows)", table.table, table.verified)),
    );
    if let Err(err) = writeln!(out, "{}", lines.join("\n")) {
        drop(err);
    }
}
