//! CSV persistence for a generated [`ShopDataset`].

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use serde::Serialize;
use tracing::info;

use crate::atomic_io::write_atomic;
use crate::error::OutputError;
use crate::generator::ShopDataset;

/// File holding the customer collection.
pub const CUSTOMERS_FILE: &str = "shopify_customers.csv";
/// File holding the order collection.
pub const ORDERS_FILE: &str = "shopify_orders.csv";
/// File holding the session collection.
pub const SESSIONS_FILE: &str = "google_analytics_sessions.csv";
/// File holding the ad-performance collection.
pub const AD_PERFORMANCE_FILE: &str = "facebook_ads_performance.csv";

/// Directory the generator binary writes into, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "data/raw";

/// One CSV artefact written by [`write_dataset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    /// Location of the file.
    pub path: Utf8PathBuf,
    /// Number of data rows, excluding the header.
    pub rows: usize,
}

/// Writes the four collections of `dataset` as CSV files inside `dir`.
///
/// The directory is created when absent. Each file is rendered in memory and
/// then atomically replaces any previous version, so identical datasets
/// always produce byte-identical files.
///
/// # Errors
///
/// Returns [`OutputError::DirectoryError`] when `dir` cannot be created or
/// opened, [`OutputError::SerializeError`] when a record cannot be rendered,
/// and [`OutputError::WriteError`] when a file cannot be replaced.
pub fn write_dataset(
    dataset: &ShopDataset,
    dir: &Utf8Path,
) -> Result<Vec<WrittenFile>, OutputError> {
    let handle = open_output_dir(dir)?;

    let files = vec![
        write_collection(&handle, dir, CUSTOMERS_FILE, &dataset.customers)?,
        write_collection(&handle, dir, ORDERS_FILE, &dataset.orders)?,
        write_collection(&handle, dir, SESSIONS_FILE, &dataset.sessions)?,
        write_collection(&handle, dir, AD_PERFORMANCE_FILE, &dataset.ad_performance)?,
    ];

    Ok(files)
}

fn open_output_dir(dir: &Utf8Path) -> Result<Dir, OutputError> {
    let directory_error = |err: std::io::Error| OutputError::DirectoryError {
        path: dir.to_path_buf(),
        message: err.to_string(),
    };
    Dir::create_ambient_dir_all(dir, ambient_authority()).map_err(directory_error)?;
    Dir::open_ambient_dir(dir, ambient_authority()).map_err(directory_error)
}

fn write_collection<T: Serialize>(
    handle: &Dir,
    dir: &Utf8Path,
    file_name: &'static str,
    records: &[T],
) -> Result<WrittenFile, OutputError> {
    let path = dir.join(file_name);
    let contents = render_csv(file_name, records)?;
    write_atomic(handle, &path, file_name, &contents)?;
    info!(path = %path, rows = records.len(), "wrote CSV file");

    Ok(WrittenFile {
        path,
        rows: records.len(),
    })
}

fn render_csv<T: Serialize>(file_name: &'static str, records: &[T]) -> Result<Vec<u8>, OutputError> {
    let serialize_error = |message: String| OutputError::SerializeError { file_name, message };

    let mut writer = csv::Writer::from_writer(Vec::new());
    for record in records {
        writer
            .serialize(record)
            .map_err(|err| serialize_error(err.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|err| serialize_error(err.to_string()))
}
