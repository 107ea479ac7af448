//! Shared filesystem helpers for shop-data integration tests.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Create a unique, empty directory under `target/shop-data-tests`.
///
/// # Errors
///
/// Returns any filesystem errors encountered while creating the directory.
pub fn unique_temp_dir(prefix: &str) -> io::Result<Utf8PathBuf> {
    static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let process_id = std::process::id();
    let dir = Utf8PathBuf::from("target")
        .join("shop-data-tests")
        .join(format!("{prefix}-{process_id}-{counter}"));
    let root = Dir::open_ambient_dir(".", ambient_authority())?;
    root.create_dir_all(&dir)?;
    Ok(dir)
}

/// Read every file in `dir` as `(name, bytes)` pairs, sorted by name.
///
/// # Errors
///
/// Returns any filesystem errors encountered while reading.
pub fn read_files(dir: &Utf8Path) -> io::Result<Vec<(String, Vec<u8>)>> {
    let handle = Dir::open_ambient_dir(dir, ambient_authority())?;
    let mut files = Vec::new();
    for item in handle.entries()? {
        let entry = item?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let bytes = handle.read(&name)?;
        files.push((name, bytes));
    }
    files.sort();
    Ok(files)
}
