//! Shared filesystem helpers for warehouse-loader integration tests.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Create a unique, empty directory under `target/warehouse-loader-tests`.
///
/// # Errors
///
/// Returns any filesystem errors encountered while creating the directory.
pub fn unique_temp_dir(prefix: &str) -> io::Result<Utf8PathBuf> {
    static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let process_id = std::process::id();
    let dir = Utf8PathBuf::from("target")
        .join("warehouse-loader-tests")
        .join(format!("{prefix}-{process_id}-{counter}"));
    let root = Dir::open_ambient_dir(".", ambient_authority())?;
    root.create_dir_all(&dir)?;
    Ok(dir)
}

/// Blank the named column on a 1-based `line` of a CSV file in `dir`.
///
/// Fields are split on commas, so the file must not quote that line.
///
/// # Errors
///
/// Returns filesystem errors, or `InvalidInput` when the line or column
/// does not exist.
pub fn blank_field(dir: &Utf8Path, file: &str, line: usize, column: &str) -> io::Result<()> {
    let missing = |what: &str| io::Error::new(io::ErrorKind::InvalidInput, what.to_owned());
    let handle = Dir::open_ambient_dir(dir, ambient_authority())?;
    let contents = handle.read_to_string(file)?;

    let mut lines: Vec<String> = contents.lines().map(str::to_owned).collect();
    let index = lines
        .first()
        .and_then(|header| header.split(',').position(|name| name == column))
        .ok_or_else(|| missing("column not found"))?;
    let target = lines
        .get_mut(line.saturating_sub(1))
        .ok_or_else(|| missing("line not found"))?;
    let blanked: Vec<&str> = target
        .split(',')
        .enumerate()
        .map(|(position, field)| if position == index { "" } else { field })
        .collect();
    let replacement = blanked.join(",");
    *target = replacement;

    handle.write(file, format!("{}\n", lines.join("\n")))
}
