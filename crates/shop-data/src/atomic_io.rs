//! Atomic file replacement inside a capability-scoped directory.
//!
//! Each CSV is written to a hidden sibling, synced, then renamed over the
//! target, so an interrupted run never leaves a truncated file behind.

use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use camino::Utf8Path;
use cap_std::fs::{Dir, OpenOptions};

use crate::error::OutputError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replaces `file_name` in `dir` with `contents`.
///
/// `display_path` is only used to attribute errors.
///
/// # Errors
///
/// Returns [`OutputError::WriteError`] if the temporary file cannot be
/// written or renamed into place.
pub(crate) fn write_atomic(
    dir: &Dir,
    display_path: &Utf8Path,
    file_name: &str,
    contents: &[u8],
) -> Result<(), OutputError> {
    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_nanos());
    let tmp_name = format!(
        ".{file_name}.tmp.{}.{suffix}.{counter}",
        std::process::id()
    );

    write_to_temp_file(dir, &tmp_name, display_path, contents)?;
    if let Err(err) = rename_into_place(dir, &tmp_name, file_name) {
        drop(dir.remove_file(&tmp_name));
        return Err(write_error(display_path, &err));
    }
    sync_directory(dir);

    Ok(())
}

fn write_to_temp_file(
    dir: &Dir,
    tmp_name: &str,
    display_path: &Utf8Path,
    contents: &[u8],
) -> Result<(), OutputError> {
    let tmp_path = display_path.with_file_name(tmp_name);
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir
        .open_with(tmp_name, &options)
        .map_err(|err| write_error(&tmp_path, &err))?;

    if let Err(err) = file.write_all(contents).and_then(|()| file.sync_all()) {
        drop(file);
        drop(dir.remove_file(tmp_name));
        return Err(write_error(&tmp_path, &err));
    }

    Ok(())
}

#[cfg(windows)]
fn rename_into_place(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    // Rename does not overwrite on Windows.
    match dir.remove_file(target_name) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    dir.rename(tmp_name, dir, target_name)
}

#[cfg(not(windows))]
fn rename_into_place(dir: &Dir, tmp_name: &str, target_name: &str) -> io::Result<()> {
    dir.rename(tmp_name, dir, target_name)
}

fn sync_directory(dir: &Dir) {
    // Best effort; the data itself is already synced.
    drop(dir.open(".").and_then(|handle| handle.sync_all()));
}

fn write_error(path: &Utf8Path, err: &io::Error) -> OutputError {
    OutputError::WriteError {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
