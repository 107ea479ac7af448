//! Load orchestration: read, coerce, replace and verify.
//!
//! Every source file is read and coerced before the warehouse is contacted,
//! so a malformed dataset never mutates a table.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::coerce::{TablePayload, coerce_table};
use crate::error::LoadError;
use crate::ports::{WarehouseSink, WarehouseSinkError};
use crate::schema::{LOAD_ORDER, TableDefinition};

/// A coerced payload paired with its destination table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedTable {
    /// Destination table.
    pub definition: &'static TableDefinition,
    /// Coerced rows ready for insertion.
    pub payload: TablePayload,
}

/// Row counts for one loaded table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTable {
    /// Qualified table name.
    pub table: String,
    /// Rows submitted to the warehouse.
    pub submitted: u64,
    /// Rows reported by the replace statement.
    pub persisted: u64,
    /// Rows counted after every table was loaded.
    pub verified: u64,
}

/// Outcome of a successful load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Per-table counts, in load order.
    pub tables: Vec<LoadedTable>,
    /// Ingestion timestamp applied to rows without one.
    pub loaded_at: NaiveDateTime,
}

impl LoadReport {
    /// Total rows verified across every table.
    #[must_use]
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|table| table.verified).sum()
    }
}

/// Reads and coerces every source file in `data_dir`, in load order.
///
/// # Errors
///
/// Returns [`LoadError::Read`] when the directory or a file cannot be read,
/// and [`LoadError::Coercion`] for the first file that fails coercion.
pub fn read_payloads(
    data_dir: &Utf8Path,
    loaded_at: NaiveDateTime,
) -> Result<Vec<PreparedTable>, LoadError> {
    let dir = Dir::open_ambient_dir(data_dir, ambient_authority()).map_err(|err| {
        LoadError::Read {
            path: data_dir.to_path_buf(),
            message: err.to_string(),
        }
    })?;

    LOAD_ORDER
        .into_iter()
        .map(|definition| {
            let contents =
                dir.read_to_string(definition.source_file)
                    .map_err(|err| LoadError::Read {
                        path: data_dir.join(definition.source_file),
                        message: err.to_string(),
                    })?;
            let payload = coerce_table(definition, &contents, loaded_at)?;
            info!(
                file = definition.source_file,
                rows = payload.row_count(),
                "coerced source file"
            );
            Ok(PreparedTable {
                definition,
                payload,
            })
        })
        .collect()
}

/// Replaces each prepared table through `sink` and verifies its row count.
///
/// Tables are loaded in the order given. A count mismatch aborts the
/// remaining tables. Once all are loaded every table is counted again.
///
/// # Errors
///
/// Returns [`LoadError::Sink`] when the warehouse rejects a statement and
/// [`LoadError::CountMismatch`] when a count differs from the submitted rows.
pub fn load_prepared<S>(
    sink: &mut S,
    prepared: &[PreparedTable],
    loaded_at: NaiveDateTime,
) -> Result<LoadReport, LoadError>
where
    S: WarehouseSink + ?Sized,
{
    let mut tables = Vec::with_capacity(prepared.len());
    for table in prepared {
        let name = table.definition.qualified_name();
        let submitted = table.payload.row_count();
        let persisted = sink.replace_table(table.definition, &table.payload)?;
        ensure_counts_match(&name, submitted, persisted)?;
        info!(table = %name, rows = persisted, "replaced table");
        tables.push(LoadedTable {
            table: name,
            submitted,
            persisted,
            verified: 0,
        });
    }

    for (table, loaded) in prepared.iter().zip(tables.iter_mut()) {
        let verified = sink.count_rows(table.definition)?;
        ensure_counts_match(&loaded.table, loaded.submitted, verified)?;
        debug!(table = %loaded.table, rows = verified, "verified row count");
        loaded.verified = verified;
    }

    Ok(LoadReport { tables, loaded_at })
}

fn ensure_counts_match(table: &str, submitted: u64, persisted: u64) -> Result<(), LoadError> {
    if submitted == persisted {
        return Ok(());
    }
    warn!(table, submitted, persisted, "row count mismatch");
    Err(LoadError::CountMismatch {
        table: table.to_owned(),
        submitted,
        persisted,
    })
}

/// Coerces the dataset in `data_dir`, then connects and loads it.
///
/// `connect` is only invoked once every file has been coerced.
///
/// # Errors
///
/// Propagates read and coercion failures before connecting, then any
/// connection, statement or verification failure.
pub fn load_warehouse<S, F>(
    data_dir: &Utf8Path,
    loaded_at: NaiveDateTime,
    connect: F,
) -> Result<LoadReport, LoadError>
where
    S: WarehouseSink,
    F: FnOnce() -> Result<S, WarehouseSinkError>,
{
    let prepared = read_payloads(data_dir, loaded_at)?;
    let mut sink = connect()?;
    load_prepared(&mut sink, &prepared, loaded_at)
}
