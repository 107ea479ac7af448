//! Port abstraction for persisting coerced tables in a warehouse.

use std::collections::BTreeMap;

use crate::coerce::{CellValue, TablePayload};
use crate::schema::TableDefinition;

use super::define_port_error;

define_port_error! {
    /// Errors raised by warehouse sink adapters.
    pub enum WarehouseSinkError {
        /// Connecting to the warehouse failed.
        Connection {
            /// Driver error text.
            message: String,
        } => "warehouse connection failed: {message}",
        /// A warehouse statement failed.
        Query {
            /// Driver error text.
            message: String,
        } => "warehouse query failed: {message}",
    }
}

/// Port for replacing and counting warehouse tables.
#[cfg_attr(test, mockall::automock)]
pub trait WarehouseSink {
    /// Replace the table described by `definition` with `payload`, creating
    /// it when absent, and return the number of rows it now holds.
    fn replace_table(
        &mut self,
        definition: &TableDefinition,
        payload: &TablePayload,
    ) -> Result<u64, WarehouseSinkError>;

    /// Count the rows currently held by the table.
    fn count_rows(&mut self, definition: &TableDefinition) -> Result<u64, WarehouseSinkError>;
}

impl<S: WarehouseSink + ?Sized> WarehouseSink for &mut S {
    fn replace_table(
        &mut self,
        definition: &TableDefinition,
        payload: &TablePayload,
    ) -> Result<u64, WarehouseSinkError> {
        (**self).replace_table(definition, payload)
    }

    fn count_rows(&mut self, definition: &TableDefinition) -> Result<u64, WarehouseSinkError> {
        (**self).count_rows(definition)
    }
}

/// In-memory sink for tests and dry runs.
///
/// Tables are keyed by qualified name. A sink can be told to silently drop
/// rows from a table to reproduce a lossy warehouse.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWarehouseSink {
    tables: BTreeMap<String, Vec<Vec<CellValue>>>,
    dropped_rows: BTreeMap<String, usize>,
    replaced: Vec<String>,
}

impl InMemoryWarehouseSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later replace of `definition` keep `count` fewer rows than
    /// submitted.
    #[must_use]
    pub fn dropping_rows(mut self, definition: &TableDefinition, count: usize) -> Self {
        self.dropped_rows.insert(definition.qualified_name(), count);
        self
    }

    /// Rows currently stored for `definition`, if the table exists.
    #[must_use]
    pub fn rows(&self, definition: &TableDefinition) -> Option<&[Vec<CellValue>]> {
        self.tables
            .get(&definition.qualified_name())
            .map(Vec::as_slice)
    }

    /// Qualified names of replaced tables, in replacement order.
    #[must_use]
    pub fn replaced_tables(&self) -> &[String] {
        &self.replaced
    }
}

impl WarehouseSink for InMemoryWarehouseSink {
    fn replace_table(
        &mut self,
        definition: &TableDefinition,
        payload: &TablePayload,
    ) -> Result<u64, WarehouseSinkError> {
        let name = definition.qualified_name();
        let dropped = self.dropped_rows.get(&name).copied().unwrap_or(0);
        let kept = payload.rows().len().saturating_sub(dropped);
        let rows: Vec<_> = payload.rows().iter().take(kept).cloned().collect();
        let count = rows.len();

        self.tables.insert(name.clone(), rows);
        self.replaced.push(name);
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    fn count_rows(&mut self, definition: &TableDefinition) -> Result<u64, WarehouseSinkError> {
        let name = definition.qualified_name();
        self.tables
            .get(&name)
            .map(|rows| u64::try_from(rows.len()).unwrap_or(u64::MAX))
            .ok_or_else(|| WarehouseSinkError::query(format!("table {name} does not exist")))
    }
}
