//! Coercion of CSV text into typed warehouse values.
//!
//! Headers are matched to [`TableDefinition`] columns case-insensitively.
//! Empty cells are nulls; how a null is treated depends on the column's
//! [`Nullability`].

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use crate::error::CoercionError;
use crate::schema::{ColumnDefinition, ColumnType, Nullability, TableDefinition};

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single coerced warehouse value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// SQL NULL.
    Null,
    /// `INTEGER` value.
    Integer(i32),
    /// `VARCHAR` value.
    Text(String),
    /// `TIMESTAMP` value.
    Timestamp(NaiveDateTime),
    /// `DATE` value.
    Date(NaiveDate),
    /// `NUMERIC` value, already rounded to the column scale.
    Numeric(Decimal),
}

/// Rows coerced for one table, each holding one value per column in
/// definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablePayload {
    rows: Vec<Vec<CellValue>>,
}

impl TablePayload {
    /// Wraps already-coerced rows.
    #[must_use]
    pub const fn new(rows: Vec<Vec<CellValue>>) -> Self {
        Self { rows }
    }

    /// Coerced rows in file order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of rows, as reported to the warehouse.
    #[must_use]
    pub fn row_count(&self) -> u64 {
        u64::try_from(self.rows.len()).unwrap_or(u64::MAX)
    }
}

/// Coerces the CSV `contents` of `definition`'s source file.
///
/// Empty `_loaded_at` cells, or a missing `_loaded_at` header, are filled
/// with `loaded_at`.
///
/// # Errors
///
/// Returns a [`CoercionError`] naming the file, line and column of the first
/// cell that cannot be stored, or the first required column without a header.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use warehouse_loader::coerce::{CellValue, coerce_table};
/// use warehouse_loader::schema::AD_PERFORMANCE;
///
/// let csv = "AD_ID,DATE,IMPRESSIONS,CLICKS,SPEND,CONVERSIONS\nad_001,2024-03-01,900,20,45.5,1\n";
/// let loaded_at = NaiveDate::from_ymd_opt(2024, 3, 2)
///     .and_then(|day| day.and_hms_opt(6, 0, 0))
///     .expect("valid timestamp");
///
/// let payload = coerce_table(&AD_PERFORMANCE, csv, loaded_at).expect("coercion succeeds");
/// assert_eq!(payload.row_count(), 1);
/// assert_eq!(payload.rows()[0][6], CellValue::Timestamp(loaded_at));
/// ```
pub fn coerce_table(
    definition: &TableDefinition,
    contents: &str,
    loaded_at: NaiveDateTime,
) -> Result<TablePayload, CoercionError> {
    let file = definition.source_file;
    let malformed = |err: csv::Error| CoercionError::Malformed {
        file: file.to_owned(),
        message: err.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new().from_reader(contents.as_bytes());
    let headers = reader.headers().map_err(malformed)?.clone();
    let slots = map_columns(definition, &headers)?;

    let mut rows = Vec::new();
    for item in reader.records() {
        let record = item.map_err(malformed)?;
        let line = record.position().map_or(0, csv::Position::line);
        let row = definition
            .columns
            .iter()
            .zip(&slots)
            .map(|(column, slot)| {
                let raw = slot.and_then(|index| record.get(index)).unwrap_or_default();
                coerce_cell(column, raw, loaded_at)
                    .map_err(|fault| fault.locate(file, line, column, raw))
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }

    debug!(file, rows = rows.len(), "coerced CSV file");
    Ok(TablePayload::new(rows))
}

/// Finds the header index feeding each column, in definition order.
fn map_columns(
    definition: &TableDefinition,
    headers: &csv::StringRecord,
) -> Result<Vec<Option<usize>>, CoercionError> {
    let slots = definition
        .columns
        .iter()
        .map(|column| {
            let slot = headers
                .iter()
                .position(|header| header.trim().eq_ignore_ascii_case(column.name));
            if slot.is_none() && column.nullability == Nullability::Required {
                return Err(CoercionError::MissingColumn {
                    file: definition.source_file.to_owned(),
                    column: column.name.to_owned(),
                });
            }
            Ok(slot)
        })
        .collect::<Result<Vec<_>, _>>()?;

    for header in headers {
        let known = definition
            .columns
            .iter()
            .any(|column| header.trim().eq_ignore_ascii_case(column.name));
        if !known {
            warn!(
                file = definition.source_file,
                column = header,
                "ignoring CSV column with no warehouse counterpart"
            );
        }
    }

    Ok(slots)
}

/// Why a single cell was rejected, before file and line are attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellFault {
    Null,
    Invalid,
    TooLong { limit: usize, length: usize },
}

impl CellFault {
    fn locate(self, file: &str, line: u64, column: &ColumnDefinition, raw: &str) -> CoercionError {
        let file = file.to_owned();
        let column_name = column.name.to_owned();
        match self {
            Self::Null => CoercionError::NullValue {
                file,
                line,
                column: column_name,
            },
            Self::Invalid => CoercionError::InvalidValue {
                file,
                line,
                column: column_name,
                expected: column.column_type.sql(),
                value: raw.to_owned(),
            },
            Self::TooLong { limit, length } => CoercionError::TooLong {
                file,
                line,
                column: column_name,
                limit,
                length,
            },
        }
    }
}

fn coerce_cell(
    column: &ColumnDefinition,
    raw: &str,
    loaded_at: NaiveDateTime,
) -> Result<CellValue, CellFault> {
    if raw.is_empty() {
        return match column.nullability {
            Nullability::Required => Err(CellFault::Null),
            Nullability::Nullable => Ok(CellValue::Null),
            Nullability::DefaultsToLoadTime => Ok(CellValue::Timestamp(loaded_at)),
        };
    }

    match column.column_type {
        ColumnType::Integer => raw
            .trim()
            .parse()
            .map(CellValue::Integer)
            .map_err(|_| CellFault::Invalid),
        ColumnType::Varchar(limit) => {
            let length = raw.chars().count();
            if length > limit {
                return Err(CellFault::TooLong { limit, length });
            }
            Ok(CellValue::Text(raw.to_owned()))
        }
        ColumnType::Timestamp => parse_timestamp(raw.trim())
            .map(CellValue::Timestamp)
            .ok_or(CellFault::Invalid),
        ColumnType::Date => parse_date(raw.trim())
            .map(CellValue::Date)
            .ok_or(CellFault::Invalid),
        ColumnType::Numeric { precision, scale } => parse_numeric(raw.trim(), precision, scale)
            .map(CellValue::Numeric)
            .ok_or(CellFault::Invalid),
    }
}

/// Parses a naive timestamp; offsets are dropped and wall-clock time kept.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|instant| instant.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .map(|day| day.and_time(NaiveTime::MIN))
        })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| parse_timestamp(raw).map(|instant| instant.date()))
}

fn parse_numeric(raw: &str, precision: u32, scale: u32) -> Option<Decimal> {
    let value = raw
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()?
        .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    let integer_limit =
        (0..precision.saturating_sub(scale)).fold(Decimal::ONE, |limit, _| limit * Decimal::TEN);
    (value.abs() < integer_limit).then_some(value)
}
