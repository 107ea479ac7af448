//! PostgreSQL-backed warehouse sink.

use chrono::{NaiveDate, NaiveDateTime};
use postgres::types::ToSql;
use postgres::{Client, Config, NoTls, Transaction};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::coerce::{CellValue, TablePayload};
use crate::config::WarehouseCredentials;
use crate::ports::{WarehouseSink, WarehouseSinkError};
use crate::schema::{ColumnType, TableDefinition, quote_ident};

/// Rows sent per `INSERT` statement.
///
/// Keeps the widest table well under PostgreSQL's 65 535 bind-parameter cap.
pub const INSERT_BATCH_ROWS: usize = 1_000;

type BoxedParam = Box<dyn ToSql + Sync>;

/// Replaces warehouse tables over a synchronous PostgreSQL connection.
pub struct PostgresWarehouseSink {
    client: Client,
}

impl std::fmt::Debug for PostgresWarehouseSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresWarehouseSink")
            .field("closed", &self.client.is_closed())
            .finish()
    }
}

impl PostgresWarehouseSink {
    /// Connects with `credentials` and assumes the configured role.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseSinkError::Connection`] when the server is
    /// unreachable or rejects the login, and [`WarehouseSinkError::Query`]
    /// when the role cannot be assumed.
    pub fn connect(credentials: &WarehouseCredentials) -> Result<Self, WarehouseSinkError> {
        let mut config = Config::new();
        config
            .host(credentials.host())
            .port(credentials.port())
            .user(credentials.user())
            .password(credentials.password())
            .dbname(credentials.database());

        let sink = Self::connect_with(&config, credentials.role())?;
        info!(
            host = credentials.host(),
            port = credentials.port(),
            database = credentials.database(),
            "connected to warehouse"
        );
        Ok(sink)
    }

    /// Connects with a prepared driver `config`, such as one parsed from a
    /// connection URL, then assumes `role`.
    ///
    /// # Errors
    ///
    /// As for [`PostgresWarehouseSink::connect`].
    pub fn connect_with(config: &Config, role: &str) -> Result<Self, WarehouseSinkError> {
        let mut session = config.clone();
        session.application_name("load-to-warehouse");
        let mut client = session
            .connect(NoTls)
            .map_err(|error| WarehouseSinkError::connection(error.to_string()))?;

        client
            .batch_execute(&format!("SET ROLE {}", quote_ident(role)))
            .map_err(|error| WarehouseSinkError::query(error.to_string()))?;
        debug!(role, "assumed warehouse role");

        Ok(Self { client })
    }
}

impl WarehouseSink for PostgresWarehouseSink {
    fn replace_table(
        &mut self,
        definition: &TableDefinition,
        payload: &TablePayload,
    ) -> Result<u64, WarehouseSinkError> {
        let mut transaction = self
            .client
            .transaction()
            .map_err(|error| query_error(&error))?;

        recreate_table(&mut transaction, definition)?;
        let mut inserted = 0_u64;
        for (index, batch) in payload.rows().chunks(INSERT_BATCH_ROWS).enumerate() {
            let affected = insert_batch(&mut transaction, definition, batch)?;
            inserted = inserted.saturating_add(affected);
            debug!(
                table = %definition.qualified_name(),
                batch = index + 1,
                rows = affected,
                "inserted batch"
            );
        }
        check_inserted(definition, payload.row_count(), inserted)?;
        let persisted = count_in(&mut transaction, definition)?;

        transaction.commit().map_err(|error| query_error(&error))?;
        Ok(persisted)
    }

    fn count_rows(&mut self, definition: &TableDefinition) -> Result<u64, WarehouseSinkError> {
        let query = format!("SELECT COUNT(*) FROM {}", definition.quoted_name());
        let row = self
            .client
            .query_one(query.as_str(), &[])
            .map_err(|error| query_error(&error))?;
        count_from(row.get(0))
    }
}

fn recreate_table(
    transaction: &mut Transaction<'_>,
    definition: &TableDefinition,
) -> Result<(), WarehouseSinkError> {
    let statements = [
        format!(
            "CREATE SCHEMA IF NOT EXISTS {}",
            quote_ident(definition.schema)
        ),
        format!("DROP TABLE IF EXISTS {} CASCADE", definition.quoted_name()),
        definition.create_table_sql(),
        definition.comment_sql(),
    ];
    transaction
        .batch_execute(&statements.join(";\n"))
        .map_err(|error| query_error(&error))
}

fn insert_batch(
    transaction: &mut Transaction<'_>,
    definition: &TableDefinition,
    rows: &[Vec<CellValue>],
) -> Result<u64, WarehouseSinkError> {
    if rows.is_empty() {
        return Ok(0);
    }

    let statement = insert_statement(definition, rows.len());
    let params: Vec<BoxedParam> = rows
        .iter()
        .flat_map(|row| {
            definition
                .columns
                .iter()
                .zip(row)
                .map(|(column, value)| to_param(column.column_type, value))
        })
        .collect();
    let param_refs: Vec<&(dyn ToSql + Sync)> = params
        .iter()
        .map(|param| &**param as &(dyn ToSql + Sync))
        .collect();

    transaction
        .execute(statement.as_str(), &param_refs)
        .map_err(|error| query_error(&error))
}

/// Rejects a load whose `INSERT` statements affected fewer or more rows than
/// were submitted, before the transaction commits.
fn check_inserted(
    definition: &TableDefinition,
    submitted: u64,
    inserted: u64,
) -> Result<(), WarehouseSinkError> {
    if inserted == submitted {
        return Ok(());
    }
    Err(WarehouseSinkError::query(format!(
        "inserted {inserted} of {submitted} rows into {}",
        definition.qualified_name()
    )))
}

/// Builds a multi-row `INSERT` with numbered placeholders.
fn insert_statement(definition: &TableDefinition, row_count: usize) -> String {
    let columns: Vec<String> = definition.column_names().map(quote_ident).collect();
    let width = columns.len();
    let tuples: Vec<String> = (0..row_count)
        .map(|row| {
            let placeholders: Vec<String> = (1..=width)
                .map(|offset| format!("${}", row * width + offset))
                .collect();
            format!("({})", placeholders.join(", "))
        })
        .collect();

    format!(
        "INSERT INTO {} ({}) VALUES {}",
        definition.quoted_name(),
        columns.join(", "),
        tuples.join(", ")
    )
}

/// Boxes a value for binding; nulls are typed after their column so the
/// server accepts them.
fn to_param(column_type: ColumnType, value: &CellValue) -> BoxedParam {
    match value {
        CellValue::Integer(number) => Box::new(*number),
        CellValue::Text(text) => Box::new(text.clone()),
        CellValue::Timestamp(instant) => Box::new(*instant),
        CellValue::Date(day) => Box::new(*day),
        CellValue::Numeric(amount) => Box::new(*amount),
        CellValue::Null => match column_type {
            ColumnType::Integer => Box::new(None::<i32>),
            ColumnType::Varchar(_) => Box::new(None::<String>),
            ColumnType::Timestamp => Box::new(None::<NaiveDateTime>),
            ColumnType::Date => Box::new(None::<NaiveDate>),
            ColumnType::Numeric { .. } => Box::new(None::<Decimal>),
        },
    }
}

fn count_in(
    transaction: &mut Transaction<'_>,
    definition: &TableDefinition,
) -> Result<u64, WarehouseSinkError> {
    let query = format!("SELECT COUNT(*) FROM {}", definition.quoted_name());
    let row = transaction
        .query_one(query.as_str(), &[])
        .map_err(|error| query_error(&error))?;
    count_from(row.get(0))
}

fn count_from(count: i64) -> Result<u64, WarehouseSinkError> {
    u64::try_from(count)
        .map_err(|_| WarehouseSinkError::query(format!("negative row count {count}")))
}

fn query_error(error: &postgres::Error) -> WarehouseSinkError {
    WarehouseSinkError::query(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AD_PERFORMANCE, SESSIONS};

    #[test]
    fn insert_statement_numbers_placeholders_across_rows() {
        let sql = insert_statement(&AD_PERFORMANCE, 2);
        assert_eq!(
            sql,
            concat!(
                "INSERT INTO \"facebook_ads\".\"ad_performance\" ",
                "(\"ad_id\", \"date\", \"impressions\", \"clicks\", \"spend\", \"conversions\", \"_loaded_at\") ",
                "VALUES ($1, $2, $3, $4, $5, $6, $7), ($8, $9, $10, $11, $12, $13, $14)"
            )
        );
    }

    #[test]
    fn widest_batch_fits_the_parameter_limit() {
        let widest = [&AD_PERFORMANCE, &SESSIONS]
            .iter()
            .map(|table| table.columns.len())
            .max()
            .unwrap_or_default();
        assert!(widest * INSERT_BATCH_ROWS <= usize::from(u16::MAX));
    }

    #[test]
    fn short_inserts_abort_the_replacement() {
        assert_eq!(check_inserted(&SESSIONS, 1_200, 1_200), Ok(()));
        assert_eq!(
            check_inserted(&SESSIONS, 1_200, 1_000),
            Err(WarehouseSinkError::query(
                "inserted 1000 of 1200 rows into google_analytics.sessions"
            ))
        );
    }

    #[test]
    fn negative_counts_are_rejected() {
        assert_eq!(count_from(3), Ok(3));
        assert!(count_from(-1).is_err());
    }
}
