//! Error types for the warehouse loader.
//!
//! Every failure aborts the run: configuration problems and coercion errors
//! surface before any connection is made, while sink and verification
//! failures stop the load at the first affected table.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::ports::WarehouseSinkError;

/// Errors raised while resolving loader configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// One or more required environment variables are absent or blank.
    #[error("missing environment variables: {}", names.join(", "))]
    MissingVariables {
        /// Names of every missing variable, in declaration order.
        names: Vec<String>,
    },

    /// Configuration sources could not be read or merged.
    #[error("failed to load warehouse configuration: {message}")]
    Load {
        /// Description of the underlying failure.
        message: String,
    },
}

/// Errors raised while coercing CSV text into warehouse values.
///
/// Each variant names the source file and, where it applies, the
/// 1-based line and the column at fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    /// A required column has no matching CSV header.
    #[error("{file}: missing required column '{column}'")]
    MissingColumn {
        /// Source file name.
        file: String,
        /// Column without a header.
        column: String,
    },

    /// A required column holds an empty cell.
    #[error("{file}:{line}: required column '{column}' is empty")]
    NullValue {
        /// Source file name.
        file: String,
        /// 1-based line number.
        line: u64,
        /// Offending column.
        column: String,
    },

    /// A cell could not be parsed as the column type.
    #[error("{file}:{line}: column '{column}' expected {expected}, found '{value}'")]
    InvalidValue {
        /// Source file name.
        file: String,
        /// 1-based line number.
        line: u64,
        /// Offending column.
        column: String,
        /// SQL type the value should conform to.
        expected: String,
        /// Raw cell text.
        value: String,
    },

    /// A text cell exceeds the column's character limit.
    #[error("{file}:{line}: column '{column}' holds {length} characters, limit is {limit}")]
    TooLong {
        /// Source file name.
        file: String,
        /// 1-based line number.
        line: u64,
        /// Offending column.
        column: String,
        /// Column character limit.
        limit: usize,
        /// Actual character count.
        length: usize,
    },

    /// The file is not well-formed CSV.
    #[error("{file}: malformed CSV: {message}")]
    Malformed {
        /// Source file name.
        file: String,
        /// Description of the parse failure.
        message: String,
    },
}

/// Errors that abort a warehouse load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Configuration was incomplete or unreadable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A source file could not be read.
    #[error("failed to read '{path}': {message}")]
    Read {
        /// Path of the unreadable file or directory.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// A source file could not be coerced to its table's types.
    #[error(transparent)]
    Coercion(#[from] CoercionError),

    /// The warehouse rejected a connection or statement.
    #[error(transparent)]
    Sink(#[from] WarehouseSinkError),

    /// The warehouse holds a different number of rows than were submitted.
    #[error("row count mismatch for {table}: submitted {submitted}, warehouse holds {persisted}")]
    CountMismatch {
        /// Qualified table name.
        table: String,
        /// Rows sent to the warehouse.
        submitted: u64,
        /// Rows the warehouse reports.
        persisted: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variables_are_listed_together() {
        let err = ConfigError::MissingVariables {
            names: vec!["WAREHOUSE_HOST".to_owned(), "WAREHOUSE_PASSWORD".to_owned()],
        };
        assert_eq!(
            err.to_string(),
            "missing environment variables: WAREHOUSE_HOST, WAREHOUSE_PASSWORD"
        );
    }

    #[test]
    fn null_value_names_file_line_and_column() {
        let err = CoercionError::NullValue {
            file: "shopify_orders.csv".to_owned(),
            line: 3,
            column: "order_date".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "shopify_orders.csv:3: required column 'order_date' is empty"
        );
    }

    #[test]
    fn count_mismatch_formats_correctly() {
        let err = LoadError::CountMismatch {
            table: "shopify.orders".to_owned(),
            submitted: 50,
            persisted: 49,
        };
        assert_eq!(
            err.to_string(),
            "row count mismatch for shopify.orders: submitted 50, warehouse holds 49"
        );
    }

    #[test]
    fn coercion_errors_pass_through_unchanged() {
        let inner = CoercionError::MissingColumn {
            file: "shopify_customers.csv".to_owned(),
            column: "email".to_owned(),
        };
        let err: LoadError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
    }
}
