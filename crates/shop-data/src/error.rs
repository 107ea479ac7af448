//! Error types for the shop-data crate.
//!
//! Configuration problems are rejected before any record is drawn, generation
//! failures cover the statistical model itself, and output errors describe
//! failures while persisting the CSV artefacts.

use camino::Utf8PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised while validating a [`crate::GenerationConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A record-count target was zero.
    #[error("{field} must be greater than zero")]
    ZeroCount {
        /// Name of the offending configuration field.
        field: &'static str,
    },

    /// The configured date range ends before it starts.
    #[error("end date {end} precedes start date {start}")]
    InvertedDateRange {
        /// First calendar day of the range.
        start: NaiveDate,
        /// Last calendar day of the range.
        end: NaiveDate,
    },
}

/// Errors that can occur while generating a dataset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The configuration was rejected before generation started.
    #[error("invalid generation config: {0}")]
    Config(#[from] ConfigError),

    /// A sampling distribution could not be constructed or drawn from.
    #[error("invalid {distribution} distribution: {message}")]
    Distribution {
        /// Human-readable distribution name.
        distribution: &'static str,
        /// Description of the underlying failure.
        message: String,
    },

    /// Orders were requested without a customer population to reference.
    #[error("cannot generate orders without customers")]
    NoCustomers,
}

impl GenerationError {
    pub(crate) fn distribution(distribution: &'static str, message: impl ToString) -> Self {
        Self::Distribution {
            distribution,
            message: message.to_string(),
        }
    }
}

/// Errors raised while writing the dataset to disk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    /// The output directory could not be created or opened.
    #[error("failed to open output directory '{path}': {message}")]
    DirectoryError {
        /// Directory that could not be opened.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// A collection could not be serialized to CSV.
    #[error("failed to serialize {file_name}: {message}")]
    SerializeError {
        /// Target file name.
        file_name: &'static str,
        /// Description of the serialization error.
        message: String,
    },

    /// A file could not be written atomically.
    #[error("failed to write '{path}': {message}")]
    WriteError {
        /// Path of the file being written.
        path: Utf8PathBuf,
        /// Description of the I/O error.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_formats_correctly() {
        let err = ConfigError::ZeroCount {
            field: "order_count",
        };
        assert_eq!(err.to_string(), "order_count must be greater than zero");
    }

    #[test]
    fn inverted_range_formats_correctly() {
        let err = ConfigError::InvertedDateRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 2).expect("valid date"),
            end: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        };
        assert_eq!(
            err.to_string(),
            "end date 2024-01-01 precedes start date 2024-01-02"
        );
    }

    #[test]
    fn config_error_converts_into_generation_error() {
        let err: GenerationError = ConfigError::ZeroCount { field: "ad_count" }.into();
        assert_eq!(
            err.to_string(),
            "invalid generation config: ad_count must be greater than zero"
        );
    }

    #[test]
    fn distribution_error_formats_correctly() {
        let err = GenerationError::distribution("log-normal", "sigma must be finite");
        assert_eq!(
            err.to_string(),
            "invalid log-normal distribution: sigma must be finite"
        );
    }

    #[test]
    fn write_error_formats_correctly() {
        let err = OutputError::WriteError {
            path: Utf8PathBuf::from("data/raw/shopify_orders.csv"),
            message: "disk full".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "failed to write 'data/raw/shopify_orders.csv': disk full"
        );
    }
}
