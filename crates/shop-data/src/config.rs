//! Generation parameters passed explicitly into every generator.
//!
//! The defaults reproduce the production dataset: two calendar years of
//! activity for 5,000 customers, seeded with 42.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crate::error::ConfigError;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

const DEFAULT_START_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2023, 1, 1) {
    Some(date) => date,
    None => panic!("default start date is a valid calendar day"),
};

const DEFAULT_END_DATE: NaiveDate = match NaiveDate::from_ymd_opt(2024, 12, 31) {
    Some(date) => date,
    None => panic!("default end date is a valid calendar day"),
};

/// Number of days at the end of the range in which no customer is created,
/// leaving every customer at least a month of order-eligible lifetime.
pub const CUSTOMER_LIFETIME_MARGIN_DAYS: i64 = 30;

/// Parameters for one generation run.
///
/// # Example
///
/// ```
/// use shop_data::GenerationConfig;
///
/// let config = GenerationConfig {
///     customer_count: 10,
///     order_count: 50,
///     ..GenerationConfig::default()
/// };
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.user_id_space(), 20);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Seed for the deterministic random stream.
    pub seed: u64,
    /// First calendar day of activity.
    pub start_date: NaiveDate,
    /// Last calendar day of activity (inclusive for ad-performance rows).
    pub end_date: NaiveDate,
    /// Number of customers to generate.
    pub customer_count: usize,
    /// Number of orders to generate.
    pub order_count: usize,
    /// Number of analytics sessions to generate.
    pub session_count: usize,
    /// Number of ads reported on every day of the range.
    pub ad_count: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            start_date: DEFAULT_START_DATE,
            end_date: DEFAULT_END_DATE,
            customer_count: 5_000,
            order_count: 25_000,
            session_count: 50_000,
            ad_count: 50,
        }
    }
}

impl GenerationConfig {
    /// Rejects configurations that cannot produce a coherent dataset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroCount`] for the first zero record-count
    /// target and [`ConfigError::InvertedDateRange`] when the end date
    /// precedes the start date.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("customer_count", self.customer_count),
            ("order_count", self.order_count),
            ("session_count", self.session_count),
            ("ad_count", self.ad_count),
        ];
        if let Some((field, _)) = counts.into_iter().find(|(_, count)| *count == 0) {
            return Err(ConfigError::ZeroCount { field });
        }
        if self.end_date < self.start_date {
            return Err(ConfigError::InvertedDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }

    /// Start of the global range (midnight of the start date).
    #[must_use]
    pub fn range_start(&self) -> NaiveDateTime {
        self.start_date.and_time(NaiveTime::MIN)
    }

    /// End of the global range (midnight of the end date).
    #[must_use]
    pub fn range_end(&self) -> NaiveDateTime {
        self.end_date.and_time(NaiveTime::MIN)
    }

    /// Latest instant a customer may be created at.
    ///
    /// Ranges shorter than the lifetime margin collapse the window onto the
    /// range start.
    #[must_use]
    pub fn customer_window_end(&self) -> NaiveDateTime {
        let margin_end = self.range_end() - TimeDelta::days(CUSTOMER_LIFETIME_MARGIN_DAYS);
        margin_end.max(self.range_start())
    }

    /// Every calendar day of the range, start and end included.
    pub fn calendar_days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end_date;
        self.start_date.iter_days().take_while(move |day| *day <= end)
    }

    /// Size of the visitor identifier space, double the customer base.
    #[must_use]
    pub const fn user_id_space(&self) -> usize {
        self.customer_count.saturating_mul(2)
    }
}
