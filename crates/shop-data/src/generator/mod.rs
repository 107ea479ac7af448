//! Deterministic dataset generation from a [`GenerationConfig`].
//!
//! All four collections are drawn from a single seeded ChaCha8 stream in a
//! fixed order (customers, orders, sessions, ad performance), so the same
//! configuration and ingestion timestamp always produce the same dataset.

mod ad_performance;
mod customers;
mod orders;
mod sessions;

use chrono::{NaiveDateTime, SubsecRound};
use mockable::Clock;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

pub use ad_performance::generate_ad_performance;
pub use customers::{COUNTRY_WEIGHTS, generate_customers};
pub use orders::{
    AMOUNT_LOG_MEAN, AMOUNT_LOG_SIGMA, MAX_ORDER_AMOUNT, MIN_ORDER_AMOUNT, STATUS_WEIGHTS,
    generate_orders,
};
pub use sessions::{
    CAMPAIGN_COUNT, MAX_PAGE_VIEWS, MEDIA, MIN_SESSION_SECONDS, PAGE_VIEW_SHAPE, SOURCE_WEIGHTS,
    generate_sessions,
};

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::records::{AdPerformance, Customer, Order, Session};

/// The four record collections produced by one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopDataset {
    /// Customer population.
    pub customers: Vec<Customer>,
    /// Orders referencing `customers`.
    pub orders: Vec<Order>,
    /// Analytics sessions.
    pub sessions: Vec<Session>,
    /// Daily ad performance grid.
    pub ad_performance: Vec<AdPerformance>,
}

impl ShopDataset {
    /// Total number of records across all collections.
    #[must_use]
    pub fn total_records(&self) -> usize {
        self.customers.len() + self.orders.len() + self.sessions.len() + self.ad_performance.len()
    }
}

/// Reads the ingestion timestamp for a run from `clock`.
///
/// The value is truncated to microseconds, the precision written to CSV and
/// stored by the warehouse.
#[must_use]
pub fn ingestion_timestamp(clock: &impl Clock) -> NaiveDateTime {
    clock.utc().naive_utc().trunc_subsecs(6)
}

/// Generates a complete dataset.
///
/// `loaded_at` is stamped on every record as the ingestion timestamp; it is
/// captured once by the caller so that a run is internally consistent.
///
/// # Errors
///
/// Returns [`GenerationError::Config`] before drawing anything when the
/// configuration is rejected, or another [`GenerationError`] if a
/// distribution cannot be sampled.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use shop_data::{GenerationConfig, generate_dataset};
///
/// let config = GenerationConfig {
///     customer_count: 10,
///     order_count: 50,
///     session_count: 100,
///     ad_count: 2,
///     start_date: NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
///     end_date: NaiveDate::from_ymd_opt(2024, 3, 3).expect("valid date"),
///     ..GenerationConfig::default()
/// };
/// let loaded_at = config.range_end();
///
/// let dataset = generate_dataset(&config, loaded_at).expect("generation succeeds");
/// assert_eq!(dataset.ad_performance.len(), 6);
///
/// // Same seed, same output.
/// assert_eq!(dataset, generate_dataset(&config, loaded_at).expect("generation succeeds"));
/// ```
pub fn generate_dataset(
    config: &GenerationConfig,
    loaded_at: NaiveDateTime,
) -> Result<ShopDataset, GenerationError> {
    config.validate()?;
    info!(
        seed = config.seed,
        start = %config.start_date,
        end = %config.end_date,
        "generating dataset"
    );

    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    let customers = generate_customers(&mut rng, config, loaded_at)?;
    debug!(count = customers.len(), "generated customers");

    let orders = generate_orders(&mut rng, config, &customers, loaded_at)?;
    debug!(count = orders.len(), "generated orders");

    let sessions = generate_sessions(&mut rng, config, loaded_at)?;
    debug!(count = sessions.len(), "generated sessions");

    let ad_performance = generate_ad_performance(&mut rng, config, loaded_at);
    debug!(count = ad_performance.len(), "generated ad performance rows");

    Ok(ShopDataset {
        customers,
        orders,
        sessions,
        ad_performance,
    })
}
