//! Deterministic synthetic e-commerce data for warehouse development.
//!
//! This crate generates four related record collections from a seeded
//! random stream and writes them as CSV files ready for the warehouse
//! loader.
//!
//! # Overview
//!
//! - Customers with weighted countries and plausible contact details
//! - Orders bound to customers, with clamped log-normal amounts and
//!   negative refunds
//! - Web-analytics sessions with power-law engagement
//! - A daily ad-performance grid with a click and conversion funnel
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use shop_data::{DatasetSummary, GenerationConfig, generate_dataset};
//!
//! let config = GenerationConfig {
//!     customer_count: 20,
//!     order_count: 40,
//!     session_count: 60,
//!     ad_count: 3,
//!     start_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
//!     end_date: NaiveDate::from_ymd_opt(2024, 1, 31).expect("valid date"),
//!     ..GenerationConfig::default()
//! };
//!
//! let dataset = generate_dataset(&config, config.range_end()).expect("generation succeeds");
//! let summary = DatasetSummary::from_dataset(&dataset);
//!
//! assert_eq!(summary.ad_performance_rows, 3 * 31);
//! assert_eq!(summary.total_records(), 20 + 40 + 60 + 93);
//! ```

mod atomic_io;
mod config;
mod error;
mod generator;
pub mod records;
mod sampling;
mod summary;

pub mod output;

pub use config::{CUSTOMER_LIFETIME_MARGIN_DAYS, DEFAULT_SEED, GenerationConfig};
pub use error::{ConfigError, GenerationError, OutputError};
pub use generator::{
    AMOUNT_LOG_MEAN, AMOUNT_LOG_SIGMA, CAMPAIGN_COUNT, COUNTRY_WEIGHTS, MAX_ORDER_AMOUNT,
    MAX_PAGE_VIEWS, MEDIA, MIN_ORDER_AMOUNT, MIN_SESSION_SECONDS, PAGE_VIEW_SHAPE,
    SOURCE_WEIGHTS, STATUS_WEIGHTS, ShopDataset, generate_ad_performance, generate_customers,
    generate_dataset, generate_orders, generate_sessions, ingestion_timestamp,
};
pub use output::{WrittenFile, write_dataset};
pub use summary::{DatasetSummary, StatusShare};
