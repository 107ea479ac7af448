//! Warehouse loading for the synthetic shop dataset.
//!
//! The loader reads the four CSV files written by `shop-data`, coerces
//! every cell to its warehouse column type, replaces the raw tables and
//! verifies that the warehouse holds exactly the submitted rows.
//!
//! Persistence goes through the [`WarehouseSink`] port. The PostgreSQL
//! adapter lives in [`outbound`]; [`InMemoryWarehouseSink`] backs tests.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use warehouse_loader::coerce::coerce_table;
//! use warehouse_loader::loader::{PreparedTable, load_prepared};
//! use warehouse_loader::schema::CUSTOMERS;
//! use warehouse_loader::InMemoryWarehouseSink;
//!
//! let csv = "customer_id,email,first_name,last_name,country,created_at,updated_at\n\
//!            1,ana@example.com,Ana,Lopez,Spain,2024-01-02 10:00:00,2024-01-05 09:30:00\n";
//! let loaded_at = NaiveDate::from_ymd_opt(2024, 2, 1)
//!     .and_then(|day| day.and_hms_opt(0, 0, 0))
//!     .expect("valid timestamp");
//!
//! let prepared = [PreparedTable {
//!     definition: &CUSTOMERS,
//!     payload: coerce_table(&CUSTOMERS, csv, loaded_at).expect("coercion succeeds"),
//! }];
//! let mut sink = InMemoryWarehouseSink::new();
//! let report = load_prepared(&mut sink, &prepared, loaded_at).expect("load succeeds");
//!
//! assert_eq!(report.total_rows(), 1);
//! ```

pub mod coerce;
pub mod config;
pub mod error;
pub mod loader;
pub mod outbound;
pub mod ports;
pub mod schema;

pub use config::{WarehouseCredentials, WarehouseSettings};
pub use error::{CoercionError, ConfigError, LoadError};
pub use loader::{LoadReport, LoadedTable, load_warehouse};
pub use outbound::PostgresWarehouseSink;
pub use ports::{InMemoryWarehouseSink, WarehouseSink, WarehouseSinkError};
