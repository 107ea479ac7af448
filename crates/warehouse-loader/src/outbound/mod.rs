//! Adapters implementing the loader's ports against real infrastructure.

mod postgres_warehouse_sink;

pub use postgres_warehouse_sink::{INSERT_BATCH_ROWS, PostgresWarehouseSink};
