//! Port abstractions the loader drives, with their error types.

mod macros;
mod warehouse_sink;

pub(crate) use macros::define_port_error;

#[cfg(test)]
pub use warehouse_sink::MockWarehouseSink;
pub use warehouse_sink::{InMemoryWarehouseSink, WarehouseSink, WarehouseSinkError};
