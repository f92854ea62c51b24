//! Series Store Service Provider Interface
//!
//! Defines the contract for the ordered (timestamp, value) store backing the
//! online service.

pub mod contract;
pub mod error;
pub mod model;

// Re-export all public items at crate root for convenience
pub use contract::SeriesStore;
pub use error::{Result, StoreError};
pub use model::{sample_values, Order, Sample};
