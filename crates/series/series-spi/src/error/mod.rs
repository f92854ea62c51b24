//! Error types for series stores.

mod store_error;

pub use store_error::{Result, StoreError};
