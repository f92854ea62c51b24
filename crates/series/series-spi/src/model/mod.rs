//! Data models for series stores.

mod sample;

pub use sample::{sample_values, Order, Sample};
