//! Contract definitions for series stores.

mod series_store;

pub use series_store::SeriesStore;
