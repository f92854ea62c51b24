//! Series Store Facade
//!
//! Unified entry point for the series store crates.

pub use series_api::*;
pub use series_core::*;
