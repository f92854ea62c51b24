//! Online Service
//!
//! Composes a series store, a frozen artifact bundle and the anomaly scorer
//! into the ingest / list / clear / detect operations.

mod clock;
mod error;
mod online;

pub use clock::{now_millis, TimestampClock};
pub use error::{parse_value, Result, ServiceError};
pub use online::{Detection, OnlineService};
