//! Series store error types.

use thiserror::Error;

/// Series store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable, timed out or failed the command.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Out of order sample: timestamp {timestamp} is not after {last}")]
    OutOfOrder { timestamp: i64, last: i64 },

    #[error("Invalid sample value: {0}")]
    InvalidValue(String),

    /// Backend returned something that is not a sample.
    #[error("Malformed reply: {0}")]
    Malformed(String),
}

/// Result type for series store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_order_display() {
        let error = StoreError::OutOfOrder {
            timestamp: 5,
            last: 9,
        };
        assert_eq!(
            error.to_string(),
            "Out of order sample: timestamp 5 is not after 9"
        );
    }

    #[test]
    fn test_unavailable_display() {
        let error = StoreError::Unavailable("connection refused".to_string());
        assert_eq!(error.to_string(), "Store unavailable: connection refused");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<StoreError>();
    }
}
