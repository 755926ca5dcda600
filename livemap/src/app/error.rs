//! Bootstrap error types.
//!
//! Nothing in the running core is fatal; these errors can only occur while
//! assembling a session and its collaborators.

use crate::feed::{FeedError, TripTableError};

/// Errors during application assembly.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to load trip table: {0}")]
    TripTable(#[from] TripTableError),

    #[error("failed to create snapshot feed: {0}")]
    Feed(#[from] FeedError),

    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::Config("missing endpoint".to_string());
        assert!(err.to_string().contains("configuration error"));
        assert!(err.to_string().contains("missing endpoint"));
    }

    #[test]
    fn test_from_feed_error() {
        let err: AppError = FeedError::Status(502).into();
        assert!(matches!(err, AppError::Feed(_)));
    }
}
