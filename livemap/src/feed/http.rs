//! HTTP snapshot client.
//!
//! The feed trait keeps the transport injectable so the reconciliation loop
//! can be driven by a mock in tests; the real implementation is a thin
//! reqwest wrapper. Transport and status failures abandon the tick and the
//! loop simply tries again at the next scheduled poll.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::RawVehicle;

/// Default timeout for one snapshot request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors from fetching a snapshot.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeedError {
    #[error("snapshot request failed: {0}")]
    Transport(String),

    #[error("snapshot endpoint returned HTTP {0}")]
    Status(u16),

    #[error("snapshot body could not be decoded: {0}")]
    Decode(String),

    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// Source of vehicle snapshots.
pub trait SnapshotFeed: Send + Sync {
    /// Fetch the current snapshot.
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Vec<RawVehicle>, FeedError>> + Send + '_>>;
}

/// Snapshot feed backed by an HTTP JSON endpoint.
pub struct HttpSnapshotFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpSnapshotFeed {
    /// Create a feed for the given endpoint with the default timeout.
    pub fn new(url: impl Into<String>) -> Result<Self, FeedError> {
        Self::with_timeout(url, DEFAULT_FETCH_TIMEOUT)
    }

    /// Create a feed with a custom request timeout.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Client(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// The endpoint this feed polls.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl SnapshotFeed for HttpSnapshotFeed {
    fn fetch(&self) -> Pin<Box<dyn Future<Output = Result<Vec<RawVehicle>, FeedError>> + Send + '_>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| FeedError::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FeedError::Status(status.as_u16()));
            }

            response
                .json::<Vec<RawVehicle>>()
                .await
                .map_err(|e| FeedError::Decode(e.to_string()))
        })
    }
}
