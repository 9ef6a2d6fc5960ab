//! Remote point source and connectivity probe.

use async_trait::async_trait;
use thiserror::Error;

use crate::Point;

/// Errors from [`PointSource::fetch_points`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteFetchError {
    /// The request did not complete in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },
    /// The server answered with an error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },
    /// The request failed before a response arrived.
    #[error("network error contacting {url}: {message}")]
    Network { url: String, message: String },
    /// The response body was not a point array.
    #[error("failed to decode points from {url}: {message}")]
    Decode { url: String, message: String },
}

/// Authoritative, read-only set of collection points.
///
/// Implementations return the entire set on every call; there is no
/// pagination or server-side filtering.
#[async_trait(?Send)]
pub trait PointSource {
    /// Fetch every point.
    async fn fetch_points(&self) -> Result<Vec<Point>, RemoteFetchError>;
}

/// Reports whether the network is currently usable.
#[async_trait(?Send)]
pub trait ConnectivityProbe {
    /// Return `true` when a remote fetch is worth attempting.
    async fn is_online(&self) -> bool;
}
