use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// A single upstream request gone wrong. HTTP status failures, parse
/// failures and not-found are kept distinct so callers can decide what is
/// worth retrying.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} from {url}")]
    Http { status: StatusCode, url: String },

    #[error("not found: {url}")]
    NotFound { url: String },

    #[error("malformed payload from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ProviderError {
    /// Whether another attempt could plausibly succeed. A missing resource
    /// or a payload we cannot decode will not get better by asking again.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::Network { .. } => true,
            ProviderError::Http { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ProviderError::NotFound { .. } | ProviderError::Decode { .. } => false,
        }
    }
}

/// Why a full cache refresh failed. Per-game summary failures never reach
/// this level; only the schedule fetch and the overall deadline do.
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("schedule fetch failed: {0}")]
    Upstream(#[from] ProviderError),

    #[error("refresh did not finish within {0:?}")]
    Timeout(Duration),
}

/// The only error a caller of the cache ever sees: a refresh failed and
/// there is no previous entry to fall back on.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("no cached games and refresh failed: {source}")]
    Unavailable {
        #[source]
        source: Arc<RefreshError>,
    },
}
