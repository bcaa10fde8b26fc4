//! The retrieval pipeline: rate-limited, retrying, paginated search against
//! the Semantic Scholar Graph API.
//!
//! The pipeline runs as one logical task per search. Page requests,
//! rate-limiter waits, and backoff sleeps are its only suspension points;
//! page N+1 is never requested before page N completes. The
//! [`RateLimiter`] is an explicit dependency: callers decide whether
//! concurrent searches share one admission gate or get their own.

mod rate_limit;
mod semantic;

pub use rate_limit::RateLimiter;
pub use semantic::SemanticScholar;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Errors that can abort a search.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The API rejected the search query (HTTP 400)
    #[error("invalid search query: the API rejected the request")]
    BadQuery,

    /// Missing or rejected credentials (HTTP 401)
    #[error("unauthorized: the API key was missing or rejected")]
    Unauthorized,

    /// Access denied (HTTP 403)
    #[error("forbidden: access to the search endpoint was denied")]
    Forbidden,

    /// Endpoint or resource does not exist (HTTP 404)
    #[error("not found: the search endpoint does not exist")]
    NotFound,

    /// The API itself failed (HTTP 500)
    #[error("upstream server failure")]
    Upstream,

    /// Any other non-success status
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(u16),

    /// Connection or timeout failures that survived every retry
    #[error("network failure after {attempts} attempts: {source}")]
    Network {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be decoded
    #[error("failed to decode search response: {0}")]
    Parse(String),
}

/// Cooperative cancellation flag for an in-flight search.
///
/// The pipeline checks the flag before each page request and before each
/// backoff sleep. A cancelled search returns the records accumulated so far
/// rather than discarding them.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; visible to all clones.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
