use thiserror::Error;

/// Errors produced while fetching and analysing an artist catalog.
///
/// Stage-1 (album listing) errors are fatal for a run. The same errors raised
/// while fetching tracks or audio features are treated as soft failures by
/// the pipeline and only show up in the skip summary.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The client-credentials exchange failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Non-retryable 4xx response
    #[error("Request to {path} rejected with status {status}")]
    RequestRejected { path: String, status: u16 },

    /// 429 responses exhausted the retry budget, or the server asked for a
    /// `Retry-After` wait too long to honor
    #[error("Rate limit exceeded for {path} after {attempts} attempts{}", retry_hint(.retry_after))]
    RateLimitExceeded {
        path: String,
        attempts: u32,
        retry_after: Option<u64>,
    },

    /// 5xx responses or transport failures exhausted the retry budget
    #[error("Upstream unavailable for {path} after {attempts} attempts{}", last_status(.status))]
    UpstreamUnavailable {
        path: String,
        attempts: u32,
        status: Option<u16>,
    },

    /// A success response whose body could not be decoded
    #[error("Malformed response from {path}: {reason}")]
    MalformedResponse { path: String, reason: String },

    /// Aggregation was handed no records at all
    #[error("No records to aggregate")]
    EmptyInput,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// HTTP status attached to the error, if the remote side answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            CatalogError::RequestRejected { status, .. } => Some(*status),
            CatalogError::RateLimitExceeded { .. } => Some(429),
            CatalogError::UpstreamUnavailable { status, .. } => *status,
            _ => None,
        }
    }
}

fn last_status(status: &Option<u16>) -> String {
    match status {
        Some(s) => format!(" (last status {})", s),
        None => String::new(),
    }
}

fn retry_hint(retry_after: &Option<u64>) -> String {
    match retry_after {
        Some(secs) => format!(" (server asked to retry after {} seconds)", secs),
        None => String::new(),
    }
}
