//! Persistence errors
//!
//! History is advisory: the router logs these and carries on, they never
//! reach the caller's primary flow.

/// Persistence error type
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Backing file could not be read or written
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored content is not a valid record list
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store refused the write for size
    #[error("quota exceeded: {needed} bytes > {limit} bytes")]
    QuotaExceeded {
        /// Bytes the write needed
        needed: usize,
        /// Bytes the store allows
        limit: usize,
    },

    /// Backend not reachable
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl PersistenceError {
    /// Whether a later retry could succeed
    #[inline]
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}
