//! Application error type
//!
//! Wraps the per-crate errors that reach a caller: barrier setup failures
//! from screen constructors, and setup failures from `try_generate`.

use ivm_barrier::BarrierError;
use ivm_generation::{OperationError, ValidationError};

/// Top-level error
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Barrier misconfiguration
    #[error("barrier error: {0}")]
    Barrier(#[from] BarrierError),

    /// Form input rejected
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Generation call failed
    #[error("generation failed: {0}")]
    Operation(#[from] OperationError),

    /// A generation is already in flight
    #[error("a generation is already running")]
    Busy,

    /// Configuration could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Create configuration error
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Operation(err) => err.kind().is_retryable(),
            Self::Busy => true,
            Self::Barrier(_) | Self::Validation(_) | Self::Config(_) => false,
        }
    }

    /// Copy to show the end user, if any
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Validation(err) => Some(err.to_string()),
            Self::Operation(err) => Some(err.user_message().to_string()),
            _ => None,
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, AppError>;
