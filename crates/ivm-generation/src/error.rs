//! Error types for interview generation
//!
//! - `ValidationError`: form input rejected before anything starts
//! - `OperationError`: the wrapped remote call failed with a classifiable code
//!
//! Both are recovered locally and rendered as inline text; `Display` on
//! `ValidationError` and `OperationErrorKind::user_message` are the
//! user-facing copy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fallback copy for any failure code not in the table
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate interview. Please try again.";

/// User-input precondition failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Company name shorter than the minimum once trimmed
    #[error("Please enter a valid company name.")]
    CompanyNameTooShort {
        /// Minimum accepted length in characters
        min: usize,
    },

    /// Job description below the word floor
    #[error(
        "Job description needs at least {required} words (currently {words}). Paste the full job posting for better questions."
    )]
    DescriptionTooShort {
        /// Words present
        words: usize,
        /// Words required
        required: usize,
    },
}

/// Closed set of failure kinds the generation service reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationErrorKind {
    /// Request rejected as malformed
    InvalidArgument,
    /// Rate limit or quota hit
    ResourceExhausted,
    /// Service did not answer in time
    DeadlineExceeded,
    /// Service temporarily down
    Unavailable,
    /// Caller's session is no longer valid
    Unauthenticated,
    /// Anything else
    Unknown,
}

impl OperationErrorKind {
    /// Every kind with a dedicated message
    pub const KNOWN: [Self; 5] = [
        Self::InvalidArgument,
        Self::ResourceExhausted,
        Self::DeadlineExceeded,
        Self::Unavailable,
        Self::Unauthenticated,
    ];

    /// Classify a raw service code
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "invalid-argument" => Self::InvalidArgument,
            "resource-exhausted" => Self::ResourceExhausted,
            "deadline-exceeded" => Self::DeadlineExceeded,
            "unavailable" => Self::Unavailable,
            "unauthenticated" => Self::Unauthenticated,
            _ => Self::Unknown,
        }
    }

    /// Wire code, `None` for `Unknown`
    #[must_use]
    pub fn code(self) -> Option<&'static str> {
        match self {
            Self::InvalidArgument => Some("invalid-argument"),
            Self::ResourceExhausted => Some("resource-exhausted"),
            Self::DeadlineExceeded => Some("deadline-exceeded"),
            Self::Unavailable => Some("unavailable"),
            Self::Unauthenticated => Some("unauthenticated"),
            Self::Unknown => None,
        }
    }

    /// User-facing copy
    #[must_use]
    pub fn user_message(self) -> &'static str {
        match self {
            Self::InvalidArgument => {
                "The job description could not be processed. Check it and try again."
            }
            Self::ResourceExhausted => {
                "Too many requests right now. Please wait a moment and try again."
            }
            Self::DeadlineExceeded => "Generating questions took too long. Please try again.",
            Self::Unavailable => {
                "The interview service is temporarily unavailable. Please try again shortly."
            }
            Self::Unauthenticated => "Your session has expired. Sign in again to continue.",
            Self::Unknown => GENERIC_FAILURE_MESSAGE,
        }
    }

    /// Whether trying again unchanged might succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::ResourceExhausted | Self::DeadlineExceeded | Self::Unavailable | Self::Unknown
        )
    }
}

impl fmt::Display for OperationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code().unwrap_or("unknown"))
    }
}

/// Failure of the wrapped asynchronous operation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("operation failed ({code}): {detail}")]
pub struct OperationError {
    /// Raw code reported by the service
    pub code: String,
    /// Diagnostic detail, never shown to the user
    pub detail: String,
}

impl OperationError {
    /// Create operation error
    #[inline]
    pub fn new(code: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            detail: detail.into(),
        }
    }

    /// Classified kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> OperationErrorKind {
        OperationErrorKind::from_code(&self.code)
    }

    /// User-facing copy for this failure
    #[inline]
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        self.kind().user_message()
    }
}
