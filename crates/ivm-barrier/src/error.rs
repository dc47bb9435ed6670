//! Error types for the readiness barrier

use crate::phase::PhaseState;

/// Barrier error type
///
/// Every variant is a programmer error: gate names are fixed at
/// construction and the callback slot is single-use, so none of these
/// should surface in a correctly wired screen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BarrierError {
    /// Gate name was not part of the configured set
    #[error("invalid gate: {0}")]
    InvalidGate(String),

    /// A completion callback is already registered (or already ran)
    #[error("completion callback already registered")]
    CallbackAlreadyRegistered,

    /// Timers need a tokio runtime to be spawned onto
    #[error("no tokio runtime available to drive barrier timers")]
    NoRuntime,

    /// Phase transition outside the forward-only table
    #[error("illegal phase transition: {from} -> {to}")]
    IllegalTransition {
        /// Current phase
        from: PhaseState,
        /// Requested phase
        to: PhaseState,
    },
}

impl BarrierError {
    /// Create invalid gate error
    #[inline]
    pub fn invalid_gate(name: impl Into<String>) -> Self {
        Self::InvalidGate(name.into())
    }
}
