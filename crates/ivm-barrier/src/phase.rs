//! Phase state machine
//!
//! `Entering -> Settled -> Exiting -> Finished`, strictly forward. The
//! barrier may fire before the entrance animation settles, so
//! `Entering -> Exiting` is also legal.

use crate::error::BarrierError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Presentation phase of a gated component
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseState {
    /// Entrance animation in progress
    Entering,
    /// Entrance finished, barrier evaluation active
    Settled,
    /// Barrier satisfied, exit animation in progress
    Exiting,
    /// Terminal; the component should unmount
    Finished,
}

impl PhaseState {
    /// Terminal phase check
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Stable lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entering => "entering",
            Self::Settled => "settled",
            Self::Exiting => "exiting",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for PhaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates a phase transition.
pub fn validate_transition(from: PhaseState, to: PhaseState) -> Result<(), BarrierError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(BarrierError::IllegalTransition { from, to })
    }
}

/// Phases reachable in one step from `from`.
#[must_use]
pub fn allowed_transitions(from: PhaseState) -> Vec<PhaseState> {
    use PhaseState::*;
    match from {
        Entering => vec![Settled, Exiting],
        Settled => vec![Exiting],
        Exiting => vec![Finished],
        Finished => vec![],
    }
}

fn allowed(from: PhaseState, to: PhaseState) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
