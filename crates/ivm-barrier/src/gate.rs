//! Readiness set: fixed gate names mapped to satisfied flags

use crate::error::BarrierError;
use std::collections::BTreeMap;

/// Gate name to "satisfied" flag.
///
/// The key set is fixed at construction. A flag never goes back to
/// `false` once set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadinessSet {
    gates: BTreeMap<String, bool>,
}

impl ReadinessSet {
    /// Create a set with every gate unsatisfied
    #[must_use]
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            gates: names.into_iter().map(|n| (n.into(), false)).collect(),
        }
    }

    /// Whether `name` is a configured gate
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.gates.contains_key(name)
    }

    /// Mark a gate satisfied.
    ///
    /// Returns `true` if the gate flipped on this call, `false` if it was
    /// already satisfied.
    ///
    /// # Errors
    /// - `BarrierError::InvalidGate` if `name` is not configured; the set is
    ///   left untouched
    pub fn mark(&mut self, name: &str) -> Result<bool, BarrierError> {
        let flag = self
            .gates
            .get_mut(name)
            .ok_or_else(|| BarrierError::invalid_gate(name))?;
        let newly = !*flag;
        *flag = true;
        Ok(newly)
    }

    /// Satisfied flag for one gate, `None` if unknown
    #[inline]
    #[must_use]
    pub fn is_satisfied(&self, name: &str) -> Option<bool> {
        self.gates.get(name).copied()
    }

    /// True iff every configured gate is satisfied (vacuously true when empty)
    #[inline]
    #[must_use]
    pub fn all_satisfied(&self) -> bool {
        self.gates.values().all(|v| *v)
    }

    /// Names of gates still waiting
    #[must_use]
    pub fn pending(&self) -> Vec<String> {
        self.gates
            .iter()
            .filter(|(_, v)| !**v)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Number of configured gates
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// No gates configured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}
