//! Remote (per-identity) history store

use crate::error::PersistenceError;
use crate::record::{Identity, SessionRecord};
use async_trait::async_trait;
use dashmap::DashMap;

/// History keyed by authenticated identity
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteHistoryStore: Send + Sync {
    /// All records for `identity`, oldest first
    async fn load(&self, identity: &Identity) -> Result<Vec<SessionRecord>, PersistenceError>;

    /// Append one record for `identity`
    async fn save(&self, identity: &Identity, record: SessionRecord)
        -> Result<(), PersistenceError>;
}

/// In-process remote store, one list per uid
#[derive(Debug, Default)]
pub struct InMemoryRemoteStore {
    sessions: DashMap<String, Vec<SessionRecord>>,
}

impl InMemoryRemoteStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held for `uid`
    #[must_use]
    pub fn count(&self, uid: &str) -> usize {
        self.sessions.get(uid).map_or(0, |v| v.len())
    }
}

#[async_trait]
impl RemoteHistoryStore for InMemoryRemoteStore {
    async fn load(&self, identity: &Identity) -> Result<Vec<SessionRecord>, PersistenceError> {
        Ok(self
            .sessions
            .get(&identity.uid)
            .map(|v| v.clone())
            .unwrap_or_default())
    }

    async fn save(
        &self,
        identity: &Identity,
        record: SessionRecord,
    ) -> Result<(), PersistenceError> {
        self.sessions
            .entry(identity.uid.clone())
            .or_default()
            .push(record);
        Ok(())
    }
}
