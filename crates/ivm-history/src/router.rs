//! Persistence router
//!
//! Guests read and write the local bounded store; authenticated users go to
//! the remote store keyed by their identity. Failures on either side are
//! logged and swallowed.
//!
//! Local store calls may block on file I/O, so the async entry points run
//! them on the blocking pool.

use crate::local::{BoundedHistory, JsonFileStore, LocalStore, MemoryStore, DEFAULT_CAPACITY};
use crate::record::{Identity, SessionRecord};
use crate::remote::RemoteHistoryStore;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Where a request is served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Local bounded store (guest)
    Local,
    /// Remote store keyed by identity
    Remote,
}

/// Pick a backend for `identity`
#[inline]
#[must_use]
pub fn route(identity: Option<&Identity>) -> Backend {
    match identity {
        Some(_) => Backend::Remote,
        None => Backend::Local,
    }
}

/// History persistence settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Records kept in the local store
    pub capacity: usize,
    /// Local JSON file; in-memory when unset
    pub path: Option<PathBuf>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            path: None,
        }
    }
}

/// Routes history reads and writes by identity
pub struct HistoryRouter {
    local: Arc<BoundedHistory>,
    remote: Arc<dyn RemoteHistoryStore>,
}

impl HistoryRouter {
    /// Create router
    pub fn new(
        local: impl LocalStore + 'static,
        remote: Arc<dyn RemoteHistoryStore>,
        capacity: usize,
    ) -> Self {
        Self {
            local: Arc::new(BoundedHistory::new(local, capacity)),
            remote,
        }
    }

    /// Local store from `config`: a JSON file when a path is set, memory
    /// otherwise
    pub fn from_config(config: &HistoryConfig, remote: Arc<dyn RemoteHistoryStore>) -> Self {
        match &config.path {
            Some(path) => Self::new(JsonFileStore::new(path), remote, config.capacity),
            None => Self::new(MemoryStore::new(), remote, config.capacity),
        }
    }

    /// Records for `identity`, or the local records for a guest
    pub async fn load(&self, identity: Option<&Identity>) -> Vec<SessionRecord> {
        match identity {
            None => self.with_local(BoundedHistory::load).await.unwrap_or_default(),
            Some(identity) => match self.remote.load(identity).await {
                Ok(records) => records,
                Err(err) => {
                    tracing::warn!(
                        uid = %identity.uid,
                        error = %err,
                        transient = err.is_transient(),
                        "remote history load failed"
                    );
                    Vec::new()
                }
            },
        }
    }

    /// Persist `record` for `identity`, or locally for a guest
    pub async fn save(&self, identity: Option<&Identity>, record: SessionRecord) {
        let backend = route(identity);
        tracing::debug!(?backend, id = %record.id, "saving session");
        match identity {
            None => {
                self.with_local(move |local| local.append(record)).await;
            }
            Some(identity) => {
                if let Err(err) = self.remote.save(identity, record).await {
                    tracing::warn!(
                        uid = %identity.uid,
                        error = %err,
                        transient = err.is_transient(),
                        "remote history save failed"
                    );
                }
            }
        }
    }

    /// Local records only, available before auth resolves.
    ///
    /// Reads the local store on the calling thread.
    #[must_use]
    pub fn load_local(&self) -> Vec<SessionRecord> {
        self.local.load()
    }

    async fn with_local<T, F>(&self, op: F) -> Option<T>
    where
        F: FnOnce(&BoundedHistory) -> T + Send + 'static,
        T: Send + 'static,
    {
        let local = Arc::clone(&self.local);
        match tokio::task::spawn_blocking(move || op(&local)).await {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::error!(error = %err, "local history task failed");
                None
            }
        }
    }

    /// Local store capacity
    #[inline]
    #[must_use]
    pub fn local_capacity(&self) -> usize {
        self.local.capacity()
    }
}

impl std::fmt::Debug for HistoryRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryRouter")
            .field("local", &self.local)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use crate::remote::{InMemoryRemoteStore, MockRemoteHistoryStore};

    #[test]
    fn routing_decision() {
        assert_eq!(route(None), Backend::Local);
        assert_eq!(route(Some(&Identity::new("u"))), Backend::Remote);
    }

    #[test]
    fn config_picks_local_backing() {
        let dir = tempfile::tempdir().unwrap();
        let config = HistoryConfig {
            capacity: 3,
            path: Some(dir.path().join("nested").join("history.json")),
        };
        let router = HistoryRouter::from_config(&config, Arc::new(InMemoryRemoteStore::new()));
        assert_eq!(router.local_capacity(), 3);
        assert!(format!("{router:?}").contains("history.json"));

        let router =
            HistoryRouter::from_config(&HistoryConfig::default(), Arc::new(InMemoryRemoteStore::new()));
        assert_eq!(router.local_capacity(), DEFAULT_CAPACITY);
    }

    #[tokio::test]
    async fn guest_never_touches_remote() {
        let mut remote = MockRemoteHistoryStore::new();
        remote.expect_load().never();
        remote.expect_save().never();
        let router = HistoryRouter::new(MemoryStore::new(), Arc::new(remote), 20);

        router.save(None, SessionRecord::new("Acme", vec![])).await;
        assert_eq!(router.load(None).await.len(), 1);
    }

    #[tokio::test]
    async fn identity_delegates_to_remote() {
        let mut remote = MockRemoteHistoryStore::new();
        remote
            .expect_save()
            .withf(|id, record| id.uid == "ada" && record.company == "Acme")
            .times(1)
            .returning(|_, _| Ok(()));
        remote
            .expect_load()
            .withf(|id| id.uid == "ada")
            .times(1)
            .returning(|_| Ok(vec![SessionRecord::new("Acme", vec![])]));
        let local = MemoryStore::new();
        let router = HistoryRouter::new(local, Arc::new(remote), 20);
        let ada = Identity::new("ada");

        router
            .save(Some(&ada), SessionRecord::new("Acme", vec![]))
            .await;
        assert_eq!(router.load(Some(&ada)).await.len(), 1);
        assert!(router.load_local().is_empty());
    }

    #[tokio::test]
    async fn remote_failures_are_swallowed() {
        let mut remote = MockRemoteHistoryStore::new();
        remote
            .expect_save()
            .returning(|_, _| Err(PersistenceError::Unavailable("offline".into())));
        remote
            .expect_load()
            .returning(|_| Err(PersistenceError::Unavailable("offline".into())));
        let router = HistoryRouter::new(MemoryStore::new(), Arc::new(remote), 20);
        let ada = Identity::new("ada");

        router
            .save(Some(&ada), SessionRecord::new("Acme", vec![]))
            .await;
        assert!(router.load(Some(&ada)).await.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn guest_file_history_off_runtime_threads() {
        let dir = tempfile::tempdir().unwrap();
        let config = HistoryConfig {
            capacity: 2,
            path: Some(dir.path().join("history.json")),
        };
        let router = HistoryRouter::from_config(&config, Arc::new(InMemoryRemoteStore::new()));

        for n in 0..3 {
            router
                .save(None, SessionRecord::new(format!("Company {n}"), vec![]))
                .await;
        }

        let records = router.load(None).await;
        let companies: Vec<_> = records.into_iter().map(|r| r.company).collect();
        assert_eq!(companies, vec!["Company 1", "Company 2"]);
        assert!(dir.path().join("history.json").exists());
    }
}
