//! Interview history persistence
//!
//! Decides, per identity, whether history goes to a local bounded store
//! (guests) or a remote store (signed-in users). Persistence is best-effort:
//! nothing here ever fails the caller.

#![warn(unreachable_pub)]

pub mod error;
pub mod local;
pub mod record;
pub mod remote;
pub mod router;

pub use error::PersistenceError;
pub use local::{BoundedHistory, JsonFileStore, LocalStore, MemoryStore, DEFAULT_CAPACITY};
pub use record::{Identity, SessionRecord};
pub use remote::{InMemoryRemoteStore, RemoteHistoryStore};
pub use router::{route, Backend, HistoryConfig, HistoryRouter};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
