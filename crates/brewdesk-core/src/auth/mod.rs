//! Authentication: the persisted session and the login lifecycle.
//!
//! This module provides:
//! - `SessionStore`: bearer token + cached admin profile over a durable
//!   `KeyValueStore` (`FileStore` on disk, `MemoryStore` in process)
//! - `Authenticator`: login / logout / resume state machine
//! - `SessionObserver`: how the application hears about session changes
//! - `CredentialStore`: optional OS keychain storage of the admin password

pub mod credentials;
pub mod events;
pub mod flow;
pub mod session;
pub mod storage;

pub use credentials::CredentialStore;
pub use events::{NoopObserver, SessionEvent, SessionObserver};
pub use flow::{AuthState, Authenticator, LoginError};
pub use session::{SessionStore, PROFILE_KEY, TOKEN_KEY};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
