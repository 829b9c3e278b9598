use std::sync::Arc;

use tracing::{debug, warn};

use super::storage::KeyValueStore;
use crate::models::AdminProfile;

/// Storage key for the bearer token
pub const TOKEN_KEY: &str = "admin_token";

/// Storage key for the JSON-serialized admin profile
pub const PROFILE_KEY: &str = "admin_user";

/// The persisted session: bearer token plus cached admin profile.
///
/// This is the only writer of those two entries. Every operation degrades
/// instead of failing: a storage error is logged and the session reads as
/// absent, which at worst forces a fresh login.
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Persist token and profile together
    pub fn save(&self, token: &str, profile: &AdminProfile) {
        let profile_json = match serde_json::to_string(profile) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Failed to serialize admin profile");
                return;
            }
        };

        let entries = [(TOKEN_KEY, token.to_string()), (PROFILE_KEY, profile_json)];
        match self.storage.set_many(&entries) {
            Ok(()) => debug!("Session saved"),
            Err(e) => warn!(error = %e, "Failed to persist session"),
        }
    }

    /// Cached profile, or `None` when absent or unreadable.
    /// A profile left behind without a token is not reported.
    pub fn current_profile(&self) -> Option<AdminProfile> {
        self.current_token()?;
        let raw = self.storage.get(PROFILE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed cached profile");
                None
            }
        }
    }

    pub fn current_token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_token().is_some()
    }

    /// Remove token and profile. Clearing an empty session is a no-op.
    pub fn clear(&self) {
        match self.storage.remove_many(&[TOKEN_KEY, PROFILE_KEY]) {
            Ok(()) => debug!("Session cleared"),
            Err(e) => warn!(error = %e, "Failed to remove persisted session"),
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
