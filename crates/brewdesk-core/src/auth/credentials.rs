use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "brewdesk";

/// Admin passwords remembered in the OS keychain.
///
/// The same email can be an admin on several backends (staging, a second
/// shop) with different passwords, so entries are scoped to a backend URL.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    backend: String,
}

impl CredentialStore {
    pub fn for_backend(base_url: &str) -> Self {
        Self {
            backend: base_url.trim().trim_end_matches('/').to_ascii_lowercase(),
        }
    }

    /// Keychain account name for an email on this backend
    fn account(&self, email: &str) -> String {
        format!("{} {}", email.trim().to_ascii_lowercase(), self.backend)
    }

    fn entry(&self, email: &str) -> Result<Entry> {
        Entry::new(SERVICE_NAME, &self.account(email)).context("Failed to create keyring entry")
    }

    pub fn store(&self, email: &str, password: &str) -> Result<()> {
        self.entry(email)?
            .set_password(password)
            .context("Failed to store password in keychain")
    }

    pub fn get_password(&self, email: &str) -> Result<String> {
        self.entry(email)?
            .get_password()
            .context("Failed to retrieve password from keychain")
    }

    pub fn delete(&self, email: &str) -> Result<()> {
        self.entry(email)?
            .delete_credential()
            .context("Failed to delete credential from keychain")
    }

    pub fn has_credentials(&self, email: &str) -> bool {
        self.entry(email)
            .and_then(|entry| Ok(entry.get_password()?))
            .is_ok()
    }
}
