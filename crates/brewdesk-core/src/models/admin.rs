use serde::{Deserialize, Serialize};

use crate::utils::{capitalize, format_date, format_datetime};

/// Cached copy of the signed-in administrator.
///
/// Every field is optional and defaulted so that a partial or older cached
/// record still deserializes. The backend stays the source of truth; this is
/// only what was returned at login time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(default)]
pub struct AdminProfile {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub last_login: Option<String>,
    pub created_at: Option<String>,
}

impl AdminProfile {
    /// Name to greet the admin with: full name, else email, else "Admin"
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.email.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or("Admin")
            .to_string()
    }

    pub fn role_display(&self) -> String {
        match self.role.as_deref() {
            Some(role) if !role.is_empty() => capitalize(role),
            _ => "Admin".to_string(),
        }
    }

    pub fn last_login_display(&self) -> String {
        match &self.last_login {
            Some(ts) => format_datetime(ts),
            None => "Never".to_string(),
        }
    }

    pub fn member_since_display(&self) -> String {
        match &self.created_at {
            Some(ts) => format_date(ts),
            None => "N/A".to_string(),
        }
    }
}
