//! Core library for brewdesk, the admin console of a coffee-shop ordering
//! backend.
//!
//! - `auth`: persisted session, login lifecycle, keychain credentials
//! - `api`: the gateway every backend request goes through
//! - `models`: orders, products, dashboard stats, admin profile
//! - `notify`: user-visible notifications, rendered by the front end
//! - `config`: backend URL, timeout and directories
//! - `utils`: display formatting

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod notify;
pub mod utils;

pub use api::{ApiClient, ApiError, GatewayConfig};
pub use auth::{Authenticator, SessionStore};
pub use config::Config;
pub use notify::{Notification, NotificationKind, Notifier};
