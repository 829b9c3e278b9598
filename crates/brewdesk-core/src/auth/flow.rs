use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use super::{SessionEvent, SessionObserver};
use crate::api::{ApiClient, ApiError, LoginResponse};
use crate::models::AdminProfile;
use crate::notify::Notification;

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Anonymous,
    Authenticating,
    Authenticated(AdminProfile),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }

    pub fn profile(&self) -> Option<&AdminProfile> {
        match self {
            AuthState::Authenticated(profile) => Some(profile),
            _ => None,
        }
    }
}

/// Why a login attempt failed. `Display` is the message shown to the user.
#[derive(Error, Debug)]
pub enum LoginError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("{0}")]
    Rejected(String),

    #[error("Server error. Please try again later.")]
    Server,

    #[error("Cannot connect to server. Please check if backend is running.")]
    Unreachable,

    #[error("Invalid response from server")]
    InvalidResponse,

    #[error("Login failed.")]
    Failed(#[source] ApiError),
}

impl From<ApiError> for LoginError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => LoginError::InvalidCredentials,
            ApiError::BadRequest { detail } => {
                LoginError::Rejected(detail.unwrap_or_else(|| "Invalid request.".to_string()))
            }
            ApiError::ServerError(_) => LoginError::Server,
            ApiError::Forbidden(body) => LoginError::Rejected(
                ApiError::detail_from_body(&body).unwrap_or_else(|| "Error 403".to_string()),
            ),
            ApiError::NotFound { .. } => LoginError::Rejected("Error 404".to_string()),
            ApiError::Status { status, detail } => LoginError::Rejected(
                detail.unwrap_or_else(|| format!("Error {}", status.as_u16())),
            ),
            ApiError::Timeout | ApiError::Network(_) => LoginError::Unreachable,
            ApiError::InvalidResponse(_) => LoginError::InvalidResponse,
            other @ ApiError::Local(_) => LoginError::Failed(other),
        }
    }
}

/// Keeps the published state in step with session events before passing
/// them on to the application's observer.
struct StateRelay {
    state: watch::Sender<AuthState>,
    observer: Arc<dyn SessionObserver>,
}

impl SessionObserver for StateRelay {
    fn on_login_view(&self) -> bool {
        self.observer.on_login_view()
    }

    fn on_session_event(&self, event: &SessionEvent) {
        match event {
            SessionEvent::LoggedIn(profile) => {
                self.state.send_replace(AuthState::Authenticated(profile.clone()));
            }
            SessionEvent::LoggedOut | SessionEvent::Expired => {
                self.state.send_replace(AuthState::Anonymous);
            }
        }
        self.observer.on_session_event(event);
    }
}

/// The login / logout lifecycle.
///
/// `anonymous -> authenticating -> authenticated`, and back to anonymous on
/// logout or when the gateway sees the token rejected. Owns the gateway it is
/// built with so that expiry reported by any request updates the state.
pub struct Authenticator {
    api: ApiClient,
    relay: Arc<StateRelay>,
}

impl Authenticator {
    /// Wrap a gateway. `observer` receives every session event; it replaces
    /// whatever observer the gateway had.
    pub fn new(api: ApiClient, observer: Arc<dyn SessionObserver>) -> Self {
        let initial = Self::resumed_state(&api);
        let (state, _) = watch::channel(initial);
        let relay = Arc::new(StateRelay { state, observer });
        let api = api.with_observer(relay.clone());
        Self { api, relay }
    }

    /// The gateway, for resource calls made on behalf of this session
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Session found at startup: authenticated without asking the backend if a
    /// token is stored. The profile may be stale until the next call.
    fn resumed_state(api: &ApiClient) -> AuthState {
        let session = api.session();
        if !session.is_authenticated() {
            return AuthState::Anonymous;
        }
        let profile = session.current_profile().unwrap_or_else(|| {
            warn!("Stored session has no readable profile, using defaults");
            AdminProfile::default()
        });
        info!(admin = %profile.display_name(), "Resumed stored session");
        AuthState::Authenticated(profile)
    }

    /// Re-read the stored session, e.g. after another process logged in
    pub fn resume(&self) -> AuthState {
        let state = Self::resumed_state(&self.api);
        self.relay.state.send_replace(state.clone());
        state
    }

    pub fn state(&self) -> AuthState {
        let current = self.relay.state.borrow().clone();
        // A 401 seen from the login view clears the session without an event
        if current.is_authenticated() && !self.api.session().is_authenticated() {
            self.relay.state.send_replace(AuthState::Anonymous);
            return AuthState::Anonymous;
        }
        current
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.session().is_authenticated()
    }

    pub fn current_profile(&self) -> Option<AdminProfile> {
        self.api.session().current_profile()
    }

    /// Exchange credentials for a session. On any failure the stored session
    /// and the previous state are left as they were.
    pub async fn login(&self, email: &str, password: &str) -> Result<AdminProfile, LoginError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(LoginError::MissingCredentials);
        }

        let previous = self.relay.state.send_replace(AuthState::Authenticating);

        let result = match self.api.authenticate(email, password).await {
            Ok(LoginResponse {
                access_token: Some(token),
                admin,
            }) if !token.is_empty() => Ok((token, admin)),
            Ok(_) => Err(LoginError::InvalidResponse),
            Err(e) => Err(LoginError::from(e)),
        };

        match result {
            Ok((token, admin)) => {
                self.api.session().save(&token, &admin);
                self.relay
                    .on_session_event(&SessionEvent::LoggedIn(admin.clone()));
                info!(email = email, "Login successful");
                Ok(admin)
            }
            Err(e) => {
                self.relay.state.send_replace(previous);
                warn!(email = email, error = %e, "Login failed");
                Err(e)
            }
        }
    }

    /// End the session locally. No backend call is made.
    pub fn logout(&self) {
        self.api.session().clear();
        self.relay.on_session_event(&SessionEvent::LoggedOut);
        self.api
            .notifier()
            .notify(Notification::success("Logged out successfully"));
        info!("Logged out");
    }
}
