use crate::models::AdminProfile;

/// Session transitions the application may want to react to, typically by
/// switching views.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    LoggedIn(AdminProfile),
    LoggedOut,
    /// The backend rejected the stored token; the session has already been
    /// cleared when this is delivered.
    Expired,
}

/// Supplied by the application. The gateway and the authenticator report
/// session transitions here instead of navigating on their own.
pub trait SessionObserver: Send + Sync {
    /// Whether the login view is what the user is currently looking at.
    /// An expiry seen from the login view is not reported.
    fn on_login_view(&self) -> bool {
        false
    }

    fn on_session_event(&self, event: &SessionEvent);
}

/// Observer for callers that do not navigate
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_session_event(&self, _event: &SessionEvent) {}
}
