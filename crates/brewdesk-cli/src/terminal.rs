//! Terminal side of the core's notification and session hooks.

use std::sync::atomic::{AtomicBool, Ordering};

use brewdesk_core::auth::{SessionEvent, SessionObserver};
use brewdesk_core::notify::{Notification, NotificationKind, Notifier};
use tracing::debug;

/// Prints notifications to stderr so they never mix with command output
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl TerminalNotifier {
    pub fn render(notification: &Notification) -> String {
        let marker = match notification.kind {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "✗",
            NotificationKind::Info => "•",
        };
        format!("{} {}", marker, notification.message)
    }
}

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        eprintln!("{}", Self::render(&notification));
    }
}

/// Tracks whether a login prompt is active and reacts to session changes
#[derive(Debug, Default)]
pub struct TerminalObserver {
    login_view: AtomicBool,
}

impl TerminalObserver {
    pub fn set_login_view(&self, active: bool) {
        self.login_view.store(active, Ordering::SeqCst);
    }
}

impl SessionObserver for TerminalObserver {
    fn on_login_view(&self) -> bool {
        self.login_view.load(Ordering::SeqCst)
    }

    fn on_session_event(&self, event: &SessionEvent) {
        debug!(?event, "Session event");
        if let SessionEvent::Expired = event {
            eprintln!("Run `brewdesk login` to sign in again.");
        }
    }
}
