use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::auth::session::{AuthState, SessionUser};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Authenticated(SessionUser),
    Unauthenticated,
}

/// Fire-and-forget navigation.
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

/// Remembers every redirect it was asked to make.
#[derive(Default)]
pub struct RecordingNavigator {
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn redirects(&self) -> Vec<String> {
        self.redirects
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, path: &str) {
        if let Ok(mut r) = self.redirects.lock() {
            r.push(path.to_string());
        }
    }
}

/// Blocks views for callers without a session and sends them home.
#[derive(Clone)]
pub struct AccessGate {
    navigator: Arc<dyn Navigator>,
    home_path: String,
}

impl AccessGate {
    pub fn new(navigator: Arc<dyn Navigator>, home_path: impl Into<String>) -> Self {
        Self {
            navigator,
            home_path: home_path.into(),
        }
    }

    /// The decision alone, without navigating.
    pub fn decide(current: Option<SessionUser>) -> AuthOutcome {
        match current {
            Some(user) => AuthOutcome::Authenticated(user),
            None => AuthOutcome::Unauthenticated,
        }
    }

    /// Decide for `current` and redirect when there is no session.
    pub fn check(&self, current: Option<SessionUser>) -> AuthOutcome {
        let outcome = Self::decide(current);
        if outcome == AuthOutcome::Unauthenticated {
            debug!(to = %self.home_path, "unauthenticated, redirecting");
            self.navigator.redirect(&self.home_path);
        }
        outcome
    }

    pub fn check_access(&self, auth: &AuthState) -> AuthOutcome {
        self.check(auth.current_user())
    }
}
