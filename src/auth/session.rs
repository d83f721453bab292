//! Process-wide "current user" cell.
//!
//! The auth provider owns the cell and is the only writer. Views receive a
//! cloned [`AuthState`] handle and read or subscribe to it.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub uid: String,
}

impl SessionUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self { uid: uid.into() }
    }
}

#[derive(Clone)]
pub struct AuthState {
    tx: Arc<watch::Sender<Option<SessionUser>>>,
}

impl Default for AuthState {
    fn default() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.tx.borrow().clone()
    }

    /// Listen for changes. Dropping the returned handle unsubscribes.
    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn sign_in(&self, user: SessionUser) {
        info!(uid = %user.uid, "signed in");
        self.tx.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        info!("signed out");
        self.tx.send_replace(None);
    }

    /// Live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

pub struct AuthSubscription {
    rx: watch::Receiver<Option<SessionUser>>,
}

impl AuthSubscription {
    /// Current value, marking it as seen.
    pub fn current(&mut self) -> Option<SessionUser> {
        self.rx.borrow_and_update().clone()
    }

    /// Current value without marking it as seen.
    pub fn peek(&self) -> Option<SessionUser> {
        self.rx.borrow().clone()
    }

    /// Wait for the next change. `false` once the provider is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
