use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{debug, instrument};

use crate::directory::repo_types::{Role, User};
use crate::error::AppError;
use crate::state::AppState;
use crate::store::DocumentStore;

/// Read-only view of the user directory.
#[derive(Clone)]
pub struct DirectoryLister {
    store: Arc<dyn DocumentStore>,
}

impl DirectoryLister {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Users with exactly this role. An empty list is a normal result; only
    /// an unreachable store is a failure.
    #[instrument(skip(self, role), fields(role = %role))]
    pub async fn list_by_role(&self, role: &Role) -> Result<Vec<User>, AppError> {
        let users = User::list_by_role(self.store.as_ref(), role).await?;
        debug!(count = users.len(), "directory listed");
        Ok(users)
    }

    pub async fn doctors(&self) -> Result<Vec<User>, AppError> {
        self.list_by_role(&Role::Doctor).await
    }

    pub async fn profile(&self, uid: &str) -> Result<User, AppError> {
        User::find_by_uid(self.store.as_ref(), uid)
            .await?
            .ok_or_else(|| AppError::NotFound("User".into()))
    }
}

impl FromRef<AppState> for DirectoryLister {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.store.clone())
    }
}
