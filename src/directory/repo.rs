use tracing::warn;

use crate::directory::repo_types::{Role, User};
use crate::store::{DocumentStore, Filter, Record, StoreError};

pub const USERS: &str = "users";

fn decode_users(records: Vec<Record>) -> impl Iterator<Item = User> {
    records.into_iter().filter_map(|record| {
        let id = record.id.clone();
        User::from_record(record)
            .map_err(|e| warn!(error = %e, uid = %id, "skipping malformed user document"))
            .ok()
    })
}

impl User {
    /// Every user whose role equals `role` exactly, in store order.
    pub async fn list_by_role(
        store: &dyn DocumentStore,
        role: &Role,
    ) -> Result<Vec<User>, StoreError> {
        let records = store
            .query(USERS, &[Filter::eq("userType", role.as_str())])
            .await?;
        // Adapters filter already; re-check so a loose adapter cannot widen
        // the result.
        Ok(decode_users(records).filter(|u| &u.role == role).collect())
    }

    pub async fn find_by_uid(
        store: &dyn DocumentStore,
        uid: &str,
    ) -> Result<Option<User>, StoreError> {
        let records = store.query(USERS, &[Filter::eq("uid", uid)]).await?;
        Ok(decode_users(records).find(|u| u.uid == uid))
    }
}
