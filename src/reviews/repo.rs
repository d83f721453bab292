use crate::directory::repo::USERS;
use crate::reviews::repo_types::RawReview;
use crate::store::{DocumentStore, StoreError};

pub const REVIEWS: &str = "reviews";

impl RawReview {
    /// The full review collection of one user, in store order.
    // TODO: page through `users/{uid}/reviews` once doctors accumulate
    // enough reviews for a single fetch to hurt.
    pub async fn list_for_user(
        store: &dyn DocumentStore,
        uid: &str,
    ) -> Result<Vec<RawReview>, StoreError> {
        let parent = format!("{USERS}/{uid}");
        let records = store.query_nested(&parent, REVIEWS).await?;
        Ok(records.into_iter().map(RawReview::from).collect())
    }
}
