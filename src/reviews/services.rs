use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{debug, info, instrument, warn};

use crate::error::AppError;
use crate::reviews::aggregate::{summarize, ReviewSummary};
use crate::reviews::repo_types::RawReview;
use crate::state::AppState;
use crate::store::DocumentStore;

/// Result of an operation that may not have had enough input to run yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Pending,
    Ready(T),
}

#[derive(Clone)]
pub struct ReviewAggregator {
    store: Arc<dyn DocumentStore>,
}

impl ReviewAggregator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetch and summarise every review of `doctor_uid`. A blank or absent
    /// uid stays `Pending` and touches no store.
    #[instrument(skip(self))]
    pub async fn review_summary(
        &self,
        doctor_uid: Option<&str>,
    ) -> Result<Outcome<ReviewSummary>, AppError> {
        let Some(uid) = doctor_uid.filter(|t| !t.trim().is_empty()) else {
            debug!("no target yet, staying pending");
            return Ok(Outcome::Pending);
        };

        let reviews = RawReview::list_for_user(self.store.as_ref(), uid).await?;
        let summary = summarize(reviews);

        for bad in &summary.rejected {
            warn!(%uid, review_id = %bad.review_id, reason = %bad.reason, "malformed review skipped");
        }
        info!(
            %uid,
            reviews = summary.display_items.len(),
            rejected = summary.rejected.len(),
            average = %summary.average,
            "review summary computed"
        );
        Ok(Outcome::Ready(summary))
    }
}

impl FromRef<AppState> for ReviewAggregator {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.store.clone())
    }
}
