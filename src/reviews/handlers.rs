use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppError,
    reviews::{dto::ReviewSummaryResponse, services::ReviewAggregator},
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/doctors/:uid/reviews", get(get_review_summary))
}

#[instrument(skip_all)]
pub async fn get_review_summary(
    State(aggregator): State<ReviewAggregator>,
    AuthUser(_caller): AuthUser,
    Path(uid): Path<String>,
) -> Result<Json<ReviewSummaryResponse>, AppError> {
    let outcome = aggregator.review_summary(Some(&uid)).await?;
    Ok(Json(ReviewSummaryResponse::new(uid, outcome)))
}
