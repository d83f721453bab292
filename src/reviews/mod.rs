pub mod aggregate;
pub mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use aggregate::{AggregateRating, Decimal2, DisplayItem, MalformedReview, ReviewSummary};
pub use services::{Outcome, ReviewAggregator};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::read_routes())
}
