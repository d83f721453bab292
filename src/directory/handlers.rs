use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    directory::{dto::DirectoryEntry, services::DirectoryLister},
    error::AppError,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/doctors", get(list_doctors))
}

#[instrument(skip_all)]
pub async fn list_doctors(
    State(lister): State<DirectoryLister>,
    AuthUser(_caller): AuthUser,
) -> Result<Json<Vec<DirectoryEntry>>, AppError> {
    let doctors = lister.doctors().await?;
    Ok(Json(doctors.into_iter().map(DirectoryEntry::from).collect()))
}
