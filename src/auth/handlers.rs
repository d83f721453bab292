use axum::{extract::State, routing::get, Json, Router};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    directory::{dto::ProfileResponse, services::DirectoryLister},
    error::AppError,
    state::AppState,
};

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip_all)]
pub async fn get_me(
    State(lister): State<DirectoryLister>,
    AuthUser(user): AuthUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = lister.profile(&user.uid).await?;
    Ok(Json(profile.into()))
}
