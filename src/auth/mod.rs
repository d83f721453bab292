use crate::state::AppState;
use axum::Router;

pub mod claims;
pub mod extractors;
pub mod gate;
pub mod handlers;
pub mod jwt;
pub mod session;

pub use gate::{AccessGate, AuthOutcome, Navigator, RecordingNavigator};
pub use session::{AuthState, AuthSubscription, SessionUser};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::me_routes())
}
