use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

/// Failures surfaced to a single view or request. Auth absence is not an
/// error: it is handled by the access gate as a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("{0} not found")]
    NotFound(String),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => AppError::StoreUnavailable(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::StoreUnavailable(msg) => {
                error!(error = %msg, "store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Service temporarily unavailable, please retry".to_string(),
                )
                    .into_response()
            }
            AppError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{what} not found")).into_response()
            }
        }
    }
}
