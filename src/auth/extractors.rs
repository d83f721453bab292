use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::Redirect,
};
use tracing::warn;

use super::gate::{AccessGate, AuthOutcome};
use super::jwt::JwtKeys;
use super::session::SessionUser;
use crate::state::AppState;

/// Session carried by a bearer token, if any valid one is present.
fn session_from_parts(parts: &Parts, keys: &JwtKeys) -> Option<SessionUser> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth
        .strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))?;

    match keys.verify(token) {
        Ok(claims) => Some(SessionUser::new(claims.sub)),
        Err(e) => {
            warn!(error = %e, "invalid or expired token");
            None
        }
    }
}

/// Gated routes: an authenticated caller, or a redirect to the home path.
pub struct AuthUser(pub SessionUser);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        match AccessGate::decide(session_from_parts(parts, &keys)) {
            AuthOutcome::Authenticated(user) => Ok(AuthUser(user)),
            AuthOutcome::Unauthenticated => Err(Redirect::to(&state.config.home_path)),
        }
    }
}

/// Public routes that render differently for signed-in callers.
pub struct MaybeUser(pub Option<SessionUser>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        Ok(MaybeUser(session_from_parts(parts, &keys)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        http::{header, Request, StatusCode},
        response::IntoResponse,
    };

    fn parts(auth: Option<&str>) -> Parts {
        let mut req = Request::builder().uri("/api/v1/doctors");
        if let Some(v) = auth {
            req = req.header(header::AUTHORIZATION, v);
        }
        req.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn valid_token_passes_the_gate() {
        let state = AppState::fake();
        let token = JwtKeys::from_ref(&state).sign("doc-1").unwrap();
        let mut p = parts(Some(&format!("Bearer {token}")));
        let AuthUser(user) = AuthUser::from_request_parts(&mut p, &state)
            .await
            .unwrap_or_else(|_| panic!("expected authenticated caller"));
        assert_eq!(user.uid, "doc-1");
    }

    #[tokio::test]
    async fn missing_or_bad_token_redirects_home() {
        let state = AppState::fake();
        for auth in [None, Some("Bearer nope"), Some("Basic abc")] {
            let mut p = parts(auth);
            let Err(redirect) = AuthUser::from_request_parts(&mut p, &state).await else {
                panic!("expected redirect for {auth:?}");
            };
            let res = redirect.into_response();
            assert_eq!(res.status(), StatusCode::SEE_OTHER);
            assert_eq!(res.headers()[header::LOCATION], "/");
        }
    }

    #[tokio::test]
    async fn maybe_user_never_rejects() {
        let state = AppState::fake();
        let mut p = parts(None);
        let MaybeUser(user) = MaybeUser::from_request_parts(&mut p, &state).await.unwrap();
        assert!(user.is_none());
    }
}
