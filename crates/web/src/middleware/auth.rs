//! Authentication extractors.
//!
//! Both extractors read the session installed by `SessionManagerLayer` and
//! restore the signed-in user through [`AuthService::restore`]. Using them on
//! a router without the session layer is a programmer error: the request
//! fails with a 500 and an error is logged.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// Anonymous visitors are redirected to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(current): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", current.user.display_name())
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Why an auth extractor rejected the request.
#[derive(Debug)]
pub enum AuthRejection {
    /// Anonymous visitor on a protected page.
    RedirectToLogin,
    /// The session layer is missing from the router.
    MissingSession,
    /// The session store failed.
    Session(AuthError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::MissingSession => {
                tracing::error!("Session accessed on a route without SessionManagerLayer");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
            Self::Session(err) => {
                tracing::error!(error = %err, "Failed to read auth state from session");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

async fn current_user(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::MissingSession)?;

    AuthService::new(state.api(), session)
        .restore()
        .await
        .map_err(AuthRejection::Session)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        current_user(parts, state)
            .await?
            .map(Self)
            .ok_or(AuthRejection::RedirectToLogin)
    }
}

/// Extractor that optionally gets the signed-in user.
///
/// Unlike `RequireAuth`, this does not reject anonymous visitors. It still
/// rejects with a 500 when the session layer is missing.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        current_user(parts, state).await.map(Self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, body::Body, http::Request, routing::get};
    use tower::ServiceExt;
    use url::Url;

    use super::*;
    use crate::config::DashboardConfig;

    fn state() -> AppState {
        AppState::new(DashboardConfig::for_api(Url::parse("http://127.0.0.1:9").unwrap())).unwrap()
    }

    async fn protected(RequireAuth(current): RequireAuth) -> String {
        current.user.username
    }

    async fn optional(OptionalAuth(current): OptionalAuth) -> &'static str {
        if current.is_some() { "user" } else { "anonymous" }
    }

    #[tokio::test]
    async fn test_missing_session_layer_is_server_error() {
        let app = Router::new()
            .route("/", get(protected))
            .route("/optional", get(optional))
            .with_state(state());

        for uri in ["/", "/optional"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[tokio::test]
    async fn test_anonymous_is_redirected_to_login() {
        let state = state();
        let app = Router::new()
            .route("/", get(protected))
            .route("/optional", get(optional))
            .layer(crate::middleware::create_session_layer(state.config()))
            .with_state(state);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get("location").unwrap(), "/login");

        let response = app
            .oneshot(Request::builder().uri("/optional").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
