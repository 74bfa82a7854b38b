//! Authentication route handlers.
//!
//! Credentials are checked by the remote API. The login form validates that
//! both fields are filled in before any request is sent.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use demo_dashboard_core::{ValidationErrors, validate_login};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub username: String,
    pub error: Option<String>,
    pub errors: ValidationErrors,
}

impl LoginTemplate {
    fn blank() -> Self {
        Self {
            username: String::new(),
            error: None,
            errors: ValidationErrors::new(),
        }
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page. Signed-in users go straight to the dashboard.
pub async fn login_page(OptionalAuth(current): OptionalAuth) -> Response {
    if current.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate::blank().into_response()
}

/// Handle login form submission.
///
/// A rejected login re-renders the form with the API's message and leaves
/// the session as it was.
#[instrument(skip_all, fields(username = %form.username.trim()))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    if let Err(errors) = validate_login(&form.username, &form.password) {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            LoginTemplate {
                username: form.username,
                error: None,
                errors,
            },
        )
            .into_response());
    }

    match AuthService::new(state.api(), &session)
        .login(&form.username, &form.password)
        .await
    {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(AuthError::Session(err)) => Err(err.into()),
        Err(err) => {
            tracing::warn!(error = %err, "Login failed");
            let status = match err {
                AuthError::InvalidCredentials(_) => StatusCode::UNAUTHORIZED,
                _ => StatusCode::BAD_GATEWAY,
            };
            Ok((
                status,
                LoginTemplate {
                    username: form.username,
                    error: Some(err.login_message().to_string()),
                    errors: ValidationErrors::new(),
                },
            )
                .into_response())
        }
    }
}

/// Log out and return to the login page.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Response> {
    AuthService::new(state.api(), &session).logout().await?;
    Ok(Redirect::to("/login").into_response())
}
