//! Authentication service.
//!
//! The session moves between two states:
//! - anonymous: no [`AuthState`] under [`session_keys::AUTH`]
//! - authenticated: a token, plus the profile it belongs to
//!
//! Credentials are checked by the remote API; this service only records the
//! outcome in the session.

mod error;

pub use error::{AuthError, DEFAULT_LOGIN_ERROR};

use secrecy::SecretString;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::api::ApiClient;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::models::{AuthState, CurrentUser, session_keys};

/// Authentication service.
pub struct AuthService<'a> {
    api: &'a ApiClient,
    session: &'a Session,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service for one request.
    #[must_use]
    pub const fn new(api: &'a ApiClient, session: &'a Session) -> Self {
        Self { api, session }
    }

    /// Log in with username and password.
    ///
    /// On success the session id is rotated and the token and profile are
    /// stored. On failure the session is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` with the message to show when
    /// the API rejects the credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<CurrentUser, AuthError> {
        let response = self
            .api
            .login(username.trim(), password)
            .await
            .map_err(AuthError::from_login_failure)?;

        let token = SecretString::from(response.access_token);
        let state = AuthState {
            token: token.clone(),
            user: Some(response.user.clone()),
        };

        // New identity, new session id
        self.session.cycle_id().await?;
        self.session.insert(session_keys::AUTH, &state).await?;

        set_sentry_user(&response.user.id, &response.user.username);
        info!(user_id = %response.user.id, "User logged in");

        Ok(CurrentUser {
            user: response.user,
            token,
        })
    }

    /// Log out: drop the token, the profile, and everything else in the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.session.flush().await?;
        clear_sentry_user();
        info!("User logged out");
        Ok(())
    }

    /// Restore the signed-in user from the session.
    ///
    /// A token without a profile is completed with `GET /auth/me`; if the API
    /// rejects the token the session falls back to anonymous.
    ///
    /// # Errors
    ///
    /// Returns an error only if the session store fails.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<Option<CurrentUser>, AuthError> {
        let Some(state) = self.session.get::<AuthState>(session_keys::AUTH).await? else {
            return Ok(None);
        };

        if let Some(user) = state.user {
            return Ok(Some(CurrentUser {
                user,
                token: state.token,
            }));
        }

        match self.api.current_user(&state.token).await {
            Ok(user) => {
                let restored = AuthState {
                    token: state.token.clone(),
                    user: Some(user.clone()),
                };
                self.session.insert(session_keys::AUTH, &restored).await?;
                info!(user_id = %user.id, "Restored user profile from token");
                Ok(Some(CurrentUser {
                    user,
                    token: state.token,
                }))
            }
            Err(err) => {
                warn!(error = %err, "Stored token rejected, session is anonymous");
                self.session.remove::<AuthState>(session_keys::AUTH).await?;
                Ok(None)
            }
        }
    }
}
