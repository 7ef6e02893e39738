//! Authentication service
//!
//! Login, registration, logout, explicit token refresh and restoring a
//! persisted session. Credentials are validated locally before any request.

use super::escalate;
use crate::auth::AuthSession;
use crate::error::{ClientError, ClientResult};
use crate::session::Session;
use crate::state::ClientState;
use chrono::{DateTime, Utc};
use fittrack_shared::validation::validate_email;
use fittrack_shared::{AuthError, AuthResponse, LoginRequest, RegisterRequest, User};
use tracing::{info, warn};
use validator::Validate;

/// Authentication service for business logic
pub struct AuthService;

impl AuthService {
    /// Log in and persist the session
    pub async fn login(
        state: &ClientState,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> ClientResult<User> {
        let request = LoginRequest {
            email: email.trim().to_lowercase(),
            password: password.to_string(),
        };
        validate_email(&request.email).map_err(ClientError::Validation)?;
        request.validate()?;

        let response = state.backend().login(&request).await?;
        Self::start_session(state, session, response).await
    }

    /// Create an account and log in with it
    pub async fn register(
        state: &ClientState,
        session: &mut Session,
        request: RegisterRequest,
    ) -> ClientResult<User> {
        let request = RegisterRequest {
            email: request.email.trim().to_lowercase(),
            name: request.name.trim().to_string(),
            ..request
        };
        request.validate()?;

        let response = state.backend().register(&request).await?;
        Self::start_session(state, session, response).await
    }

    async fn start_session(
        state: &ClientState,
        session: &mut Session,
        response: AuthResponse,
    ) -> ClientResult<User> {
        let auth = AuthSession::from_response(response);
        let user = auth.user.clone();
        state.store().save_session(&auth.to_persisted()).await?;
        session.establish(auth);

        info!(user_id = %user.id, role = ?user.role, "Session started");
        Ok(user)
    }

    /// Log out
    ///
    /// The backend is told on a best-effort basis; the local session and
    /// its persisted copy are always dropped.
    pub async fn logout(state: &ClientState, session: &mut Session) -> ClientResult<()> {
        if let Ok(token) = session.bearer() {
            if let Err(err) = state.backend().logout(token).await {
                warn!(error = %err, "Backend logout failed, clearing local session anyway");
            }
        }
        session.clear();
        state.store().clear_session().await?;
        info!("Logged out");
        Ok(())
    }

    /// Exchange the refresh token for a new access token
    ///
    /// Only ever called explicitly; requests never refresh behind the
    /// caller's back. Without an active session the persisted one is used,
    /// even when its access token has already expired.
    pub async fn refresh(state: &ClientState, session: &mut Session) -> ClientResult<()> {
        if session.auth().is_none() {
            match state.store().load_session().await? {
                Some(persisted) => session.establish(AuthSession::from(persisted)),
                None => return Err(ClientError::Unauthorized("Not logged in".to_string())),
            }
        }

        let result = match session.auth().and_then(|a| a.refresh_token()) {
            Some(refresh_token) => state.backend().refresh(refresh_token).await,
            None => Err(ClientError::Unauthorized("No refresh token available".to_string())),
        };
        let tokens = match result {
            Ok(tokens) => tokens,
            Err(err) => return Err(escalate(state, session, err).await),
        };

        let auth = session
            .auth_mut()
            .ok_or_else(|| ClientError::Unauthorized("Not logged in".to_string()))?;
        auth.rotate(tokens);
        let persisted = auth.to_persisted();
        state.store().save_session(&persisted).await?;
        info!(user_id = %persisted.user.id, "Access token refreshed");
        Ok(())
    }

    /// Rebuild the session from persisted state
    ///
    /// Returns `Ok(None)` when nothing is persisted. An expired access token
    /// is rejected. The persisted copy is kept while it still holds a refresh
    /// token, so the session can be renewed with [`AuthService::refresh`].
    pub async fn restore(
        state: &ClientState,
        session: &mut Session,
        now: DateTime<Utc>,
    ) -> ClientResult<Option<User>> {
        let Some(persisted) = state.store().load_session().await? else {
            return Ok(None);
        };

        let auth = AuthSession::from(persisted);
        if auth.is_expired(now) {
            session.clear();
            if auth.refresh_token().is_some() {
                warn!(user_id = %auth.user.id, "Persisted session expired, refresh required");
            } else {
                warn!(user_id = %auth.user.id, "Persisted session expired");
                state.store().clear_session().await?;
            }
            return Err(AuthError::TokenExpired.into());
        }

        let user = auth.user.clone();
        session.establish(auth);
        info!(user_id = %user.id, "Session restored");
        Ok(Some(user))
    }
}
