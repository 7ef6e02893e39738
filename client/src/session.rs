//! Session context
//!
//! The session is passed explicitly into every service call. It owns the
//! authentication state, the plan cache and the rollover state of one
//! logged-in user.

use crate::auth::AuthSession;
use crate::cache::PlanCache;
use crate::error::{ClientError, ClientResult};
use crate::services::rollover::RolloverState;
use chrono::Utc;
use fittrack_shared::{FitnessGoal, User};
use secrecy::SecretString;

#[derive(Debug, Default)]
pub struct Session {
    auth: Option<AuthSession>,
    pub cache: PlanCache,
    pub rollover: RolloverState,
    /// Goal from the user's goals, once loaded
    pub goal: Option<FitnessGoal>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for an already authenticated user
    pub fn authenticated(auth: AuthSession) -> Self {
        Self {
            auth: Some(auth),
            ..Self::default()
        }
    }

    /// Install a fresh login, dropping anything cached for a previous user
    pub fn establish(&mut self, auth: AuthSession) {
        self.clear();
        self.auth = Some(auth);
    }

    /// Forget the user, tokens and every cached plan
    pub fn clear(&mut self) {
        self.auth = None;
        self.cache.clear();
        self.rollover = RolloverState::default();
        self.goal = None;
    }

    #[inline]
    pub fn is_authenticated(&self) -> bool {
        self.auth.is_some()
    }

    pub fn auth(&self) -> Option<&AuthSession> {
        self.auth.as_ref()
    }

    pub fn auth_mut(&mut self) -> Option<&mut AuthSession> {
        self.auth.as_mut()
    }

    pub fn user(&self) -> Option<&User> {
        self.auth.as_ref().map(|a| &a.user)
    }

    pub fn user_id(&self) -> ClientResult<&str> {
        self.user()
            .map(|u| u.id.as_str())
            .ok_or_else(|| ClientError::Unauthorized("Not logged in".to_string()))
    }

    /// Access token for the next request
    ///
    /// Fails without a network call when nobody is logged in or the token
    /// has already expired.
    pub fn bearer(&self) -> ClientResult<&SecretString> {
        let auth = self
            .auth
            .as_ref()
            .ok_or_else(|| ClientError::Unauthorized("Not logged in".to_string()))?;
        if auth.is_expired(Utc::now()) {
            return Err(ClientError::Unauthorized("Session expired".to_string()));
        }
        Ok(auth.access_token())
    }
}
