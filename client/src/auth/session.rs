use super::token;
use chrono::{DateTime, Utc};
use fittrack_shared::{AuthResponse, AuthTokens, User};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Authenticated user plus tokens
#[derive(Debug)]
pub struct AuthSession {
    pub user: User,
    access_token: SecretString,
    refresh_token: Option<SecretString>,
    expires_at: Option<DateTime<Utc>>,
}

impl AuthSession {
    pub fn new(user: User, tokens: AuthTokens) -> Self {
        let expires_at = token::expires_at(&tokens.access_token).ok().or_else(|| {
            tokens
                .expires_in
                .map(|secs| Utc::now() + chrono::Duration::seconds(secs))
        });
        Self {
            user,
            access_token: SecretString::new(tokens.access_token),
            refresh_token: tokens.refresh_token.map(SecretString::new),
            expires_at,
        }
    }

    pub fn from_response(response: AuthResponse) -> Self {
        Self::new(response.user, response.tokens)
    }

    /// Swap in refreshed tokens, keeping the refresh token if none was issued
    pub fn rotate(&mut self, tokens: AuthTokens) {
        let refreshed = Self::new(self.user.clone(), tokens);
        self.access_token = refreshed.access_token;
        self.expires_at = refreshed.expires_at;
        if refreshed.refresh_token.is_some() {
            self.refresh_token = refreshed.refresh_token;
        }
    }

    #[inline]
    pub fn access_token(&self) -> &SecretString {
        &self.access_token
    }

    #[inline]
    pub fn refresh_token(&self) -> Option<&SecretString> {
        self.refresh_token.as_ref()
    }

    #[inline]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }

    pub fn to_persisted(&self) -> PersistedSession {
        PersistedSession {
            user: self.user.clone(),
            access_token: self.access_token.expose_secret().clone(),
            refresh_token: self
                .refresh_token
                .as_ref()
                .map(|t| t.expose_secret().clone()),
        }
    }
}

/// Session as written to the state store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub user: User,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl From<PersistedSession> for AuthSession {
    fn from(persisted: PersistedSession) -> Self {
        AuthSession::new(
            persisted.user,
            AuthTokens {
                access_token: persisted.access_token,
                refresh_token: persisted.refresh_token,
                token_type: "Bearer".to_string(),
                expires_in: None,
            },
        )
    }
}
