//! Access token inspection
//!
//! The client never holds the signing key, so tokens are decoded without
//! signature verification and only the timing claims are read. The backend
//! remains the authority on whether a token is valid.

use chrono::{DateTime, Utc};
use fittrack_shared::AuthError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

/// Claims the client cares about
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: Option<i64>,
}

fn inspection_rules() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

/// Read the claims of a token without verifying its signature
pub fn inspect(token: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(token, &DecodingKey::from_secret(&[]), &inspection_rules())
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
}

/// Expiry instant of a token
#[inline]
pub fn expires_at(token: &str) -> Result<DateTime<Utc>, AuthError> {
    let claims = inspect(token)?;
    DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidToken)
}

/// Whether the token carries an `exp` that has passed
///
/// Opaque tokens that are not JWTs are treated as not expired.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    expires_at(token).is_ok_and(|exp| exp <= now)
}
