//! Client error handling
//!
//! Every operation of the client core returns a [`ClientResult`]. Errors are
//! classified so callers can tell an expired session (log in again) from a
//! local rejection (show the message) and from a backend fault.

use chrono::{DateTime, Utc};
use fittrack_shared::{AuthError, PlanError};
use thiserror::Error;

/// Client error type
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Exercise {exercise_id} is locked until {unlocks_at}")]
    Locked {
        exercise_id: String,
        unlocks_at: DateTime<Utc>,
    },

    #[error("Completed exercises cannot be unmarked to maintain progress integrity")]
    Irreversible { exercise_id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Placeholder data cannot be changed: {0}")]
    PlaceholderData(String),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected response payload: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    /// Stable code for logs and CLI output
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Unauthorized(_) => "UNAUTHORIZED",
            ClientError::Forbidden(_) => "FORBIDDEN",
            ClientError::Locked { .. } => "COMPLETION_LOCKED",
            ClientError::Irreversible { .. } => "COMPLETION_IRREVERSIBLE",
            ClientError::Validation(_) => "VALIDATION_ERROR",
            ClientError::NotFound(_) => "NOT_FOUND",
            ClientError::PlaceholderData(_) => "PLACEHOLDER_DATA",
            ClientError::Backend { .. } => "BACKEND_ERROR",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Decode(_) => "DECODE_ERROR",
            ClientError::Storage(_) => "STORAGE_ERROR",
            ClientError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// The session is unusable and the user has to log in again
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_))
    }

    /// Rejected by local rules without contacting the backend
    pub fn is_local_rejection(&self) -> bool {
        matches!(
            self,
            ClientError::Locked { .. }
                | ClientError::Irreversible { .. }
                | ClientError::Validation(_)
                | ClientError::PlaceholderData(_)
        )
    }

    /// A failed read that may be answered with placeholder data instead
    pub fn allows_placeholder(&self) -> bool {
        matches!(
            self,
            ClientError::Backend { .. }
                | ClientError::Transport(_)
                | ClientError::Decode(_)
                | ClientError::NotFound(_)
        )
    }
}

impl From<PlanError> for ClientError {
    fn from(err: PlanError) -> Self {
        match err {
            PlanError::Locked {
                exercise_id,
                unlocks_at,
            } => ClientError::Locked {
                exercise_id,
                unlocks_at,
            },
            PlanError::Irreversible { exercise_id } => ClientError::Irreversible { exercise_id },
            err @ (PlanError::UnknownExercise { .. } | PlanError::UnknownMeal { .. }) => {
                ClientError::NotFound(err.to_string())
            }
            err @ PlanError::UnknownDay(_) => ClientError::Validation(err.to_string()),
        }
    }
}

impl From<AuthError> for ClientError {
    fn from(err: AuthError) -> Self {
        ClientError::Unauthorized(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => format!("{}: invalid value", field),
                })
            })
            .collect();
        messages.sort();
        ClientError::Validation(messages.join("; "))
    }
}

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;
