//! Error types shared by the tracking core

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Plan-level rejections raised by the pure tracking logic
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    #[error("Unknown day: {0}")]
    UnknownDay(String),

    #[error("Exercise {exercise_id} is not part of the plan")]
    UnknownExercise { exercise_id: String },

    #[error("Meal {meal_id} is not part of the plan")]
    UnknownMeal { meal_id: String },

    #[error("Exercise {exercise_id} is locked until {unlocks_at}")]
    Locked {
        exercise_id: String,
        unlocks_at: DateTime<Utc>,
    },

    #[error("Completed exercises cannot be unmarked to maintain progress integrity")]
    Irreversible { exercise_id: String },
}

/// Authentication error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Missing token")]
    MissingToken,
}
