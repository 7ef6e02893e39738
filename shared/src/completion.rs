//! Completion locks and the toggle gate
//!
//! Marking an exercise complete records a lock timestamp. While the lock
//! window is open the completion cannot be cleared. Whether it can be
//! cleared once the window has passed depends on the [`ReversalPolicy`].

use crate::errors::PlanError;
use crate::models::DailyPlan;
use crate::types::CompletionToggle;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Length of the lock window
pub const LOCK_WINDOW_HOURS: i64 = 24;

/// Default lock window as a duration
pub fn lock_window() -> Duration {
    Duration::hours(LOCK_WINDOW_HOURS)
}

/// True iff a lock is recorded for the exercise and `now - lock < 24h`
pub fn is_locked(plan: &DailyPlan, exercise_id: &str, now: DateTime<Utc>) -> bool {
    is_locked_within(plan, exercise_id, now, lock_window())
}

/// Lock check with an explicit window length
pub fn is_locked_within(
    plan: &DailyPlan,
    exercise_id: &str,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    plan.lock_timestamp(exercise_id)
        .is_some_and(|locked_at| now - locked_at < window)
}

/// When the lock on an exercise expires, if one is recorded
pub fn unlocks_at(plan: &DailyPlan, exercise_id: &str, window: Duration) -> Option<DateTime<Utc>> {
    plan.lock_timestamp(exercise_id).map(|locked_at| locked_at + window)
}

/// What may happen to a completed exercise once its lock window has passed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReversalPolicy {
    /// Completed exercises can never be unmarked
    #[default]
    Never,
    /// Completed exercises can be unmarked after the lock window
    AfterLockWindow,
}

/// Outcome of gating a toggle request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleDecision {
    /// Send the request to the backend
    Dispatch,
    /// The exercise is already in the requested state
    Unchanged,
}

/// Gate a user-initiated completion change against the lock rules
///
/// Marking complete is always allowed. Unmarking a completed exercise is
/// rejected with [`PlanError::Locked`] inside the lock window; outside it
/// the policy decides, and [`ReversalPolicy::Never`] rejects with
/// [`PlanError::Irreversible`].
pub fn check_toggle(
    plan: &DailyPlan,
    toggle: &CompletionToggle,
    policy: ReversalPolicy,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<ToggleDecision, PlanError> {
    let exercise_id = toggle.exercise_id.as_str();
    if !plan.has_exercise(exercise_id) {
        return Err(PlanError::UnknownExercise {
            exercise_id: exercise_id.to_string(),
        });
    }

    if toggle.completed {
        return Ok(ToggleDecision::Dispatch);
    }

    if !plan.is_exercise_completed(exercise_id) {
        return Ok(ToggleDecision::Unchanged);
    }

    if is_locked_within(plan, exercise_id, now, window) {
        return Err(PlanError::Locked {
            exercise_id: exercise_id.to_string(),
            unlocks_at: unlocks_at(plan, exercise_id, window).unwrap_or(now),
        });
    }

    match policy {
        ReversalPolicy::Never => Err(PlanError::Irreversible {
            exercise_id: exercise_id.to_string(),
        }),
        ReversalPolicy::AfterLockWindow => Ok(ToggleDecision::Dispatch),
    }
}
