//! Client services
//!
//! Services are stateless: every call receives the [`ClientState`] with
//! its collaborators and the [`Session`] it acts for.

pub mod auth;
pub mod demo;
pub mod meals;
pub mod profile;
pub mod rollover;
pub mod workouts;

pub use auth::AuthService;
pub use meals::MealService;
pub use profile::{HealthInsights, ProfileService};
pub use rollover::{RolloverOutcome, RolloverService, RolloverState};
pub use workouts::WorkoutService;

use crate::cache::Fetched;
use crate::error::{ClientError, ClientResult};
use crate::session::Session;
use crate::state::ClientState;
use tracing::warn;

/// Apply the escalation rule for a failed call
///
/// An authentication failure means the session cannot be used any more:
/// the session and its persisted copy are dropped so the caller has to log
/// in again. Every other error is handed back unchanged.
pub(crate) async fn escalate(state: &ClientState, session: &mut Session, err: ClientError) -> ClientError {
    if err.requires_login() {
        warn!(error = %err, "Session rejected, logging out");
        metrics::counter!("fittrack_session_escalations_total").increment(1);
        session.clear();
        if let Err(store_err) = state.store().clear_session().await {
            warn!(error = %store_err, "Failed to clear persisted session");
        }
    }
    err
}

/// Answer a failed read with placeholder data when that is allowed
///
/// Authentication failures are escalated and returned. Other failures are
/// returned as-is unless placeholder fallback is enabled and the error is
/// one a placeholder can stand in for.
pub(crate) async fn read_fallback<T>(
    state: &ClientState,
    session: &mut Session,
    err: ClientError,
    operation: &'static str,
    placeholder: impl FnOnce() -> T,
) -> ClientResult<Fetched<T>> {
    let err = escalate(state, session, err).await;
    if !(state.tracking().placeholder_fallback && err.allows_placeholder()) {
        return Err(err);
    }
    warn!(operation, error = %err, "Backend read failed, serving placeholder data");
    metrics::counter!("fittrack_placeholder_fallbacks_total", "operation" => operation).increment(1);
    Ok(Fetched::placeholder(placeholder()))
}
