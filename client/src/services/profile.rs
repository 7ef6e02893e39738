//! Profile and goals service

use super::escalate;
use crate::error::{ClientError, ClientResult};
use crate::session::Session;
use crate::state::ClientState;
use fittrack_shared::validation::{validate_height_cm, validate_weight};
use fittrack_shared::{calculate_bmi_result, BmiResult, UpdateProfileRequest, UserGoals, UserProfile};
use serde::Serialize;
use tracing::info;
use validator::Validate;

/// Derived health figures for a profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthInsights {
    pub profile: UserProfile,
    /// Present when height and weight are on record
    pub bmi: Option<BmiResult>,
}

/// Profile service for business logic
pub struct ProfileService;

impl ProfileService {
    pub async fn profile(state: &ClientState, session: &mut Session) -> ClientResult<UserProfile> {
        match Self::fetch_profile(state, session).await {
            Ok(profile) => Ok(profile),
            Err(err) => Err(escalate(state, session, err).await),
        }
    }

    async fn fetch_profile(state: &ClientState, session: &Session) -> ClientResult<UserProfile> {
        state.backend().profile(session.bearer()?).await
    }

    pub async fn update_profile(
        state: &ClientState,
        session: &mut Session,
        request: &UpdateProfileRequest,
    ) -> ClientResult<UserProfile> {
        request.validate()?;

        let result = match session.bearer() {
            Ok(token) => state.backend().update_profile(token, request).await,
            Err(err) => Err(err),
        };
        let profile = match result {
            Ok(profile) => profile,
            Err(err) => return Err(escalate(state, session, err).await),
        };
        info!(user_id = %profile.id, "Profile updated");
        Ok(profile)
    }

    /// Load the user's goals and remember the goal for plan generation
    pub async fn goals(state: &ClientState, session: &mut Session) -> ClientResult<UserGoals> {
        let result = match session.bearer() {
            Ok(token) => state.backend().goals(token).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(goals) => {
                session.goal = Some(goals.goal);
                Ok(goals)
            }
            Err(err) => Err(escalate(state, session, err).await),
        }
    }

    pub async fn update_goals(
        state: &ClientState,
        session: &mut Session,
        goals: &UserGoals,
    ) -> ClientResult<UserGoals> {
        if goals.workouts_per_week.is_some_and(|n| n > 14) {
            return Err(ClientError::Validation(
                "Workouts per week must be at most 14".to_string(),
            ));
        }
        if let Some(target) = goals.target_weight_kg {
            validate_weight(target).map_err(ClientError::Validation)?;
        }

        let result = match session.bearer() {
            Ok(token) => state.backend().update_goals(token, goals).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(updated) => {
                session.goal = Some(updated.goal);
                info!(goal = updated.goal.as_str(), "Goals updated");
                Ok(updated)
            }
            Err(err) => Err(escalate(state, session, err).await),
        }
    }

    /// Profile plus BMI when measurements are available
    pub async fn health_insights(state: &ClientState, session: &mut Session) -> ClientResult<HealthInsights> {
        let profile = Self::profile(state, session).await?;
        let bmi = match (profile.height_cm, profile.weight_kg) {
            (Some(height_cm), Some(weight_kg)) => {
                validate_height_cm(height_cm).map_err(ClientError::Validation)?;
                validate_weight(weight_kg).map_err(ClientError::Validation)?;
                calculate_bmi_result(height_cm, weight_kg)
            }
            _ => None,
        };
        Ok(HealthInsights { profile, bmi })
    }
}
