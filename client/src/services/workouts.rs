//! Workout plan service
//!
//! Provides the workout side of the client core:
//! - Loading a week of plans into the cache (placeholder fallback on failure)
//! - The completion toggle protocol for exercises and meals
//! - Weekly progress and streaks, from the backend or computed locally
//! - Plan generation

use super::demo::placeholder_week;
use super::{escalate, read_fallback};
use crate::cache::{Fetched, Ticket};
use crate::error::{ClientError, ClientResult};
use crate::session::Session;
use crate::state::ClientState;
use chrono::{DateTime, Utc};
use fittrack_shared::validation::{validate_item_id, validate_week_number};
use fittrack_shared::{
    check_toggle, compute_streak, day_of, week_number_at, week_start, CompleteItemRequest,
    CompletionToggle, DailyPlan, DayOfWeek, FitnessGoal, GenerateWeekRequest, Normalize,
    PlanError, StreakInfo, ToggleDecision, WeeklyProgress,
};
use tracing::{debug, info};

/// Workout service for business logic
pub struct WorkoutService;

impl WorkoutService {
    // ========================================================================
    // Reads
    // ========================================================================

    /// Load a week of plans and make it the cached week
    ///
    /// A failed read is answered with placeholder plans (when enabled) that
    /// are tagged as such and cannot be changed.
    pub async fn load_week(
        state: &ClientState,
        session: &mut Session,
        week: u32,
    ) -> ClientResult<Fetched<Vec<DailyPlan>>> {
        validate_week_number(week).map_err(ClientError::Validation)?;

        let ticket = session.cache.begin();
        let fetched = match Self::fetch_week(state, session, week).await {
            Ok(plans) => Fetched::authoritative(plans.normalize()),
            Err(err) => read_fallback(state, session, err, "load_week", || placeholder_week(week)).await?,
        };

        if session.cache.apply_week(ticket, week, fetched.clone()) {
            debug!(week, provenance = ?fetched.provenance, "Week cached");
        } else {
            debug!(week, "Discarding stale week response");
        }
        Ok(fetched)
    }

    async fn fetch_week(state: &ClientState, session: &Session, week: u32) -> ClientResult<Vec<DailyPlan>> {
        state.backend().week_plans(session.bearer()?, week).await
    }

    /// Select a day of the cached week
    pub fn select_day(session: &mut Session, day: DayOfWeek) -> ClientResult<DailyPlan> {
        let week = session
            .cache
            .week()
            .ok_or_else(|| ClientError::NotFound("No week loaded".to_string()))?;
        let plan = week
            .day(day)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("No plan for {} in week {}", day, week.week_number)))?;
        session.cache.select_day(day);
        Ok(plan)
    }

    /// Completion summary for a week
    ///
    /// Falls back to a summary computed from the cached week, then to
    /// placeholder data.
    pub async fn weekly_progress(
        state: &ClientState,
        session: &mut Session,
        week: u32,
    ) -> ClientResult<Fetched<WeeklyProgress>> {
        validate_week_number(week).map_err(ClientError::Validation)?;

        let err = match Self::fetch_progress(state, session, week).await {
            Ok(progress) => return Ok(Fetched::authoritative(progress)),
            Err(err) => escalate(state, session, err).await,
        };
        if !err.allows_placeholder() {
            return Err(err);
        }

        if let Some(cached) = session.cache.week_for(week) {
            let progress = fittrack_shared::weekly_progress(&cached.plans.data, week);
            debug!(week, "Weekly progress computed from cached plans");
            return Ok(if cached.plans.is_placeholder() {
                Fetched::placeholder(progress)
            } else {
                Fetched::local(progress)
            });
        }

        read_fallback(state, session, err, "weekly_progress", || {
            fittrack_shared::weekly_progress(&placeholder_week(week), week)
        })
        .await
    }

    async fn fetch_progress(state: &ClientState, session: &Session, week: u32) -> ClientResult<WeeklyProgress> {
        state.backend().weekly_progress(session.bearer()?, week).await
    }

    /// Streaks as of `now`
    ///
    /// Uses the backend's streak when configured to, and the local streak
    /// engine over the current week otherwise or when that call fails.
    pub async fn streak(
        state: &ClientState,
        session: &mut Session,
        now: DateTime<Utc>,
    ) -> ClientResult<Fetched<StreakInfo>> {
        if state.tracking().prefer_server_streak {
            match Self::fetch_streak(state, session).await {
                Ok(info) => return Ok(Fetched::authoritative(info)),
                Err(err) => {
                    let err = escalate(state, session, err).await;
                    if err.requires_login() {
                        return Err(err);
                    }
                    debug!(error = %err, "Server streak unavailable, computing locally");
                }
            }
        }

        let week = week_number_at(now);
        let today = day_of(now.date_naive());
        if session.cache.week_for(week).is_none() {
            Self::load_week(state, session, week).await?;
        }
        let cached = session
            .cache
            .week_for(week)
            .ok_or_else(|| ClientError::NotFound(format!("Week {} is not loaded", week)))?;

        let info = compute_streak(&cached.plans.data, today);
        Ok(if cached.plans.is_placeholder() {
            Fetched::placeholder(info)
        } else {
            Fetched::local(info)
        })
    }

    async fn fetch_streak(state: &ClientState, session: &Session) -> ClientResult<StreakInfo> {
        state.backend().streak(session.bearer()?).await
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Mark or unmark an exercise
    ///
    /// The change is checked against the lock rules before anything is sent.
    /// On success the backend's plan replaces the cached day and, for a new
    /// completion, the lock timestamp is recorded. On failure the cache is
    /// left untouched.
    pub async fn toggle_exercise(
        state: &ClientState,
        session: &mut Session,
        day: DayOfWeek,
        toggle: &CompletionToggle,
        now: DateTime<Utc>,
    ) -> ClientResult<DailyPlan> {
        validate_item_id(&toggle.exercise_id).map_err(ClientError::Validation)?;
        let (plan, week_number) = Self::writable_day(session, day)?;

        let tracking = state.tracking();
        let decision = check_toggle(&plan, toggle, tracking.reversal_policy, now, tracking.lock_window())
            .map_err(|err| {
                if matches!(err, PlanError::Locked { .. } | PlanError::Irreversible { .. }) {
                    info!(day = %day, exercise_id = %toggle.exercise_id, reason = %err, "Completion change rejected");
                    metrics::counter!("fittrack_completion_rejections_total").increment(1);
                }
                ClientError::from(err)
            })?;

        if decision == ToggleDecision::Unchanged {
            debug!(day = %day, exercise_id = %toggle.exercise_id, "Exercise already in requested state");
            return Ok(plan);
        }

        let request = CompleteItemRequest::exercise(toggle.exercise_id.clone(), toggle.completed, week_number);
        let (ticket, mut updated) = Self::commit(state, session, day, &request).await?;

        if toggle.completed && updated.is_exercise_completed(&toggle.exercise_id) {
            updated
                .completed_status
                .completion_locked
                .entry(toggle.exercise_id.clone())
                .or_insert(now);
        }

        Self::store_day(session, ticket, updated.clone());
        info!(
            day = %day,
            exercise_id = %toggle.exercise_id,
            completed = toggle.completed,
            "Exercise completion updated"
        );
        Ok(updated)
    }

    /// Mark or unmark a meal of a workout day
    ///
    /// Meals carry no lock and can be unmarked freely.
    pub async fn toggle_meal(
        state: &ClientState,
        session: &mut Session,
        day: DayOfWeek,
        meal_id: &str,
        completed: bool,
    ) -> ClientResult<DailyPlan> {
        validate_item_id(meal_id).map_err(ClientError::Validation)?;
        let (plan, week_number) = Self::writable_day(session, day)?;

        if !plan.has_meal(meal_id) {
            return Err(PlanError::UnknownMeal {
                meal_id: meal_id.to_string(),
            }
            .into());
        }
        if plan.is_meal_completed(meal_id) == completed {
            return Ok(plan);
        }

        let request = CompleteItemRequest::meal(meal_id, completed, week_number);
        let (ticket, updated) = Self::commit(state, session, day, &request).await?;

        Self::store_day(session, ticket, updated.clone());
        info!(day = %day, meal_id = %meal_id, completed, "Meal completion updated");
        Ok(updated)
    }

    /// Generate the plans for the week containing `now`
    pub async fn generate_week(
        state: &ClientState,
        session: &mut Session,
        goal: Option<FitnessGoal>,
        now: DateTime<Utc>,
    ) -> ClientResult<Vec<DailyPlan>> {
        let request = GenerateWeekRequest {
            goal: goal.or(session.goal).unwrap_or(state.tracking().default_goal),
            week_number: week_number_at(now),
            week_start_date: week_start(now.date_naive()),
        };

        let ticket = session.cache.begin();
        let plans = match Self::send_generate(state, session, &request).await {
            Ok(plans) => plans.normalize(),
            Err(err) => return Err(escalate(state, session, err).await),
        };

        session
            .cache
            .apply_week(ticket, request.week_number, Fetched::authoritative(plans.clone()));
        info!(week = request.week_number, goal = request.goal.as_str(), days = plans.len(), "Week generated");
        Ok(plans)
    }

    async fn send_generate(
        state: &ClientState,
        session: &Session,
        request: &GenerateWeekRequest,
    ) -> ClientResult<Vec<DailyPlan>> {
        state.backend().generate_week(session.bearer()?, request).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// A cached, authoritative day that writes may target
    fn writable_day(session: &Session, day: DayOfWeek) -> ClientResult<(DailyPlan, u32)> {
        let week = session
            .cache
            .week()
            .ok_or_else(|| ClientError::NotFound("No week loaded".to_string()))?;
        if week.plans.is_placeholder() {
            return Err(ClientError::PlaceholderData(format!(
                "week {} is showing placeholder plans; reload it once the backend is reachable",
                week.week_number
            )));
        }
        let plan = week
            .day(day)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("No plan for {} in week {}", day, week.week_number)))?;
        Ok((plan, week.week_number))
    }

    /// Send a completion change and return the backend's plan for the day
    async fn commit(
        state: &ClientState,
        session: &mut Session,
        day: DayOfWeek,
        request: &CompleteItemRequest,
    ) -> ClientResult<(Ticket, DailyPlan)> {
        let ticket = session.cache.begin();
        let plan = match Self::send_completion(state, session, day, request).await {
            Ok(plan) => plan.normalize(),
            Err(err) => return Err(escalate(state, session, err).await),
        };
        if plan.day != day {
            return Err(ClientError::Decode(format!(
                "expected the plan for {}, got {}",
                day, plan.day
            )));
        }
        Ok((ticket, plan))
    }

    async fn send_completion(
        state: &ClientState,
        session: &Session,
        day: DayOfWeek,
        request: &CompleteItemRequest,
    ) -> ClientResult<DailyPlan> {
        state.backend().complete_item(session.bearer()?, day, request).await
    }

    fn store_day(session: &mut Session, ticket: Ticket, plan: DailyPlan) {
        let day = plan.day;
        if !session.cache.replace_day(ticket, plan) {
            debug!(day = %day, "Cached week changed while the write was in flight, keeping newer data");
        }
    }
}
