//! Weekly rollover controller
//!
//! Detects that the current week number differs from the last week number
//! stored for the user and drives archive-then-generate exactly once per
//! transition. The stored week only moves forward after both calls succeed,
//! so a failed rollover is retried on the next check. Duplicate archive or
//! generate requests for the same week are the backend's to ignore. State
//! store failures are rollover failures like any other: they are reported,
//! never raised.
//!
//! The check runs when a session starts or a view loads; there is no timer.

use super::escalate;
use crate::cache::Fetched;
use crate::error::ClientResult;
use crate::session::Session;
use crate::state::ClientState;
use chrono::{DateTime, NaiveDate, Utc};
use fittrack_shared::{
    recent_week_date, summarize_week, week_number_at, week_start, ArchiveSummary,
    ArchiveWeekRequest, DailyPlan, GenerateWeekRequest, Normalize, WeeklyArchive,
};
use serde::Serialize;
use tracing::{info, warn};

/// Rollover state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloverState {
    /// No rollover pending
    #[default]
    Current,
    /// Archive and generate in flight
    RollingOver,
    /// The last attempt failed; the next check retries it
    Failed,
}

/// Step of the rollover that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloverStage {
    Archive,
    Generate,
    /// Reading or writing the last seen week
    Store,
}

/// Result of a rollover check
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RolloverOutcome {
    /// No week was stored for the user yet; the current one was recorded
    Initialized { week: u32 },
    /// The stored week is the current week
    UpToDate { week: u32 },
    RolledOver {
        from_week: u32,
        to_week: u32,
        archive: WeeklyArchive,
        generated_days: usize,
    },
    /// Left pending; the stored week was not changed
    ///
    /// `from_week` is `None` when the stored week could not be read.
    Failed {
        from_week: Option<u32>,
        to_week: u32,
        stage: RolloverStage,
        reason: String,
    },
}

/// Rollover service for business logic
pub struct RolloverService;

impl RolloverService {
    /// Check for a week transition and perform it if one is due
    ///
    /// Rollover failures are reported as [`RolloverOutcome::Failed`] and
    /// never block the caller. Authentication failures are the exception:
    /// they end the session and are returned as errors.
    pub async fn check(
        state: &ClientState,
        session: &mut Session,
        now: DateTime<Utc>,
    ) -> ClientResult<RolloverOutcome> {
        let user_id = session.user_id()?.to_string();
        let current = week_number_at(now);

        let stored = match state.store().last_seen_week(&user_id).await {
            Ok(stored) => stored,
            Err(err) => return Self::fail(state, session, None, current, RolloverStage::Store, err).await,
        };
        let Some(previous) = stored else {
            if let Err(err) = state.store().set_last_seen_week(&user_id, current).await {
                return Self::fail(state, session, None, current, RolloverStage::Store, err).await;
            }
            session.rollover = RolloverState::Current;
            info!(user_id = %user_id, week = current, "First week recorded");
            return Ok(RolloverOutcome::Initialized { week: current });
        };

        if previous == current {
            session.rollover = RolloverState::Current;
            return Ok(RolloverOutcome::UpToDate { week: current });
        }

        session.rollover = RolloverState::RollingOver;
        info!(user_id = %user_id, from_week = previous, to_week = current, "Week rollover started");

        let today = now.date_naive();
        let archive_request = ArchiveWeekRequest {
            week_number: previous,
            summary: Self::summary_for(state, session, previous, today).await,
        };
        let archive = match Self::send_archive(state, session, &archive_request).await {
            Ok(archive) => archive,
            Err(err) => {
                return Self::fail(state, session, Some(previous), current, RolloverStage::Archive, err).await
            }
        };

        let generate_request = GenerateWeekRequest {
            goal: session.goal.unwrap_or(state.tracking().default_goal),
            week_number: current,
            week_start_date: week_start(today),
        };
        let ticket = session.cache.begin();
        let plans = match Self::send_generate(state, session, &generate_request).await {
            Ok(plans) => plans.normalize(),
            Err(err) => {
                return Self::fail(state, session, Some(previous), current, RolloverStage::Generate, err).await
            }
        };

        // The new week is usable even if it cannot be recorded
        let generated_days = plans.len();
        session
            .cache
            .apply_week(ticket, current, Fetched::authoritative(plans));

        if let Err(err) = state.store().set_last_seen_week(&user_id, current).await {
            return Self::fail(state, session, Some(previous), current, RolloverStage::Store, err).await;
        }

        session.rollover = RolloverState::Current;
        metrics::counter!("fittrack_rollovers_total", "outcome" => "completed").increment(1);
        info!(
            user_id = %user_id,
            from_week = previous,
            to_week = current,
            generated_days,
            "Week rollover completed"
        );

        Ok(RolloverOutcome::RolledOver {
            from_week: previous,
            to_week: current,
            archive,
            generated_days,
        })
    }

    async fn fail(
        state: &ClientState,
        session: &mut Session,
        from_week: Option<u32>,
        to_week: u32,
        stage: RolloverStage,
        err: crate::error::ClientError,
    ) -> ClientResult<RolloverOutcome> {
        let err = escalate(state, session, err).await;
        if err.requires_login() {
            return Err(err);
        }

        session.rollover = RolloverState::Failed;
        metrics::counter!("fittrack_rollovers_total", "outcome" => "failed").increment(1);
        warn!(?from_week, to_week, ?stage, error = %err, "Week rollover failed, will retry on next check");

        Ok(RolloverOutcome::Failed {
            from_week,
            to_week,
            stage,
            reason: err.to_string(),
        })
    }

    /// Summary of the finished week from cached or freshly loaded plans
    ///
    /// Archiving goes ahead without a summary when the week cannot be read.
    async fn summary_for(
        state: &ClientState,
        session: &Session,
        week: u32,
        today: NaiveDate,
    ) -> Option<ArchiveSummary> {
        let week_date = recent_week_date(week, today)?;
        let plans: Vec<DailyPlan> = match session.cache.week_for(week) {
            Some(cached) if cached.plans.is_authoritative() => cached.plans.data.clone(),
            _ => match state.backend().week_plans(session.bearer().ok()?, week).await {
                Ok(plans) => plans.normalize(),
                Err(err) => {
                    warn!(week, error = %err, "Finished week unavailable, archiving without a summary");
                    return None;
                }
            },
        };
        Some(summarize_week(&plans, week, week_date))
    }

    async fn send_archive(
        state: &ClientState,
        session: &Session,
        request: &ArchiveWeekRequest,
    ) -> ClientResult<WeeklyArchive> {
        state.backend().archive_week(session.bearer()?, request).await
    }

    async fn send_generate(
        state: &ClientState,
        session: &Session,
        request: &GenerateWeekRequest,
    ) -> ClientResult<Vec<DailyPlan>> {
        state.backend().generate_week(session.bearer()?, request).await
    }
}
