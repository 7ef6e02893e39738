//! Streak engine
//!
//! Streaks are derived from a week of daily plans on demand and never
//! stored. Given the same plans and the same `today`, the result is the
//! same whether the plans were just fetched or read from a cache.

use crate::models::{DailyPlan, DayOfWeek};
use crate::progress::day_fully_completed;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Streak state derived from a week of plans
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakInfo {
    /// Consecutive fully completed days ending at the most recent day <= today
    #[serde(default, alias = "currentStreak")]
    pub current_streak: u32,
    /// Longest run observed in the walk
    #[serde(default, alias = "longestStreak")]
    pub longest_streak: u32,
    /// `updated_at` of the last fully completed day
    #[serde(default, alias = "lastWorkoutDate", skip_serializing_if = "Option::is_none")]
    pub last_workout_date: Option<DateTime<Utc>>,
    /// A run was interrupted somewhere in the walk
    #[serde(default, alias = "streakBroken")]
    pub streak_broken: bool,
    #[serde(default, alias = "streakStartDate", skip_serializing_if = "Option::is_none")]
    pub streak_start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streak_start_day: Option<DayOfWeek>,
}

/// Compute streaks over up to seven plans as of `today`
///
/// Plans are walked in Monday-first order regardless of input order.
/// Days after `today` are ignored entirely, so forward-dated completions
/// never count. A weekday missing from the sequence breaks the run the
/// same way an incomplete day does. If a day appears twice, the first
/// plan for it wins.
pub fn compute_streak(plans: &[DailyPlan], today: DayOfWeek) -> StreakInfo {
    let mut ordered: Vec<&DailyPlan> = plans.iter().filter(|p| p.day <= today).collect();
    ordered.sort_by_key(|p| p.day);
    ordered.dedup_by_key(|p| p.day);

    let mut info = StreakInfo::default();
    let mut run = 0u32;
    let mut run_start: Option<&DailyPlan> = None;
    let mut previous: Option<DayOfWeek> = None;

    for plan in ordered {
        let gap = previous.is_some_and(|prev| plan.day.index() > prev.index() + 1);
        if gap && run > 0 {
            info.streak_broken = true;
            run = 0;
            run_start = None;
        }
        previous = Some(plan.day);

        if day_fully_completed(plan) {
            run += 1;
            if run == 1 {
                run_start = Some(plan);
            }
            info.longest_streak = info.longest_streak.max(run);
            info.last_workout_date = plan.updated_at.or(info.last_workout_date);
        } else {
            if run > 0 {
                info.streak_broken = true;
            }
            run = 0;
            run_start = None;
        }
    }

    info.current_streak = run;
    info.streak_start_day = run_start.map(|p| p.day);
    info.streak_start_date = run_start.and_then(|p| p.date);
    info
}

/// Streak as of the end of the week (used when archiving)
pub fn final_streak(plans: &[DailyPlan]) -> StreakInfo {
    compute_streak(plans, DayOfWeek::Sunday)
}
