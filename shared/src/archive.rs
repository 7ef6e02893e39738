//! Week summaries sent along with archive requests

use crate::models::{DailyPlan, DayOfWeek};
use crate::progress::{completed_exercise_count, percentage};
use crate::streak::final_streak;
use crate::week::week_end;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Completion milestones, highest first
const MILESTONE_PERCENTAGES: &[u32] = &[100, 75, 50, 25];

/// Streak length worth calling out
const STREAK_NOTE_MIN_DAYS: u32 = 3;

/// Client-side summary of a finished week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveSummary {
    pub week_number: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_exercises: u32,
    pub completed_exercises: u32,
    pub completion_percentage: u32,
    pub streak_length: u32,
    pub achievements: Vec<String>,
}

/// Summarize a week of plans for archiving
///
/// `week_start` may be any date in the week; it is snapped to Monday.
pub fn summarize_week(plans: &[DailyPlan], week_number: u32, week_start: NaiveDate) -> ArchiveSummary {
    let start_date = crate::week::week_start(week_start);
    let total_exercises: u32 = plans.iter().map(|p| p.exercises.len() as u32).sum();
    let completed_exercises: u32 = plans.iter().map(completed_exercise_count).sum();
    let completion_percentage = percentage(completed_exercises, total_exercises);
    let streak_length = final_streak(plans).current_streak;

    let mut achievements = Vec::new();

    if total_exercises > 0 {
        if let Some(milestone) = MILESTONE_PERCENTAGES
            .iter()
            .find(|m| completion_percentage >= **m)
        {
            if *milestone == 100 {
                achievements.push("Perfect week: every exercise completed".to_string());
            } else {
                achievements.push(format!("Completed {}% of the week's exercises", milestone));
            }
        }
    }

    if streak_length >= STREAK_NOTE_MIN_DAYS {
        achievements.push(format!("{}-day streak to close out the week", streak_length));
    }

    let mut days: Vec<&DailyPlan> = plans.iter().collect();
    days.sort_by_key(|p| p.day);
    for plan in days {
        if all_meals_consumed(plan) {
            achievements.push(format!("Hit every meal on {}", DayOfWeek::label(plan.day)));
        }
    }

    ArchiveSummary {
        week_number,
        start_date,
        end_date: week_end(start_date),
        total_exercises,
        completed_exercises,
        completion_percentage,
        streak_length,
        achievements,
    }
}

fn all_meals_consumed(plan: &DailyPlan) -> bool {
    !plan.meals.is_empty() && plan.meals.iter().all(|m| m.consumed || plan.is_meal_completed(&m.id))
}
