//! Progress arithmetic over daily plans
//!
//! All functions are pure and total: empty or partially filled plans
//! produce zeros, never panics. Completion flags only count when the id
//! they refer to exists in the plan.

use crate::models::{DailyMealPlan, DailyPlan, DayOfWeek, Meal, NutritionTargets};
use serde::{Deserialize, Serialize};

/// Rounded integer percentage, 0 when `whole` is 0
pub fn percentage(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    (100.0 * part as f64 / whole as f64).round() as u32
}

/// Number of plan exercises flagged complete
pub fn completed_exercise_count(plan: &DailyPlan) -> u32 {
    plan.completed_status
        .exercises
        .iter()
        .filter(|(id, done)| **done && plan.has_exercise(id))
        .count() as u32
}

/// Number of plan meals flagged complete
pub fn completed_meal_count(plan: &DailyPlan) -> u32 {
    plan.completed_status
        .meals
        .iter()
        .filter(|(id, done)| **done && plan.has_meal(id))
        .count() as u32
}

/// Share of exercises and meals completed, 0..=100
///
/// Formula: round(100 * (completed exercises + completed meals) / (exercises + meals))
pub fn completion_percentage(plan: &DailyPlan) -> u32 {
    let total = (plan.exercises.len() + plan.meals.len()) as u32;
    percentage(completed_exercise_count(plan) + completed_meal_count(plan), total)
}

/// True iff the plan has at least one exercise and every exercise is complete
///
/// A day without exercises never counts, so it cannot extend a streak.
pub fn day_fully_completed(plan: &DailyPlan) -> bool {
    !plan.exercises.is_empty() && plan.exercises.iter().all(|e| plan.is_exercise_completed(&e.id))
}

// ============================================================================
// Nutrition
// ============================================================================

/// Macro and calorie totals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    pub fiber: f64,
}

impl MacroTotals {
    fn add(mut self, meal: &Meal) -> Self {
        self.calories += meal.calories;
        self.protein += meal.protein;
        self.carbs += meal.carbs;
        self.fat += meal.fat;
        self.fiber += meal.fiber;
        self
    }
}

/// Sum macros over a set of meals
pub fn macro_totals<'a>(meals: impl IntoIterator<Item = &'a Meal>) -> MacroTotals {
    meals.into_iter().fold(MacroTotals::default(), MacroTotals::add)
}

/// Progress of one nutrient against its daily target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientProgress {
    pub consumed: f64,
    pub target: f64,
    /// round(100 * consumed / target), 0 when there is no target
    pub percentage: u32,
    /// max(0, target - consumed)
    pub remaining: f64,
}

impl NutrientProgress {
    pub fn new(consumed: f64, target: f64) -> Self {
        let percentage = if target > 0.0 {
            (100.0 * consumed / target).round().max(0.0) as u32
        } else {
            0
        };

        Self {
            consumed,
            target,
            percentage,
            remaining: (target - consumed).max(0.0),
        }
    }
}

/// Daily nutrition progress for all tracked nutrients
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionProgress {
    pub calories: NutrientProgress,
    pub protein: NutrientProgress,
    pub carbs: NutrientProgress,
    pub fat: NutrientProgress,
    pub fiber: NutrientProgress,
}

/// Nutrition progress over the consumed meals of a list
pub fn nutrition_progress(meals: &[Meal], targets: &NutritionTargets) -> NutritionProgress {
    let consumed = macro_totals(meals.iter().filter(|m| m.consumed));

    NutritionProgress {
        calories: NutrientProgress::new(consumed.calories, targets.target_calories),
        protein: NutrientProgress::new(consumed.protein, targets.target_protein),
        carbs: NutrientProgress::new(consumed.carbs, targets.target_carbs),
        fat: NutrientProgress::new(consumed.fat, targets.target_fat),
        fiber: NutrientProgress::new(consumed.fiber, targets.target_fiber),
    }
}

/// Nutrition progress of a daily plan
pub fn daily_nutrition_progress(plan: &DailyPlan) -> NutritionProgress {
    nutrition_progress(&plan.meals, &plan.targets)
}

/// Nutrition progress of a meal-plan day
pub fn meal_plan_nutrition_progress(plan: &DailyMealPlan) -> NutritionProgress {
    nutrition_progress(&plan.meals, &plan.targets)
}

// ============================================================================
// Weekly Progress
// ============================================================================

/// Per-day completion summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayProgress {
    pub day: DayOfWeek,
    pub total_exercises: u32,
    pub completed_exercises: u32,
    pub total_meals: u32,
    pub completed_meals: u32,
    pub percentage: u32,
    pub fully_completed: bool,
}

/// Completion summary of a whole week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyProgress {
    #[serde(alias = "weekNumber")]
    pub week_number: u32,
    #[serde(default)]
    pub total_exercises: u32,
    #[serde(default)]
    pub completed_exercises: u32,
    #[serde(default)]
    pub total_meals: u32,
    #[serde(default)]
    pub completed_meals: u32,
    /// Exercise completion across the week
    #[serde(default)]
    pub completion_percentage: u32,
    #[serde(default, deserialize_with = "crate::models::null_as_default")]
    pub days: Vec<DayProgress>,
}

/// Summarize a day
pub fn day_progress(plan: &DailyPlan) -> DayProgress {
    DayProgress {
        day: plan.day,
        total_exercises: plan.exercises.len() as u32,
        completed_exercises: completed_exercise_count(plan),
        total_meals: plan.meals.len() as u32,
        completed_meals: completed_meal_count(plan),
        percentage: completion_percentage(plan),
        fully_completed: day_fully_completed(plan),
    }
}

/// Summarize a week of plans, days in canonical order
pub fn weekly_progress(plans: &[DailyPlan], week_number: u32) -> WeeklyProgress {
    let mut days: Vec<DayProgress> = plans.iter().map(day_progress).collect();
    days.sort_by_key(|d| d.day);

    let total_exercises = days.iter().map(|d| d.total_exercises).sum();
    let completed_exercises = days.iter().map(|d| d.completed_exercises).sum();
    let total_meals = days.iter().map(|d| d.total_meals).sum();
    let completed_meals = days.iter().map(|d| d.completed_meals).sum();

    WeeklyProgress {
        week_number,
        total_exercises,
        completed_exercises,
        total_meals,
        completed_meals,
        completion_percentage: percentage(completed_exercises, total_exercises),
        days,
    }
}
