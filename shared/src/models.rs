//! Data models for weekly workout and meal plans
//!
//! Plans are owned by the backend. Every collection on the wire is optional:
//! missing or `null` fields deserialize to empty values so the rest of the
//! crate can work on well-formed data.

use crate::errors::PlanError;
use chrono::{DateTime, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Deserialize `null` the same way as a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// Days
// ============================================================================

/// Day of the week, ordered Monday first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// All days in canonical (Monday-first) order
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Zero-based index, Monday = 0
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Wire name (lowercase)
    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        }
    }

    /// Human-readable name
    pub fn label(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DayOfWeek {
    type Err = PlanError;

    /// Accepts full names and three-letter abbreviations, any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|day| day.as_str() == lower || (lower.len() == 3 && day.as_str().starts_with(&lower)))
            .ok_or_else(|| PlanError::UnknownDay(s.to_string()))
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        // num_days_from_monday is always 0..=6
        Self::ALL[weekday.num_days_from_monday() as usize]
    }
}

impl From<DayOfWeek> for Weekday {
    fn from(day: DayOfWeek) -> Self {
        match day {
            DayOfWeek::Monday => Weekday::Mon,
            DayOfWeek::Tuesday => Weekday::Tue,
            DayOfWeek::Wednesday => Weekday::Wed,
            DayOfWeek::Thursday => Weekday::Thu,
            DayOfWeek::Friday => Weekday::Fri,
            DayOfWeek::Saturday => Weekday::Sat,
            DayOfWeek::Sunday => Weekday::Sun,
        }
    }
}

// ============================================================================
// Plan Items
// ============================================================================

/// A single exercise in a daily plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sets: u32,
    #[serde(default)]
    pub reps: u32,
    /// Working weight in kg
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Duration in minutes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub muscle_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A single meal in a daily plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// breakfast, lunch, dinner, snack
    #[serde(default, deserialize_with = "null_as_default")]
    pub meal_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub calories: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub protein: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub carbs: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fat: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fiber: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub consumed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consumed_at: Option<DateTime<Utc>>,
}

/// Daily nutrition targets
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutritionTargets {
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_calories: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_protein: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_carbs: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_fat: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub target_fiber: f64,
}

/// Completion state of a plan's items
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CompletedStatus {
    /// Exercise id -> completed
    #[serde(default, deserialize_with = "null_as_default")]
    pub exercises: BTreeMap<String, bool>,
    /// Meal id -> completed
    #[serde(default, deserialize_with = "null_as_default")]
    pub meals: BTreeMap<String, bool>,
    /// Exercise id -> moment it was marked complete
    #[serde(default, deserialize_with = "null_as_default")]
    pub completion_locked: BTreeMap<String, DateTime<Utc>>,
}

// ============================================================================
// Plans
// ============================================================================

/// One user's plan for one day of one week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPlan {
    #[serde(default, alias = "_id", deserialize_with = "null_as_default")]
    pub id: String,
    pub day: DayOfWeek,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub exercises: Vec<Exercise>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meals: Vec<Meal>,
    #[serde(flatten)]
    pub targets: NutritionTargets,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed_status: CompletedStatus,
    #[serde(default, alias = "weekNumber", deserialize_with = "null_as_default")]
    pub week_number: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DailyPlan {
    /// An empty plan for a day
    pub fn empty(day: DayOfWeek, week_number: u32) -> Self {
        Self {
            id: String::new(),
            day,
            date: None,
            exercises: Vec::new(),
            meals: Vec::new(),
            targets: NutritionTargets::default(),
            completed_status: CompletedStatus::default(),
            week_number,
            archived: false,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn has_exercise(&self, exercise_id: &str) -> bool {
        self.exercises.iter().any(|e| e.id == exercise_id)
    }

    pub fn has_meal(&self, meal_id: &str) -> bool {
        self.meals.iter().any(|m| m.id == meal_id)
    }

    /// Completed only if the id belongs to the plan and is flagged true
    pub fn is_exercise_completed(&self, exercise_id: &str) -> bool {
        self.has_exercise(exercise_id)
            && self
                .completed_status
                .exercises
                .get(exercise_id)
                .copied()
                .unwrap_or(false)
    }

    pub fn is_meal_completed(&self, meal_id: &str) -> bool {
        self.has_meal(meal_id)
            && self
                .completed_status
                .meals
                .get(meal_id)
                .copied()
                .unwrap_or(false)
    }

    pub fn lock_timestamp(&self, exercise_id: &str) -> Option<DateTime<Utc>> {
        self.completed_status.completion_locked.get(exercise_id).copied()
    }
}

/// A day of the meal plan (`/meals` surface)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMealPlan {
    #[serde(default, alias = "_id", deserialize_with = "null_as_default")]
    pub id: String,
    pub day: DayOfWeek,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meals: Vec<Meal>,
    #[serde(flatten)]
    pub targets: NutritionTargets,
    #[serde(default, alias = "weekNumber", deserialize_with = "null_as_default")]
    pub week_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Immutable snapshot of a finished week
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyArchive {
    #[serde(default, alias = "_id", deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(alias = "weekNumber")]
    pub week_number: u32,
    #[serde(alias = "startDate")]
    pub start_date: NaiveDate,
    #[serde(alias = "endDate")]
    pub end_date: NaiveDate,
    #[serde(default, alias = "totalExercises")]
    pub total_exercises: u32,
    #[serde(default, alias = "completedExercises")]
    pub completed_exercises: u32,
    #[serde(default, alias = "completionPercentage")]
    pub completion_percentage: u32,
    #[serde(default, alias = "streakLength")]
    pub streak_length: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub achievements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Users
// ============================================================================

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Trainer,
    Admin,
}

/// Authenticated user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Training goal driving plan generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitnessGoal {
    WeightLoss,
    MuscleGain,
    Maintenance,
    Endurance,
    #[default]
    GeneralFitness,
}

impl FitnessGoal {
    pub fn as_str(&self) -> &'static str {
        match self {
            FitnessGoal::WeightLoss => "weight_loss",
            FitnessGoal::MuscleGain => "muscle_gain",
            FitnessGoal::Maintenance => "maintenance",
            FitnessGoal::Endurance => "endurance",
            FitnessGoal::GeneralFitness => "general_fitness",
        }
    }
}

impl FromStr for FitnessGoal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "weight_loss" => Ok(FitnessGoal::WeightLoss),
            "muscle_gain" => Ok(FitnessGoal::MuscleGain),
            "maintenance" => Ok(FitnessGoal::Maintenance),
            "endurance" => Ok(FitnessGoal::Endurance),
            "general_fitness" => Ok(FitnessGoal::GeneralFitness),
            other => Err(format!("Unknown fitness goal: {}", other)),
        }
    }
}

/// User profile with body measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(alias = "_id")]
    pub id: String,
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fitness_goal: Option<FitnessGoal>,
}

/// User goals and daily nutrition targets
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserGoals {
    #[serde(default, deserialize_with = "null_as_default")]
    pub goal: FitnessGoal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workouts_per_week: Option<u32>,
    #[serde(flatten)]
    pub nutrition: NutritionTargets,
}
