//! Placeholder plans
//!
//! Served when a read from the backend fails so the client stays usable.
//! Every id carries the `demo-` prefix and results are always tagged
//! [`Provenance::Placeholder`](crate::cache::Provenance::Placeholder).

use fittrack_shared::{DailyMealPlan, DailyPlan, DayOfWeek, Exercise, Meal, NutritionTargets};

pub const PLACEHOLDER_ID_PREFIX: &str = "demo-";

/// (name, sets, reps, muscle group)
type ExerciseTemplate = (&'static str, u32, u32, &'static str);

const UPPER: &[ExerciseTemplate] = &[
    ("Push-ups", 3, 12, "chest"),
    ("Dumbbell Rows", 3, 10, "back"),
    ("Shoulder Press", 3, 10, "shoulders"),
];
const LOWER: &[ExerciseTemplate] = &[
    ("Bodyweight Squats", 3, 15, "legs"),
    ("Lunges", 3, 10, "legs"),
    ("Glute Bridges", 3, 12, "glutes"),
];
const CARDIO: &[ExerciseTemplate] = &[("Brisk Walk", 1, 1, "cardio"), ("Jumping Jacks", 3, 30, "cardio")];
const CORE: &[ExerciseTemplate] = &[("Plank", 3, 1, "core"), ("Dead Bug", 3, 10, "core")];
const MOBILITY: &[ExerciseTemplate] = &[("Stretching Routine", 1, 1, "mobility")];

/// (meal type, name, calories, protein, carbs, fat, fiber)
type MealTemplate = (&'static str, &'static str, f64, f64, f64, f64, f64);

const MEALS: &[MealTemplate] = &[
    ("breakfast", "Oatmeal with Berries", 450.0, 15.0, 70.0, 10.0, 8.0),
    ("lunch", "Grilled Chicken Salad", 600.0, 45.0, 40.0, 25.0, 9.0),
    ("dinner", "Salmon with Rice", 700.0, 40.0, 75.0, 22.0, 6.0),
    ("snack", "Greek Yogurt", 200.0, 18.0, 15.0, 5.0, 2.0),
];

const TARGETS: NutritionTargets = NutritionTargets {
    target_calories: 2000.0,
    target_protein: 120.0,
    target_carbs: 220.0,
    target_fat: 65.0,
    target_fiber: 30.0,
};

fn routine(day: DayOfWeek) -> &'static [ExerciseTemplate] {
    match day {
        DayOfWeek::Monday | DayOfWeek::Thursday => UPPER,
        DayOfWeek::Tuesday | DayOfWeek::Friday => LOWER,
        DayOfWeek::Wednesday => CARDIO,
        DayOfWeek::Saturday => CORE,
        DayOfWeek::Sunday => MOBILITY,
    }
}

fn placeholder_meals(day: DayOfWeek) -> Vec<Meal> {
    MEALS
        .iter()
        .map(|(meal_type, name, calories, protein, carbs, fat, fiber)| Meal {
            id: format!("{}{}-{}", PLACEHOLDER_ID_PREFIX, day, meal_type),
            name: name.to_string(),
            meal_type: meal_type.to_string(),
            calories: *calories,
            protein: *protein,
            carbs: *carbs,
            fat: *fat,
            fiber: *fiber,
            consumed: false,
            consumed_at: None,
        })
        .collect()
}

/// Placeholder plan for one day
pub fn placeholder_day(day: DayOfWeek, week_number: u32) -> DailyPlan {
    let exercises = routine(day)
        .iter()
        .enumerate()
        .map(|(i, (name, sets, reps, muscle_group))| Exercise {
            id: format!("{}{}-{}", PLACEHOLDER_ID_PREFIX, day, i),
            name: name.to_string(),
            sets: *sets,
            reps: *reps,
            weight: None,
            duration: None,
            muscle_group: muscle_group.to_string(),
            completed_at: None,
        })
        .collect();

    DailyPlan {
        id: format!("{}{}", PLACEHOLDER_ID_PREFIX, day),
        exercises,
        meals: placeholder_meals(day),
        targets: TARGETS,
        ..DailyPlan::empty(day, week_number)
    }
}

/// Placeholder plans for a whole week, Monday first
pub fn placeholder_week(week_number: u32) -> Vec<DailyPlan> {
    DayOfWeek::ALL
        .iter()
        .map(|day| placeholder_day(*day, week_number))
        .collect()
}

/// Placeholder meal plan for one day
pub fn placeholder_meal_day(day: DayOfWeek, week_number: u32) -> DailyMealPlan {
    DailyMealPlan {
        id: format!("{}meals-{}", PLACEHOLDER_ID_PREFIX, day),
        day,
        meals: placeholder_meals(day),
        targets: TARGETS,
        week_number,
        updated_at: None,
    }
}

pub fn placeholder_meal_week(week_number: u32) -> Vec<DailyMealPlan> {
    DayOfWeek::ALL
        .iter()
        .map(|day| placeholder_meal_day(*day, week_number))
        .collect()
}

#[inline]
pub fn is_placeholder_id(id: &str) -> bool {
    id.starts_with(PLACEHOLDER_ID_PREFIX)
}
