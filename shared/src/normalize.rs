//! Normalization of plans ingested from the backend
//!
//! Deserialization already turns missing collections into empty ones.
//! `normalize` finishes the job: the plan's item lists are the source of
//! truth, so completion flags and lock entries for unknown ids are dropped
//! and duplicate item ids are collapsed (first occurrence wins).

use crate::models::{DailyMealPlan, DailyPlan, Exercise, Meal};
use std::collections::HashSet;

/// Bring a backend payload into the shape the tracking logic assumes
pub trait Normalize {
    fn normalize(self) -> Self;
}

impl Normalize for DailyPlan {
    fn normalize(mut self) -> Self {
        self.exercises = dedup_by_id(self.exercises, |e: &Exercise| e.id.as_str());
        self.meals = dedup_by_id(self.meals, |m: &Meal| m.id.as_str());

        let exercise_ids: HashSet<String> = self.exercises.iter().map(|e| e.id.clone()).collect();
        let meal_ids: HashSet<String> = self.meals.iter().map(|m| m.id.clone()).collect();

        let status = &mut self.completed_status;
        status.exercises.retain(|id, _| exercise_ids.contains(id));
        status.meals.retain(|id, _| meal_ids.contains(id));
        status.completion_locked.retain(|id, _| exercise_ids.contains(id));

        self
    }
}

impl Normalize for DailyMealPlan {
    fn normalize(mut self) -> Self {
        self.meals = dedup_by_id(self.meals, |m: &Meal| m.id.as_str());
        self
    }
}

impl<T: Normalize> Normalize for Vec<T> {
    fn normalize(self) -> Self {
        self.into_iter().map(Normalize::normalize).collect()
    }
}

fn dedup_by_id<T>(items: Vec<T>, id: impl Fn(&T) -> &str) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| !id(item).is_empty() && seen.insert(id(item).to_string()))
        .collect()
}
