//! FitTrack WASM Module
//!
//! WebAssembly bindings that let a browser front end run the same tracking
//! rules as the native client: progress, streaks, nutrition and the
//! completion lock. Plans cross the boundary as JSON in the backend's wire
//! format; results come back as JSON strings.

use chrono::{DateTime, NaiveDate, Utc};
use fittrack_shared::{
    calculate_bmi_result, compute_streak, daily_nutrition_progress, is_locked, weekly_progress,
    week_number, DailyPlan, DayOfWeek, Normalize,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

fn parse<T: DeserializeOwned>(json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid input: {}", e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| e.to_string())
}

fn parse_plan(plan_json: &str) -> Result<DailyPlan, String> {
    parse::<DailyPlan>(plan_json).map(Normalize::normalize)
}

fn parse_plans(plans_json: &str) -> Result<Vec<DailyPlan>, String> {
    parse::<Vec<DailyPlan>>(plans_json).map(Normalize::normalize)
}

fn js_error(message: String) -> JsValue {
    JsValue::from_str(&message)
}

// ============================================================================
// Progress
// ============================================================================

fn plan_completion_percentage(plan_json: &str) -> Result<u32, String> {
    parse_plan(plan_json).map(|plan| fittrack_shared::completion_percentage(&plan))
}

/// Completion percentage of a daily plan (exercises and meals)
#[wasm_bindgen(js_name = completionPercentage)]
pub fn completion_percentage(plan_json: &str) -> Result<u32, JsValue> {
    plan_completion_percentage(plan_json).map_err(js_error)
}

fn week_progress_json(plans_json: &str, week: u32) -> Result<String, String> {
    to_json(&weekly_progress(&parse_plans(plans_json)?, week))
}

/// Weekly progress summary as JSON
#[wasm_bindgen(js_name = weeklyProgress)]
pub fn weekly_progress_summary(plans_json: &str, week: u32) -> Result<String, JsValue> {
    week_progress_json(plans_json, week).map_err(js_error)
}

fn nutrition_json(plan_json: &str) -> Result<String, String> {
    to_json(&daily_nutrition_progress(&parse_plan(plan_json)?))
}

/// Nutrition progress of a daily plan as JSON
#[wasm_bindgen(js_name = nutritionProgress)]
pub fn nutrition_progress(plan_json: &str) -> Result<String, JsValue> {
    nutrition_json(plan_json).map_err(js_error)
}

// ============================================================================
// Streaks and locks
// ============================================================================

fn streak_json(plans_json: &str, today: &str) -> Result<String, String> {
    let today: DayOfWeek = today.parse().map_err(|e: fittrack_shared::PlanError| e.to_string())?;
    to_json(&compute_streak(&parse_plans(plans_json)?, today))
}

/// Current and longest streak of a week as of `today` ("monday".."sunday")
#[wasm_bindgen]
pub fn streak(plans_json: &str, today: &str) -> Result<String, JsValue> {
    streak_json(plans_json, today).map_err(js_error)
}

fn exercise_locked(plan_json: &str, exercise_id: &str, now_rfc3339: &str) -> Result<bool, String> {
    let now = DateTime::parse_from_rfc3339(now_rfc3339)
        .map_err(|e| format!("Invalid timestamp: {}", e))?
        .with_timezone(&Utc);
    Ok(is_locked(&parse_plan(plan_json)?, exercise_id, now))
}

/// Whether unmarking the exercise is still blocked by its lock window
#[wasm_bindgen(js_name = isExerciseLocked)]
pub fn is_exercise_locked(plan_json: &str, exercise_id: &str, now_rfc3339: &str) -> Result<bool, JsValue> {
    exercise_locked(plan_json, exercise_id, now_rfc3339).map_err(js_error)
}

/// Week number of an ISO date (`YYYY-MM-DD`), 0 if the date is invalid
#[wasm_bindgen(js_name = weekNumber)]
pub fn week_number_of(date: &str) -> u32 {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(week_number)
        .unwrap_or(0)
}

// ============================================================================
// Health
// ============================================================================

/// Calculate BMI from height (cm) and weight (kg), 0 for invalid input
#[wasm_bindgen]
pub fn bmi(height_cm: f64, weight_kg: f64) -> f64 {
    fittrack_shared::calculate_bmi(height_cm, weight_kg).unwrap_or(0.0)
}

fn bmi_json(height_cm: f64, weight_kg: f64) -> Result<String, String> {
    let result = calculate_bmi_result(height_cm, weight_kg)
        .ok_or_else(|| "Height and weight must be positive".to_string())?;
    to_json(&result)
}

/// BMI value, category and healthy weight range as JSON
#[wasm_bindgen(js_name = bmiResult)]
pub fn bmi_result(height_cm: f64, weight_kg: f64) -> Result<String, JsValue> {
    bmi_json(height_cm, weight_kg).map_err(js_error)
}
