//! Input validation functions
//!
//! This module provides validation utilities for user input.
//! Request structs use the `validator` crate derive; the helpers here cover
//! loose values (CLI arguments, item ids, measurements).

use regex_lite::Regex;
use std::sync::OnceLock;

fn email_regex() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok())
        .as_ref()
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email cannot be empty".to_string());
    }
    if email.len() > 255 {
        return Err("Email too long".to_string());
    }
    if !email_regex().is_some_and(|re| re.is_match(email)) {
        return Err("Invalid email format".to_string());
    }
    Ok(())
}

/// Validate weight value (in kg)
pub fn validate_weight(weight_kg: f64) -> Result<(), String> {
    if weight_kg.is_nan() || weight_kg.is_infinite() {
        return Err("Weight must be a valid number".to_string());
    }
    if weight_kg < 20.0 {
        return Err("Weight must be at least 20 kg".to_string());
    }
    if weight_kg > 500.0 {
        return Err("Weight must be at most 500 kg".to_string());
    }
    Ok(())
}

/// Validate height value (in cm)
/// Valid range: 50-300 cm
pub fn validate_height_cm(height_cm: f64) -> Result<(), String> {
    if height_cm.is_nan() || height_cm.is_infinite() {
        return Err("Height must be a valid number".to_string());
    }
    if height_cm < 50.0 {
        return Err("Height must be at least 50 cm".to_string());
    }
    if height_cm > 300.0 {
        return Err("Height must be at most 300 cm".to_string());
    }
    Ok(())
}

/// Validate a week number (1-53)
pub fn validate_week_number(week: u32) -> Result<(), String> {
    if !(1..=53).contains(&week) {
        return Err(format!("Week number must be between 1 and 53, got {}", week));
    }
    Ok(())
}

/// Validate an exercise or meal id before it goes into a request body
///
/// Ids are backend-assigned and otherwise opaque; whether an id is valid is
/// decided by the plan that contains it.
pub fn validate_item_id(id: &str) -> Result<(), String> {
    if id.trim().is_empty() {
        return Err("Item id cannot be empty".to_string());
    }
    if id.chars().any(char::is_control) {
        return Err(format!("Invalid item id: {:?}", id));
    }
    Ok(())
}
