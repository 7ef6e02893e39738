//! Health metrics calculations module
//!
//! BMI calculation and classification from profile measurements.
//! Functions are pure and return `None` instead of dividing by zero.

use serde::{Deserialize, Serialize};

// ============================================================================
// BMI Calculations
// ============================================================================

/// BMI category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Get the BMI range for this category
    pub fn range(&self) -> (f64, f64) {
        match self {
            BmiCategory::Underweight => (0.0, 18.5),
            BmiCategory::Normal => (18.5, 25.0),
            BmiCategory::Overweight => (25.0, 30.0),
            BmiCategory::Obese => (30.0, f64::INFINITY),
        }
    }

    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
        }
    }
}

/// BMI calculation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiResult {
    /// BMI rounded to one decimal
    pub value: f64,
    pub category: BmiCategory,
    /// Healthy weight range in kg for this height
    pub healthy_weight_range_kg: (f64, f64),
}

/// Calculate BMI from height and weight, rounded to one decimal
///
/// Formula: BMI = weight(kg) / height(m)²
pub fn calculate_bmi(height_cm: f64, weight_kg: f64) -> Option<f64> {
    if !(height_cm.is_finite() && weight_kg.is_finite()) || height_cm <= 0.0 || weight_kg <= 0.0 {
        return None;
    }
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    Some((bmi * 10.0).round() / 10.0)
}

/// Classify BMI into category
pub fn classify_bmi(bmi: f64) -> BmiCategory {
    if bmi < 18.5 {
        BmiCategory::Underweight
    } else if bmi < 25.0 {
        BmiCategory::Normal
    } else if bmi < 30.0 {
        BmiCategory::Overweight
    } else {
        BmiCategory::Obese
    }
}

/// Calculate healthy weight range for a given height
///
/// Based on BMI 18.5-25 (normal range)
pub fn healthy_weight_range_kg(height_cm: f64) -> (f64, f64) {
    let height_m = height_cm / 100.0;
    let height_m_sq = height_m * height_m;
    (18.5 * height_m_sq, 25.0 * height_m_sq)
}

/// Calculate complete BMI result
///
/// The category is taken from the rounded value, so 24.99... reported as
/// 25.0 is classified as overweight.
pub fn calculate_bmi_result(height_cm: f64, weight_kg: f64) -> Option<BmiResult> {
    let value = calculate_bmi(height_cm, weight_kg)?;
    Some(BmiResult {
        value,
        category: classify_bmi(value),
        healthy_weight_range_kg: healthy_weight_range_kg(height_cm),
    })
}
