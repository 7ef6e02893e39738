//! API request and response types

use crate::archive::ArchiveSummary;
use crate::models::{FitnessGoal, User};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ============================================================================
// Authentication
// ============================================================================

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
}

/// Authentication tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    #[serde(alias = "token", alias = "accessToken")]
    pub access_token: String,
    #[serde(default, alias = "refreshToken", skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime of the access token in seconds
    #[serde(default, alias = "expiresIn", skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Login/registration response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    #[serde(flatten)]
    pub tokens: AuthTokens,
}

/// Refresh token request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenRequest {
    #[serde(rename = "refreshToken")]
    pub refresh_token: String,
}

/// Profile update request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 50.0, max = 300.0, message = "Height must be between 50 and 300 cm"))]
    pub height_cm: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 20.0, max = 500.0, message = "Weight must be between 20 and 500 kg"))]
    pub weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 13, max = 120, message = "Age must be between 13 and 120"))]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fitness_goal: Option<FitnessGoal>,
}

// ============================================================================
// Plans
// ============================================================================

/// User-initiated completion change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionToggle {
    pub exercise_id: String,
    pub completed: bool,
}

impl CompletionToggle {
    pub fn new(exercise_id: impl Into<String>, completed: bool) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            completed,
        }
    }
}

/// Body of `POST /workouts/{day}/complete-exercise`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteItemRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_id: Option<String>,
    pub completed: bool,
    #[serde(rename = "weekNumber")]
    pub week_number: u32,
    #[serde(rename = "lockCompletion")]
    pub lock_completion: bool,
}

impl CompleteItemRequest {
    pub fn exercise(exercise_id: impl Into<String>, completed: bool, week_number: u32) -> Self {
        Self {
            exercise_id: Some(exercise_id.into()),
            meal_id: None,
            completed,
            week_number,
            lock_completion: true,
        }
    }

    pub fn meal(meal_id: impl Into<String>, completed: bool, week_number: u32) -> Self {
        Self {
            exercise_id: None,
            meal_id: Some(meal_id.into()),
            completed,
            week_number,
            lock_completion: true,
        }
    }
}

/// Body of `POST /workouts/archive-week`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveWeekRequest {
    pub week_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<ArchiveSummary>,
}

/// Body of `POST /workouts/generate-week`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateWeekRequest {
    pub goal: FitnessGoal,
    pub week_number: u32,
    pub week_start_date: NaiveDate,
}

/// Body of `POST /meals/generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMealsRequest {
    pub goal: FitnessGoal,
    pub week_number: u32,
}

/// Body of `POST /meals/{day}/consume`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumeMealRequest {
    pub meal_id: String,
    pub consumed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fake::faker::internet::en::SafeEmail;
    use fake::Fake;

    #[test]
    fn test_complete_item_request_wire_shape() {
        let body = serde_json::to_value(CompleteItemRequest::exercise("e1", true, 9)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "exercise_id": "e1",
                "completed": true,
                "weekNumber": 9,
                "lockCompletion": true
            })
        );
    }

    #[test]
    fn test_generate_week_request_wire_shape() {
        let request = GenerateWeekRequest {
            goal: FitnessGoal::MuscleGain,
            week_number: 10,
            week_start_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
        };
        let body = serde_json::to_value(request).unwrap();
        assert_eq!(body["goal"], "muscle_gain");
        assert_eq!(body["weekNumber"], 10);
        assert_eq!(body["weekStartDate"], "2025-03-03");
    }

    #[test]
    fn test_auth_response_accepts_token_alias() {
        let json = r#"{"user": {"_id": "u1", "email": "a@b.co"}, "token": "abc"}"#;
        let response: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.user.id, "u1");
        assert_eq!(response.tokens.access_token, "abc");
        assert_eq!(response.tokens.token_type, "Bearer");
        assert!(response.tokens.refresh_token.is_none());
    }

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            name: "Sam".to_string(),
            email: SafeEmail().fake(),
            password: "long-enough".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid = RegisterRequest {
            name: String::new(),
            email: "not-an-email".to_string(),
            password: "short".to_string(),
        };
        let errors = invalid.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }

    #[test]
    fn test_profile_update_range_validation() {
        let request = UpdateProfileRequest {
            height_cm: Some(20.0),
            ..Default::default()
        };
        assert!(request.validate().is_err());

        let request = UpdateProfileRequest {
            height_cm: Some(180.0),
            weight_kg: Some(80.0),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }
}
