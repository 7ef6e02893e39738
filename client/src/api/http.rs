//! HTTP implementation of the backend collaborator

use super::{AuthApi, MealApi, WorkoutApi};
use crate::config::ApiConfig;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use fittrack_shared::{
    ArchiveWeekRequest, AuthResponse, AuthTokens, CompleteItemRequest, ConsumeMealRequest,
    DailyMealPlan, DailyPlan, DayOfWeek, ErrorResponse, GenerateMealsRequest, GenerateWeekRequest,
    LoginRequest, RefreshTokenRequest, RegisterRequest, StreakInfo, UpdateProfileRequest,
    UserGoals, UserProfile, WeeklyArchive, WeeklyProgress,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

/// Responses arrive either bare or wrapped in `{"data": ...}`
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(data) => data,
        }
    }
}

/// `reqwest` client for the FitTrack REST API
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&SecretString>) -> RequestBuilder {
        let request = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-Request-Id", Uuid::new_v4().to_string());
        match token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Send a request and return the body of a successful response
    async fn execute(&self, request: RequestBuilder, path: &str) -> ClientResult<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(path = %path, status = status.as_u16(), "Backend response");

        if !status.is_success() {
            return Err(error_for_status(status, &body));
        }
        Ok(body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, token: &SecretString) -> ClientResult<T> {
        let request = self.request(Method::GET, path, Some(token));
        decode(&self.execute(request, path).await?)
    }

    async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        token: Option<&SecretString>,
        body: &B,
    ) -> ClientResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let request = self.request(method, path, token).json(body);
        decode(&self.execute(request, path).await?)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> ClientResult<T> {
    serde_json::from_str::<Envelope<T>>(body)
        .map(Envelope::into_inner)
        .map_err(|e| ClientError::Decode(e.to_string()))
}

/// Map a non-success status to a client error, keeping the backend's message
fn error_for_status(status: StatusCode, body: &str) -> ClientError {
    let message = error_message(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Unexpected status")
            .to_string()
    });

    match status {
        StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
        StatusCode::FORBIDDEN => ClientError::Forbidden(message),
        StatusCode::NOT_FOUND => ClientError::NotFound(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation(message),
        _ => {
            if status.is_server_error() {
                warn!(status = status.as_u16(), message = %message, "Backend server error");
            }
            ClientError::Backend {
                status: status.as_u16(),
                message,
            }
        }
    }
}

fn error_message(body: &str) -> Option<String> {
    if let Ok(response) = serde_json::from_str::<ErrorResponse>(body) {
        return Some(response.error.message);
    }
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("message")
        .or_else(|| value.get("error"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

#[async_trait]
impl AuthApi for HttpBackend {
    async fn login(&self, request: &LoginRequest) -> ClientResult<AuthResponse> {
        self.send_json(Method::POST, "/auth/login", None, request).await
    }

    async fn register(&self, request: &RegisterRequest) -> ClientResult<AuthResponse> {
        self.send_json(Method::POST, "/auth/register", None, request).await
    }

    async fn logout(&self, token: &SecretString) -> ClientResult<()> {
        let path = "/auth/logout";
        let request = self.request(Method::POST, path, Some(token));
        self.execute(request, path).await.map(|_| ())
    }

    async fn refresh(&self, refresh_token: &SecretString) -> ClientResult<AuthTokens> {
        let body = RefreshTokenRequest {
            refresh_token: refresh_token.expose_secret().clone(),
        };
        self.send_json(Method::POST, "/auth/refresh-token", None, &body).await
    }

    async fn profile(&self, token: &SecretString) -> ClientResult<UserProfile> {
        self.get("/auth/profile", token).await
    }

    async fn update_profile(
        &self,
        token: &SecretString,
        request: &UpdateProfileRequest,
    ) -> ClientResult<UserProfile> {
        self.send_json(Method::PUT, "/auth/profile", Some(token), request).await
    }

    async fn goals(&self, token: &SecretString) -> ClientResult<UserGoals> {
        self.get("/auth/goals", token).await
    }

    async fn update_goals(&self, token: &SecretString, goals: &UserGoals) -> ClientResult<UserGoals> {
        self.send_json(Method::PUT, "/auth/goals", Some(token), goals).await
    }
}

#[async_trait]
impl WorkoutApi for HttpBackend {
    async fn week_plans(&self, token: &SecretString, week: u32) -> ClientResult<Vec<DailyPlan>> {
        self.get(&format!("/workouts?week={}", week), token).await
    }

    async fn complete_item(
        &self,
        token: &SecretString,
        day: DayOfWeek,
        request: &CompleteItemRequest,
    ) -> ClientResult<DailyPlan> {
        let path = format!("/workouts/{}/complete-exercise", day);
        self.send_json(Method::POST, &path, Some(token), request).await
    }

    async fn archive_week(
        &self,
        token: &SecretString,
        request: &ArchiveWeekRequest,
    ) -> ClientResult<WeeklyArchive> {
        self.send_json(Method::POST, "/workouts/archive-week", Some(token), request)
            .await
    }

    async fn generate_week(
        &self,
        token: &SecretString,
        request: &GenerateWeekRequest,
    ) -> ClientResult<Vec<DailyPlan>> {
        self.send_json(Method::POST, "/workouts/generate-week", Some(token), request)
            .await
    }

    async fn weekly_progress(&self, token: &SecretString, week: u32) -> ClientResult<WeeklyProgress> {
        self.get(&format!("/workouts/progress?week={}", week), token).await
    }

    async fn streak(&self, token: &SecretString) -> ClientResult<StreakInfo> {
        self.get("/progress/streak-enhanced", token).await
    }
}

#[async_trait]
impl MealApi for HttpBackend {
    async fn meal_week(&self, token: &SecretString) -> ClientResult<Vec<DailyMealPlan>> {
        self.get("/meals", token).await
    }

    async fn meal_day(&self, token: &SecretString, day: DayOfWeek) -> ClientResult<DailyMealPlan> {
        self.get(&format!("/meals/{}", day), token).await
    }

    async fn generate_meals(
        &self,
        token: &SecretString,
        request: &GenerateMealsRequest,
    ) -> ClientResult<Vec<DailyMealPlan>> {
        self.send_json(Method::POST, "/meals/generate", Some(token), request).await
    }

    async fn consume_meal(
        &self,
        token: &SecretString,
        day: DayOfWeek,
        request: &ConsumeMealRequest,
    ) -> ClientResult<DailyMealPlan> {
        let path = format!("/meals/{}/consume", day);
        self.send_json(Method::POST, &path, Some(token), request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_decode_accepts_wrapped_and_bare() {
        let bare: Vec<u32> = decode("[1, 2]").unwrap();
        let wrapped: Vec<u32> = decode(r#"{"data": [1, 2]}"#).unwrap();
        assert_eq!(bare, wrapped);
    }

    #[test]
    fn test_decode_failure_is_decode_error() {
        let result: ClientResult<Vec<u32>> = decode("<html>oops</html>");
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }

    #[rstest]
    #[case(401, "UNAUTHORIZED")]
    #[case(403, "FORBIDDEN")]
    #[case(404, "NOT_FOUND")]
    #[case(422, "VALIDATION_ERROR")]
    #[case(500, "BACKEND_ERROR")]
    #[case(502, "BACKEND_ERROR")]
    fn test_status_mapping(#[case] status: u16, #[case] code: &str) {
        let status = StatusCode::from_u16(status).unwrap();
        assert_eq!(error_for_status(status, "").code(), code);
    }

    #[rstest]
    #[case(r#"{"error": {"code": "LOCKED", "message": "Exercise is locked"}}"#, "Exercise is locked")]
    #[case(r#"{"message": "Week not found"}"#, "Week not found")]
    #[case(r#"{"error": "Token expired"}"#, "Token expired")]
    fn test_error_message_shapes(#[case] body: &str, #[case] expected: &str) {
        assert_eq!(error_message(body).as_deref(), Some(expected));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let backend = HttpBackend::new(&ApiConfig {
            base_url: "http://localhost:5000/api/".to_string(),
            timeout_secs: 5,
            user_agent: "test".to_string(),
        })
        .unwrap();
        assert_eq!(backend.base_url(), "http://localhost:5000/api");
    }
}
