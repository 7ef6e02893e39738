//! Backend collaborator
//!
//! The client core talks to the backend only through these traits. Every
//! authenticated call receives the bearer token explicitly.

mod http;

pub use http::HttpBackend;

use crate::error::ClientResult;
use async_trait::async_trait;
use fittrack_shared::{
    ArchiveWeekRequest, AuthResponse, AuthTokens, CompleteItemRequest, ConsumeMealRequest,
    DailyMealPlan, DailyPlan, DayOfWeek, GenerateMealsRequest, GenerateWeekRequest, LoginRequest,
    RegisterRequest, StreakInfo, UpdateProfileRequest, UserGoals, UserProfile, WeeklyArchive,
    WeeklyProgress,
};
use secrecy::SecretString;

/// Account and profile endpoints
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> ClientResult<AuthResponse>;

    async fn register(&self, request: &RegisterRequest) -> ClientResult<AuthResponse>;

    async fn logout(&self, token: &SecretString) -> ClientResult<()>;

    async fn refresh(&self, refresh_token: &SecretString) -> ClientResult<AuthTokens>;

    async fn profile(&self, token: &SecretString) -> ClientResult<UserProfile>;

    async fn update_profile(
        &self,
        token: &SecretString,
        request: &UpdateProfileRequest,
    ) -> ClientResult<UserProfile>;

    async fn goals(&self, token: &SecretString) -> ClientResult<UserGoals>;

    async fn update_goals(&self, token: &SecretString, goals: &UserGoals) -> ClientResult<UserGoals>;
}

/// Workout plan endpoints
#[async_trait]
pub trait WorkoutApi: Send + Sync {
    /// `GET /workouts?week={n}`
    async fn week_plans(&self, token: &SecretString, week: u32) -> ClientResult<Vec<DailyPlan>>;

    /// `POST /workouts/{day}/complete-exercise`
    async fn complete_item(
        &self,
        token: &SecretString,
        day: DayOfWeek,
        request: &CompleteItemRequest,
    ) -> ClientResult<DailyPlan>;

    /// `POST /workouts/archive-week`
    async fn archive_week(
        &self,
        token: &SecretString,
        request: &ArchiveWeekRequest,
    ) -> ClientResult<WeeklyArchive>;

    /// `POST /workouts/generate-week`
    async fn generate_week(
        &self,
        token: &SecretString,
        request: &GenerateWeekRequest,
    ) -> ClientResult<Vec<DailyPlan>>;

    /// `GET /workouts/progress?week={n}`
    async fn weekly_progress(&self, token: &SecretString, week: u32) -> ClientResult<WeeklyProgress>;

    /// `GET /progress/streak-enhanced`
    async fn streak(&self, token: &SecretString) -> ClientResult<StreakInfo>;
}

/// Meal plan endpoints
#[async_trait]
pub trait MealApi: Send + Sync {
    /// `GET /meals`
    async fn meal_week(&self, token: &SecretString) -> ClientResult<Vec<DailyMealPlan>>;

    /// `GET /meals/{day}`
    async fn meal_day(&self, token: &SecretString, day: DayOfWeek) -> ClientResult<DailyMealPlan>;

    /// `POST /meals/generate`
    async fn generate_meals(
        &self,
        token: &SecretString,
        request: &GenerateMealsRequest,
    ) -> ClientResult<Vec<DailyMealPlan>>;

    /// `POST /meals/{day}/consume`
    async fn consume_meal(
        &self,
        token: &SecretString,
        day: DayOfWeek,
        request: &ConsumeMealRequest,
    ) -> ClientResult<DailyMealPlan>;
}

/// Everything the client needs from the backend
pub trait Backend: AuthApi + WorkoutApi + MealApi {}

impl<T: AuthApi + WorkoutApi + MealApi> Backend for T {}
