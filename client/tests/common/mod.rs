//! Common test utilities for integration tests
//!
//! Provides an in-memory backend that records every call and a test client
//! wired to it with an in-memory state store that can be made to fail.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use fittrack_client::api::{AuthApi, MealApi, WorkoutApi};
use fittrack_client::auth::{AuthSession, PersistedSession};
use fittrack_client::config::ClientConfig;
use fittrack_client::storage::{MemoryStore, StateStore};
use fittrack_client::{ClientError, ClientResult, ClientState, Session};
use fittrack_shared::{
    compute_streak, weekly_progress, ArchiveWeekRequest, AuthResponse, AuthTokens,
    CompleteItemRequest, ConsumeMealRequest, DailyMealPlan, DailyPlan, DayOfWeek, Exercise,
    FitnessGoal, GenerateMealsRequest, GenerateWeekRequest, LoginRequest, Meal, NutritionTargets,
    RegisterRequest, Role, StreakInfo, UpdateProfileRequest, User, UserGoals, UserProfile,
    WeeklyArchive, WeeklyProgress,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const USER_ID: &str = "user-1";

/// Wednesday of week 41
pub fn wednesday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 7, 12, 0, 0).unwrap()
}

/// Wednesday of week 40
pub fn previous_wednesday() -> DateTime<Utc> {
    wednesday() - Duration::days(7)
}

pub fn test_user() -> User {
    User {
        id: USER_ID.to_string(),
        email: "sam@example.com".to_string(),
        name: "Sam".to_string(),
        role: Role::User,
        created_at: None,
    }
}

/// Unsigned-for-our-purposes JWT with the given expiry
pub fn jwt_expiring_at(exp: DateTime<Utc>) -> String {
    let claims = json!({ "sub": USER_ID, "exp": exp.timestamp(), "iat": Utc::now().timestamp() });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(b"test-secret")).unwrap()
}

pub fn valid_jwt() -> String {
    jwt_expiring_at(Utc::now() + Duration::hours(1))
}

pub fn expired_jwt() -> String {
    jwt_expiring_at(Utc::now() - Duration::hours(1))
}

pub fn tokens(access_token: String) -> AuthTokens {
    AuthTokens {
        access_token,
        refresh_token: Some("refresh-1".to_string()),
        token_type: "Bearer".to_string(),
        expires_in: Some(3600),
    }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn exercise(id: &str) -> Exercise {
    Exercise {
        id: id.to_string(),
        name: format!("Exercise {}", id),
        sets: 3,
        reps: 10,
        weight: None,
        duration: None,
        muscle_group: "legs".to_string(),
        completed_at: None,
    }
}

pub fn meal(id: &str, calories: f64) -> Meal {
    Meal {
        id: id.to_string(),
        name: format!("Meal {}", id),
        meal_type: "lunch".to_string(),
        calories,
        protein: 30.0,
        carbs: 50.0,
        fat: 15.0,
        fiber: 5.0,
        consumed: false,
        consumed_at: None,
    }
}

/// A plan whose exercise and meal ids are prefixed with the day
pub fn plan(day: DayOfWeek, week_number: u32) -> DailyPlan {
    let mut plan = DailyPlan::empty(day, week_number);
    plan.id = format!("plan-{}-{}", week_number, day.as_str());
    plan.exercises = vec![
        exercise(&format!("{}-squat", day.as_str())),
        exercise(&format!("{}-plank", day.as_str())),
    ];
    plan.meals = vec![meal(&format!("{}-lunch", day.as_str()), 600.0)];
    plan.targets = NutritionTargets {
        target_calories: 2000.0,
        target_protein: 120.0,
        target_carbs: 220.0,
        target_fat: 65.0,
        target_fiber: 30.0,
    };
    plan
}

pub fn full_week(week_number: u32) -> Vec<DailyPlan> {
    DayOfWeek::ALL.into_iter().map(|day| plan(day, week_number)).collect()
}

/// Mark every exercise of a plan complete
pub fn complete_all(plan: &mut DailyPlan, at: DateTime<Utc>) {
    for exercise in &plan.exercises {
        plan.completed_status.exercises.insert(exercise.id.clone(), true);
        plan.completed_status.completion_locked.insert(exercise.id.clone(), at);
    }
}

pub fn meal_day(day: DayOfWeek, week_number: u32) -> DailyMealPlan {
    let plan = plan(day, week_number);
    DailyMealPlan {
        id: format!("meals-{}", day.as_str()),
        day,
        meals: vec![meal(&format!("{}-breakfast", day.as_str()), 400.0), plan.meals[0].clone()],
        targets: plan.targets,
        week_number,
        updated_at: None,
    }
}

// ============================================================================
// Fake backend
// ============================================================================

/// How a faked call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    Unauthorized,
    Server,
}

impl Failure {
    fn to_error(self) -> ClientError {
        match self {
            Failure::Unauthorized => ClientError::Unauthorized("Invalid token".to_string()),
            Failure::Server => ClientError::Backend {
                status: 500,
                message: "Internal server error".to_string(),
            },
        }
    }
}

/// Backend data and a log of what the client asked for
#[derive(Debug, Default)]
pub struct FakeData {
    pub weeks: HashMap<u32, Vec<DailyPlan>>,
    pub meals: Vec<DailyMealPlan>,
    pub profile: Option<UserProfile>,
    pub goals: UserGoals,
    pub streak: StreakInfo,
    /// Operation names in call order
    pub calls: Vec<&'static str>,
    /// Bearer tokens seen on authenticated calls
    pub tokens_seen: Vec<String>,
    pub failures: HashMap<&'static str, Failure>,
    pub archived: Vec<ArchiveWeekRequest>,
    pub generated: Vec<GenerateWeekRequest>,
    pub completions: Vec<(DayOfWeek, CompleteItemRequest)>,
    pub consumed: Vec<(DayOfWeek, ConsumeMealRequest)>,
    /// Lock timestamp the backend stamps on completed exercises
    pub server_lock_time: Option<DateTime<Utc>>,
    /// Day the backend wrongly answers meal consumption with
    pub misrouted_meal_day: Option<DayOfWeek>,
}

#[derive(Debug, Default)]
pub struct FakeBackend {
    pub data: Mutex<FakeData>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_week(week_number: u32, plans: Vec<DailyPlan>) -> Self {
        let backend = Self::default();
        backend.data.lock().unwrap().weeks.insert(week_number, plans);
        backend
    }

    pub fn fail(&self, operation: &'static str, failure: Failure) {
        self.data.lock().unwrap().failures.insert(operation, failure);
    }

    pub fn recover(&self, operation: &'static str) {
        self.data.lock().unwrap().failures.remove(operation);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.data.lock().unwrap().calls.clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.data
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == operation)
            .count()
    }

    pub fn week(&self, week_number: u32) -> Vec<DailyPlan> {
        self.data
            .lock()
            .unwrap()
            .weeks
            .get(&week_number)
            .cloned()
            .unwrap_or_default()
    }

    fn enter(&self, operation: &'static str, token: Option<&SecretString>) -> ClientResult<()> {
        let mut data = self.data.lock().unwrap();
        data.calls.push(operation);
        if let Some(token) = token {
            data.tokens_seen.push(token.expose_secret().clone());
        }
        match data.failures.get(operation) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AuthApi for FakeBackend {
    async fn login(&self, request: &LoginRequest) -> ClientResult<AuthResponse> {
        self.enter("login", None)?;
        Ok(AuthResponse {
            user: User {
                email: request.email.clone(),
                ..test_user()
            },
            tokens: tokens(valid_jwt()),
        })
    }

    async fn register(&self, request: &RegisterRequest) -> ClientResult<AuthResponse> {
        self.enter("register", None)?;
        Ok(AuthResponse {
            user: User {
                email: request.email.clone(),
                name: request.name.clone(),
                ..test_user()
            },
            tokens: tokens(valid_jwt()),
        })
    }

    async fn logout(&self, token: &SecretString) -> ClientResult<()> {
        self.enter("logout", Some(token))
    }

    async fn refresh(&self, refresh_token: &SecretString) -> ClientResult<AuthTokens> {
        self.enter("refresh", Some(refresh_token))?;
        Ok(AuthTokens {
            refresh_token: None,
            ..tokens(valid_jwt())
        })
    }

    async fn profile(&self, token: &SecretString) -> ClientResult<UserProfile> {
        self.enter("profile", Some(token))?;
        self.data
            .lock()
            .unwrap()
            .profile
            .clone()
            .ok_or_else(|| ClientError::NotFound("User not found".to_string()))
    }

    async fn update_profile(
        &self,
        token: &SecretString,
        request: &UpdateProfileRequest,
    ) -> ClientResult<UserProfile> {
        self.enter("update_profile", Some(token))?;
        let mut data = self.data.lock().unwrap();
        let mut profile = data.profile.clone().unwrap_or(UserProfile {
            id: USER_ID.to_string(),
            email: "sam@example.com".to_string(),
            name: "Sam".to_string(),
            role: Role::User,
            height_cm: None,
            weight_kg: None,
            age: None,
            gender: None,
            activity_level: None,
            fitness_goal: None,
        });
        if let Some(name) = &request.name {
            profile.name = name.clone();
        }
        profile.height_cm = request.height_cm.or(profile.height_cm);
        profile.weight_kg = request.weight_kg.or(profile.weight_kg);
        profile.age = request.age.or(profile.age);
        profile.fitness_goal = request.fitness_goal.or(profile.fitness_goal);
        data.profile = Some(profile.clone());
        Ok(profile)
    }

    async fn goals(&self, token: &SecretString) -> ClientResult<UserGoals> {
        self.enter("goals", Some(token))?;
        Ok(self.data.lock().unwrap().goals.clone())
    }

    async fn update_goals(&self, token: &SecretString, goals: &UserGoals) -> ClientResult<UserGoals> {
        self.enter("update_goals", Some(token))?;
        self.data.lock().unwrap().goals = goals.clone();
        Ok(goals.clone())
    }
}

#[async_trait]
impl WorkoutApi for FakeBackend {
    async fn week_plans(&self, token: &SecretString, week: u32) -> ClientResult<Vec<DailyPlan>> {
        self.enter("week_plans", Some(token))?;
        Ok(self.week(week))
    }

    async fn complete_item(
        &self,
        token: &SecretString,
        day: DayOfWeek,
        request: &CompleteItemRequest,
    ) -> ClientResult<DailyPlan> {
        self.enter("complete_item", Some(token))?;
        let mut data = self.data.lock().unwrap();
        data.completions.push((day, request.clone()));
        let lock_time = data.server_lock_time;

        let plan = data
            .weeks
            .get_mut(&request.week_number)
            .and_then(|plans| plans.iter_mut().find(|p| p.day == day))
            .ok_or_else(|| ClientError::NotFound("Workout plan not found".to_string()))?;

        let status = &mut plan.completed_status;
        if let Some(exercise_id) = &request.exercise_id {
            status.exercises.insert(exercise_id.clone(), request.completed);
            if request.completed {
                if let Some(at) = lock_time {
                    status.completion_locked.insert(exercise_id.clone(), at);
                }
            } else {
                status.completion_locked.remove(exercise_id);
            }
        }
        if let Some(meal_id) = &request.meal_id {
            status.meals.insert(meal_id.clone(), request.completed);
        }
        plan.updated_at = Some(Utc::now());
        Ok(plan.clone())
    }

    async fn archive_week(
        &self,
        token: &SecretString,
        request: &ArchiveWeekRequest,
    ) -> ClientResult<WeeklyArchive> {
        self.enter("archive_week", Some(token))?;
        self.data.lock().unwrap().archived.push(request.clone());

        let summary = request.summary.as_ref();
        let start_date = summary
            .map(|s| s.start_date)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2026, 9, 28).unwrap());
        Ok(WeeklyArchive {
            id: format!("archive-{}", request.week_number),
            week_number: request.week_number,
            start_date,
            end_date: start_date + Duration::days(6),
            total_exercises: summary.map_or(0, |s| s.total_exercises),
            completed_exercises: summary.map_or(0, |s| s.completed_exercises),
            completion_percentage: summary.map_or(0, |s| s.completion_percentage),
            streak_length: summary.map_or(0, |s| s.streak_length),
            achievements: summary.map(|s| s.achievements.clone()).unwrap_or_default(),
            created_at: Some(Utc::now()),
        })
    }

    async fn generate_week(
        &self,
        token: &SecretString,
        request: &GenerateWeekRequest,
    ) -> ClientResult<Vec<DailyPlan>> {
        self.enter("generate_week", Some(token))?;
        let mut data = self.data.lock().unwrap();
        data.generated.push(request.clone());
        let plans = full_week(request.week_number);
        data.weeks.insert(request.week_number, plans.clone());
        Ok(plans)
    }

    async fn weekly_progress(&self, token: &SecretString, week: u32) -> ClientResult<WeeklyProgress> {
        self.enter("weekly_progress", Some(token))?;
        Ok(weekly_progress(&self.week(week), week))
    }

    async fn streak(&self, token: &SecretString) -> ClientResult<StreakInfo> {
        self.enter("streak", Some(token))?;
        Ok(self.data.lock().unwrap().streak.clone())
    }
}

#[async_trait]
impl MealApi for FakeBackend {
    async fn meal_week(&self, token: &SecretString) -> ClientResult<Vec<DailyMealPlan>> {
        self.enter("meal_week", Some(token))?;
        Ok(self.data.lock().unwrap().meals.clone())
    }

    async fn meal_day(&self, token: &SecretString, day: DayOfWeek) -> ClientResult<DailyMealPlan> {
        self.enter("meal_day", Some(token))?;
        self.data
            .lock()
            .unwrap()
            .meals
            .iter()
            .find(|p| p.day == day)
            .cloned()
            .ok_or_else(|| ClientError::NotFound("Meal plan not found".to_string()))
    }

    async fn generate_meals(
        &self,
        token: &SecretString,
        request: &GenerateMealsRequest,
    ) -> ClientResult<Vec<DailyMealPlan>> {
        self.enter("generate_meals", Some(token))?;
        let meals: Vec<DailyMealPlan> = DayOfWeek::ALL
            .into_iter()
            .map(|day| meal_day(day, request.week_number))
            .collect();
        self.data.lock().unwrap().meals = meals.clone();
        Ok(meals)
    }

    async fn consume_meal(
        &self,
        token: &SecretString,
        day: DayOfWeek,
        request: &ConsumeMealRequest,
    ) -> ClientResult<DailyMealPlan> {
        self.enter("consume_meal", Some(token))?;
        let mut data = self.data.lock().unwrap();
        data.consumed.push((day, request.clone()));
        let plan = data
            .meals
            .iter_mut()
            .find(|p| p.day == day)
            .ok_or_else(|| ClientError::NotFound("Meal plan not found".to_string()))?;
        for meal in plan.meals.iter_mut().filter(|m| m.id == request.meal_id) {
            meal.consumed = request.consumed;
        }
        let mut answer = plan.clone();
        if let Some(wrong_day) = data.misrouted_meal_day {
            answer.day = wrong_day;
        }
        Ok(answer)
    }
}

// ============================================================================
// Test client
// ============================================================================

/// Client state wired to a fake backend and an in-memory store
// ============================================================================
// State store
// ============================================================================

/// In-memory store whose week reads or writes can be switched to fail
#[derive(Default)]
pub struct TestStore {
    inner: MemoryStore,
    failing_reads: AtomicBool,
    failing_writes: AtomicBool,
}

impl TestStore {
    pub fn fail_week_reads(&self) {
        self.failing_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_week_writes(&self) {
        self.failing_writes.store(true, Ordering::SeqCst);
    }

    pub fn recover(&self) {
        self.failing_reads.store(false, Ordering::SeqCst);
        self.failing_writes.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl StateStore for TestStore {
    async fn last_seen_week(&self, user_id: &str) -> ClientResult<Option<u32>> {
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(ClientError::Storage("state file unreadable".to_string()));
        }
        self.inner.last_seen_week(user_id).await
    }

    async fn set_last_seen_week(&self, user_id: &str, week: u32) -> ClientResult<()> {
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(ClientError::Storage("read-only".to_string()));
        }
        self.inner.set_last_seen_week(user_id, week).await
    }

    async fn load_session(&self) -> ClientResult<Option<PersistedSession>> {
        self.inner.load_session().await
    }

    async fn save_session(&self, session: &PersistedSession) -> ClientResult<()> {
        self.inner.save_session(session).await
    }

    async fn clear_session(&self) -> ClientResult<()> {
        self.inner.clear_session().await
    }
}

pub struct TestClient {
    pub state: ClientState,
    pub session: Session,
    pub backend: Arc<FakeBackend>,
    pub store: Arc<TestStore>,
}

impl TestClient {
    /// Anonymous client
    pub fn new(backend: FakeBackend) -> Self {
        Self::with_config(backend, test_config())
    }

    pub fn with_config(backend: FakeBackend, config: ClientConfig) -> Self {
        let backend = Arc::new(backend);
        let store = Arc::new(TestStore::default());
        let state = ClientState::new(backend.clone(), store.clone(), config);
        Self {
            state,
            session: Session::new(),
            backend,
            store,
        }
    }

    /// Client with a logged-in user whose session is persisted
    pub async fn logged_in(backend: FakeBackend) -> Self {
        Self::logged_in_with_config(backend, test_config()).await
    }

    pub async fn logged_in_with_config(backend: FakeBackend, config: ClientConfig) -> Self {
        let mut client = Self::with_config(backend, config);
        let auth = AuthSession::new(test_user(), tokens(valid_jwt()));
        client.store.save_session(&auth.to_persisted()).await.unwrap();
        client.session.establish(auth);
        client
    }

    pub async fn last_seen_week(&self) -> Option<u32> {
        self.store.inner.last_seen_week(USER_ID).await.unwrap()
    }

    pub async fn set_last_seen_week(&self, week: u32) {
        self.store.inner.set_last_seen_week(USER_ID, week).await.unwrap();
    }

    pub async fn persisted_session_exists(&self) -> bool {
        self.store.load_session().await.unwrap().is_some()
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig::default()
}

pub fn config_without_fallback() -> ClientConfig {
    let mut config = ClientConfig::default();
    config.tracking.placeholder_fallback = false;
    config
}

pub fn goal_config(goal: FitnessGoal) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.tracking.default_goal = goal;
    config
}
