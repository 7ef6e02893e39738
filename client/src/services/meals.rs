//! Meal plan service

use super::demo::{placeholder_meal_day, placeholder_meal_week};
use super::{escalate, read_fallback};
use crate::cache::Fetched;
use crate::error::{ClientError, ClientResult};
use crate::session::Session;
use crate::state::ClientState;
use chrono::{DateTime, Utc};
use fittrack_shared::validation::validate_item_id;
use fittrack_shared::{
    daily_nutrition_progress, meal_plan_nutrition_progress, week_number_at, ConsumeMealRequest,
    DailyMealPlan, DayOfWeek, FitnessGoal, GenerateMealsRequest, Normalize, NutritionProgress,
    PlanError,
};
use tracing::{debug, info};

/// Meal service for business logic
pub struct MealService;

impl MealService {
    /// Load the meal plan week
    pub async fn load_meals(
        state: &ClientState,
        session: &mut Session,
        now: DateTime<Utc>,
    ) -> ClientResult<Fetched<Vec<DailyMealPlan>>> {
        let ticket = session.cache.begin();
        let fetched = match Self::fetch_meals(state, session).await {
            Ok(meals) => Fetched::authoritative(meals.normalize()),
            Err(err) => {
                let week = week_number_at(now);
                read_fallback(state, session, err, "load_meals", || placeholder_meal_week(week)).await?
            }
        };
        if !session.cache.apply_meals(ticket, fetched.clone()) {
            debug!("Discarding stale meal week response");
        }
        Ok(fetched)
    }

    async fn fetch_meals(state: &ClientState, session: &Session) -> ClientResult<Vec<DailyMealPlan>> {
        state.backend().meal_week(session.bearer()?).await
    }

    /// Load one day of the meal plan
    pub async fn load_day(
        state: &ClientState,
        session: &mut Session,
        day: DayOfWeek,
        now: DateTime<Utc>,
    ) -> ClientResult<Fetched<DailyMealPlan>> {
        let ticket = session.cache.begin();
        let fetched = match Self::fetch_day(state, session, day).await {
            Ok(plan) => Fetched::authoritative(plan.normalize()),
            Err(err) => {
                let week = week_number_at(now);
                read_fallback(state, session, err, "load_meal_day", || placeholder_meal_day(day, week)).await?
            }
        };
        if !session.cache.apply_meal_day(ticket, fetched.clone()) {
            debug!(day = %day, "Meal day response not cached");
        }
        Ok(fetched)
    }

    async fn fetch_day(state: &ClientState, session: &Session, day: DayOfWeek) -> ClientResult<DailyMealPlan> {
        state.backend().meal_day(session.bearer()?, day).await
    }

    /// Generate a new meal plan week
    pub async fn generate(
        state: &ClientState,
        session: &mut Session,
        goal: Option<FitnessGoal>,
        now: DateTime<Utc>,
    ) -> ClientResult<Vec<DailyMealPlan>> {
        let request = GenerateMealsRequest {
            goal: goal.or(session.goal).unwrap_or(state.tracking().default_goal),
            week_number: week_number_at(now),
        };

        let ticket = session.cache.begin();
        let meals = match Self::send_generate(state, session, &request).await {
            Ok(meals) => meals.normalize(),
            Err(err) => return Err(escalate(state, session, err).await),
        };
        session.cache.apply_meals(ticket, Fetched::authoritative(meals.clone()));
        info!(week = request.week_number, goal = request.goal.as_str(), "Meal plan generated");
        Ok(meals)
    }

    async fn send_generate(
        state: &ClientState,
        session: &Session,
        request: &GenerateMealsRequest,
    ) -> ClientResult<Vec<DailyMealPlan>> {
        state.backend().generate_meals(session.bearer()?, request).await
    }

    /// Mark a meal as eaten (or not)
    ///
    /// The backend's day replaces the cached day wholesale.
    pub async fn consume(
        state: &ClientState,
        session: &mut Session,
        day: DayOfWeek,
        meal_id: &str,
        consumed: bool,
    ) -> ClientResult<DailyMealPlan> {
        validate_item_id(meal_id).map_err(ClientError::Validation)?;

        if let Some(meals) = session.cache.meals() {
            if meals.is_placeholder() {
                return Err(ClientError::PlaceholderData(
                    "the meal plan is showing placeholder meals; reload it once the backend is reachable"
                        .to_string(),
                ));
            }
        }
        if let Some(plan) = session.cache.meal_day(day) {
            if !plan.meals.iter().any(|m| m.id == meal_id) {
                return Err(PlanError::UnknownMeal {
                    meal_id: meal_id.to_string(),
                }
                .into());
            }
        }

        let request = ConsumeMealRequest {
            meal_id: meal_id.to_string(),
            consumed,
        };
        let ticket = session.cache.begin();
        let plan = match Self::send_consume(state, session, day, &request).await {
            Ok(plan) => plan.normalize(),
            Err(err) => return Err(escalate(state, session, err).await),
        };
        if plan.day != day {
            return Err(ClientError::Decode(format!(
                "expected the meals for {}, got {}",
                day, plan.day
            )));
        }

        session
            .cache
            .apply_meal_day(ticket, Fetched::authoritative(plan.clone()));
        info!(day = %day, meal_id = %meal_id, consumed, "Meal consumption updated");
        Ok(plan)
    }

    async fn send_consume(
        state: &ClientState,
        session: &Session,
        day: DayOfWeek,
        request: &ConsumeMealRequest,
    ) -> ClientResult<DailyMealPlan> {
        state.backend().consume_meal(session.bearer()?, day, request).await
    }

    /// Nutrition progress of a cached day
    ///
    /// Prefers the meal plan day and falls back to the meals of the cached
    /// workout day.
    pub fn nutrition_progress(session: &Session, day: DayOfWeek) -> ClientResult<Fetched<NutritionProgress>> {
        if let Some(meals) = session.cache.meals() {
            if let Some(plan) = meals.data.iter().find(|p| p.day == day) {
                let progress = meal_plan_nutrition_progress(plan);
                return Ok(Fetched {
                    data: progress,
                    provenance: meals.provenance,
                });
            }
        }
        if let Some(week) = session.cache.week() {
            if let Some(plan) = week.day(day) {
                return Ok(Fetched {
                    data: daily_nutrition_progress(plan),
                    provenance: week.plans.provenance,
                });
            }
        }
        Err(ClientError::NotFound(format!("No meals loaded for {}", day)))
    }
}
