//! Current plan cache
//!
//! One cache per session. Every load is stamped with a [`Ticket`] when it is
//! issued; a response is applied only when no newer ticket has been applied
//! to the same slot, so a slow response for an older request can never
//! overwrite the result of a newer one.

use fittrack_shared::{DailyMealPlan, DailyPlan, DayOfWeek};
use serde::Serialize;

/// Where cached data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Returned by the backend
    Authoritative,
    /// Computed on the client from authoritative data
    Local,
    /// Generated locally because the backend could not be read
    Placeholder,
}

/// Data tagged with its provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fetched<T> {
    pub data: T,
    pub provenance: Provenance,
}

impl<T> Fetched<T> {
    pub fn authoritative(data: T) -> Self {
        Self {
            data,
            provenance: Provenance::Authoritative,
        }
    }

    pub fn local(data: T) -> Self {
        Self {
            data,
            provenance: Provenance::Local,
        }
    }

    pub fn placeholder(data: T) -> Self {
        Self {
            data,
            provenance: Provenance::Placeholder,
        }
    }

    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.provenance == Provenance::Placeholder
    }

    #[inline]
    pub fn is_authoritative(&self) -> bool {
        self.provenance == Provenance::Authoritative
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            data: f(self.data),
            provenance: self.provenance,
        }
    }
}

/// Sequence number of a cache request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Week of workout plans held by the cache
#[derive(Debug, Clone, PartialEq)]
pub struct CachedWeek {
    pub week_number: u32,
    pub plans: Fetched<Vec<DailyPlan>>,
}

impl CachedWeek {
    pub fn day(&self, day: DayOfWeek) -> Option<&DailyPlan> {
        self.plans.data.iter().find(|p| p.day == day)
    }
}

#[derive(Debug, Default)]
pub struct PlanCache {
    issued: u64,
    week_applied: u64,
    meals_applied: u64,
    week: Option<CachedWeek>,
    selected_day: Option<DayOfWeek>,
    meals: Option<Fetched<Vec<DailyMealPlan>>>,
}

impl PlanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp a new request
    pub fn begin(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    // ------------------------------------------------------------------
    // Workout week
    // ------------------------------------------------------------------

    /// Replace the cached week; returns false if the response is stale
    pub fn apply_week(&mut self, ticket: Ticket, week_number: u32, plans: Fetched<Vec<DailyPlan>>) -> bool {
        if ticket.0 <= self.week_applied {
            return false;
        }
        self.week_applied = ticket.0;
        self.week = Some(CachedWeek { week_number, plans });
        true
    }

    /// Replace one day of the cached week with a plan returned by a write
    ///
    /// The plan replaces the cached day wholesale. Returns false if the
    /// response is stale or no authoritative week is cached.
    pub fn replace_day(&mut self, ticket: Ticket, plan: DailyPlan) -> bool {
        if ticket.0 <= self.week_applied {
            return false;
        }
        let Some(week) = self.week.as_mut().filter(|w| w.plans.is_authoritative()) else {
            return false;
        };
        self.week_applied = ticket.0;
        match week.plans.data.iter_mut().find(|p| p.day == plan.day) {
            Some(slot) => *slot = plan,
            None => week.plans.data.push(plan),
        }
        true
    }

    pub fn week(&self) -> Option<&CachedWeek> {
        self.week.as_ref()
    }

    /// Cached week if it is the requested one
    pub fn week_for(&self, week_number: u32) -> Option<&CachedWeek> {
        self.week.as_ref().filter(|w| w.week_number == week_number)
    }

    pub fn day(&self, day: DayOfWeek) -> Option<&DailyPlan> {
        self.week.as_ref().and_then(|w| w.day(day))
    }

    pub fn select_day(&mut self, day: DayOfWeek) {
        self.selected_day = Some(day);
    }

    pub fn selected_day(&self) -> Option<DayOfWeek> {
        self.selected_day
    }

    pub fn selected_plan(&self) -> Option<&DailyPlan> {
        self.selected_day.and_then(|day| self.day(day))
    }

    // ------------------------------------------------------------------
    // Meal week
    // ------------------------------------------------------------------

    pub fn apply_meals(&mut self, ticket: Ticket, meals: Fetched<Vec<DailyMealPlan>>) -> bool {
        if ticket.0 <= self.meals_applied {
            return false;
        }
        self.meals_applied = ticket.0;
        self.meals = Some(meals);
        true
    }

    /// Store one meal day, replacing the cached day wholesale
    ///
    /// A placeholder day never lands in an authoritative meal week.
    pub fn apply_meal_day(&mut self, ticket: Ticket, day: Fetched<DailyMealPlan>) -> bool {
        if ticket.0 <= self.meals_applied {
            return false;
        }
        let applied = match self.meals.as_mut() {
            Some(meals) if meals.provenance == day.provenance => {
                match meals.data.iter_mut().find(|m| m.day == day.data.day) {
                    Some(slot) => *slot = day.data,
                    None => meals.data.push(day.data),
                }
                true
            }
            Some(_) if day.is_placeholder() => false,
            _ => {
                self.meals = Some(day.map(|d| vec![d]));
                true
            }
        };
        if applied {
            self.meals_applied = ticket.0;
        }
        applied
    }

    pub fn meals(&self) -> Option<&Fetched<Vec<DailyMealPlan>>> {
        self.meals.as_ref()
    }

    pub fn meal_day(&self, day: DayOfWeek) -> Option<&DailyMealPlan> {
        self.meals
            .as_ref()
            .and_then(|m| m.data.iter().find(|p| p.day == day))
    }

    /// Drop everything; outstanding tickets become stale
    pub fn clear(&mut self) {
        self.week_applied = self.issued;
        self.meals_applied = self.issued;
        self.week = None;
        self.selected_day = None;
        self.meals = None;
    }
}
