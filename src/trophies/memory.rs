//! In-process meal store and ledger. Used by tests and by embedders that keep
//! their own persistence.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::{Date, Duration, OffsetDateTime};

use super::calendar::{Calendar, FixedOffsetCalendar};
use super::error::LedgerError;
use super::ledger::AwardLedger;
use super::model::{AchievementTier, Award};
use super::window::MealSource;
use crate::nutrition::MealRecord;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct InMemoryMeals {
    calendar: FixedOffsetCalendar,
    meals: Mutex<Vec<MealRecord>>,
    failing_days: Mutex<HashSet<Date>>,
}

impl InMemoryMeals {
    pub fn new(calendar: FixedOffsetCalendar) -> Self {
        Self {
            calendar,
            meals: Mutex::new(Vec::new()),
            failing_days: Mutex::new(HashSet::new()),
        }
    }

    pub fn add(&self, timestamp: OffsetDateTime, calories: f64, protein: f64, fat: f64, carbohydrate: f64) {
        lock(&self.meals).push(MealRecord {
            timestamp,
            calories,
            protein,
            fat,
            carbohydrate,
        });
    }

    /// Logs a meal at local noon, `days_ago` calendar days before `today`.
    pub fn add_on_day(
        &self,
        today: Date,
        days_ago: u32,
        calories: f64,
        protein: f64,
        fat: f64,
        carbohydrate: f64,
    ) {
        let Some(day) = self.calendar.days_before(today, days_ago) else {
            return;
        };
        let noon = self.calendar.start_of_day(day) + Duration::hours(12);
        self.add(noon, calories, protein, fat, carbohydrate);
    }

    /// Makes every later read of `day` fail.
    pub fn fail_on(&self, day: Date) {
        lock(&self.failing_days).insert(day);
    }
}

#[async_trait]
impl MealSource for InMemoryMeals {
    async fn meals_for_day(&self, day: Date) -> anyhow::Result<Vec<MealRecord>> {
        if lock(&self.failing_days).contains(&day) {
            anyhow::bail!("meal store offline");
        }
        let (start, end) = self.calendar.day_bounds(day);
        Ok(lock(&self.meals)
            .iter()
            .filter(|m| m.timestamp >= start && m.timestamp < end)
            .copied()
            .collect())
    }
}

/// Ledger kept in a vector, unique on `(tier, window_start)` like the table.
#[derive(Default)]
pub struct InMemoryLedger {
    awards: Mutex<Vec<Award>>,
    failing_tiers: Mutex<HashSet<AchievementTier>>,
    lookups_fail: Mutex<bool>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `persist` fail for every award of `tier`.
    pub fn fail_persist_for(&self, tier: AchievementTier) {
        lock(&self.failing_tiers).insert(tier);
    }

    pub fn heal(&self) {
        lock(&self.failing_tiers).clear();
        *lock(&self.lookups_fail) = false;
    }

    pub fn fail_lookups(&self) {
        *lock(&self.lookups_fail) = true;
    }

    pub fn awards(&self) -> Vec<Award> {
        lock(&self.awards).clone()
    }
}

#[async_trait]
impl AwardLedger for InMemoryLedger {
    async fn has_award_between(
        &self,
        tier: AchievementTier,
        from: OffsetDateTime,
        until: OffsetDateTime,
    ) -> Result<bool, LedgerError> {
        if *lock(&self.lookups_fail) {
            return Err(LedgerError::Unavailable("lookups disabled".into()));
        }
        Ok(lock(&self.awards)
            .iter()
            .any(|a| a.tier == tier && a.earned_at >= from && a.earned_at <= until))
    }

    async fn persist(&self, award: &Award) -> Result<(), LedgerError> {
        if lock(&self.failing_tiers).contains(&award.tier) {
            return Err(LedgerError::Unavailable(format!("cannot write {} award", award.tier)));
        }
        let mut awards = lock(&self.awards);
        if awards
            .iter()
            .any(|a| a.tier == award.tier && a.window_start == award.window_start)
        {
            return Err(LedgerError::Duplicate {
                tier: award.tier,
                window_start: award.window_start,
            });
        }
        awards.push(award.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Award>, LedgerError> {
        let mut awards = lock(&self.awards).clone();
        awards.sort_by(|a, b| b.earned_at.cmp(&a.earned_at));
        Ok(awards)
    }

    async fn count(&self) -> Result<i64, LedgerError> {
        Ok(lock(&self.awards).len() as i64)
    }
}
