use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::PgPool;
use time::{Date, OffsetDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::calendar::Calendar;
use super::error::{LedgerError, TrophyError};
use super::evaluator::evaluate;
use super::ledger::{AwardLedger, PgAwardLedger};
use super::model::{AchievementTier, Award};
use super::window::{build_window, MealSource, LOOKBACK_DAYS};
use crate::nutrition::repo::{find_targets_for_user, list_meals_between};
use crate::nutrition::{MealRecord, NutritionTargets};
use crate::state::AppState;

/// An award that was issued but could not be written.
#[derive(Debug, Clone, Serialize)]
pub struct PersistWarning {
    pub award_id: Uuid,
    pub tier: AchievementTier,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Evaluation {
    pub awards: Vec<Award>,
    pub warnings: Vec<PersistWarning>,
}

/// Builds today's window, evaluates it and records what was earned.
pub async fn check_for_new_trophies<M, L>(
    meals: &M,
    ledger: &L,
    calendar: &dyn Calendar,
    targets: Option<&NutritionTargets>,
    now: OffsetDateTime,
) -> Result<Evaluation, TrophyError>
where
    M: MealSource + ?Sized,
    L: AwardLedger + ?Sized,
{
    if targets.is_none() {
        return Ok(Evaluation::default());
    }

    let anchor_day = calendar.day_of(now);
    let window = build_window(anchor_day, LOOKBACK_DAYS, calendar, meals).await?;
    let candidates = evaluate(anchor_day, targets, &window, now, calendar, ledger).await?;

    let mut out = Evaluation::default();
    for award in candidates {
        match ledger.persist(&award).await {
            Ok(()) => {
                info!(tier = %award.tier, award_id = %award.id, window_start = %award.window_start, "trophy earned");
                out.awards.push(award);
            }
            Err(LedgerError::Duplicate { tier, window_start }) => {
                info!(%tier, %window_start, "trophy already recorded by a concurrent check");
            }
            Err(e) => {
                warn!(tier = %award.tier, award_id = %award.id, error = %e, "failed to persist trophy");
                out.warnings.push(PersistWarning {
                    award_id: award.id,
                    tier: award.tier,
                    message: e.to_string(),
                });
                out.awards.push(award);
            }
        }
    }
    Ok(out)
}

/// Outcome of a check for one user, with the state of their targets.
#[derive(Debug)]
pub struct UserCheck {
    pub evaluation: Evaluation,
    pub targets_configured: bool,
    pub targets_expired: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error(transparent)]
    Targets(#[from] anyhow::Error),
    #[error(transparent)]
    Trophy(#[from] TrophyError),
}

/// Entry point for both triggers: after a meal is saved and at session start.
#[instrument(skip(state))]
pub async fn check_for_user(
    state: &AppState,
    user_id: Uuid,
    now: OffsetDateTime,
) -> Result<UserCheck, CheckError> {
    let _guard = state.locks.acquire(user_id).await;

    let targets = find_targets_for_user(&state.db, user_id).await?;
    let meals = PgMealSource::new(state.db.clone(), user_id, state.calendar.clone());
    let ledger = PgAwardLedger::new(state.db.clone(), user_id);

    Ok(check_with_targets(
        &meals,
        &ledger,
        state.calendar.as_ref(),
        targets,
        state.config.trophies.targets_validity_days,
        now,
    )
    .await?)
}

/// Runs the check with the user's stored targets. Expired targets count as absent.
pub async fn check_with_targets<M, L>(
    meals: &M,
    ledger: &L,
    calendar: &dyn Calendar,
    targets: Option<NutritionTargets>,
    validity_days: i64,
    now: OffsetDateTime,
) -> Result<UserCheck, TrophyError>
where
    M: MealSource + ?Sized,
    L: AwardLedger + ?Sized,
{
    let targets_configured = targets.is_some();
    let active = targets.filter(|t| t.is_valid_at(now, validity_days));
    let targets_expired = targets_configured && active.is_none();
    if targets_expired {
        info!(validity_days, "nutrition targets expired, skipping trophy check");
    }

    let evaluation = check_for_new_trophies(meals, ledger, calendar, active.as_ref(), now).await?;

    Ok(UserCheck {
        evaluation,
        targets_configured,
        targets_expired,
    })
}

/// Reads one user's meals from the meals tables.
pub struct PgMealSource {
    db: PgPool,
    user_id: Uuid,
    calendar: Arc<dyn Calendar>,
}

impl PgMealSource {
    pub fn new(db: PgPool, user_id: Uuid, calendar: Arc<dyn Calendar>) -> Self {
        Self { db, user_id, calendar }
    }
}

#[async_trait]
impl MealSource for PgMealSource {
    async fn meals_for_day(&self, day: Date) -> anyhow::Result<Vec<MealRecord>> {
        let (from, until) = self.calendar.day_bounds(day);
        list_meals_between(&self.db, self.user_id, from, until).await
    }
}
