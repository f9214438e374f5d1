use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use tracing::warn;
use uuid::Uuid;

use super::error::LedgerError;
use super::model::{AchievementTier, Award};
use crate::nutrition::NutrientTotals;

/// Append-only record of issued trophies for one user.
#[async_trait]
pub trait AwardLedger: Send + Sync {
    /// Is there an award of `tier` with `from <= earned_at <= until`?
    async fn has_award_between(
        &self,
        tier: AchievementTier,
        from: OffsetDateTime,
        until: OffsetDateTime,
    ) -> Result<bool, LedgerError>;

    async fn persist(&self, award: &Award) -> Result<(), LedgerError>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<Award>, LedgerError>;

    async fn count(&self) -> Result<i64, LedgerError>;
}

/// Row of `trophies`.
#[derive(Debug, FromRow)]
pub struct TrophyRow {
    pub id: Uuid,
    pub tier: String,
    pub earned_at: OffsetDateTime,
    pub streak_days: i32,
    pub window_start: Date,
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrate: f64,
}

impl TryFrom<TrophyRow> for Award {
    type Error = anyhow::Error;

    fn try_from(r: TrophyRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            tier: r.tier.parse()?,
            earned_at: r.earned_at,
            streak_length: u32::try_from(r.streak_days)?,
            window_start: r.window_start,
            snapshot: NutrientTotals {
                calories: r.calories,
                protein: r.protein,
                fat: r.fat,
                carbohydrate: r.carbohydrate,
            },
        })
    }
}

/// Postgres ledger scoped to a single user.
#[derive(Clone)]
pub struct PgAwardLedger {
    db: PgPool,
    user_id: Uuid,
}

impl PgAwardLedger {
    pub fn new(db: PgPool, user_id: Uuid) -> Self {
        Self { db, user_id }
    }
}

#[async_trait]
impl AwardLedger for PgAwardLedger {
    async fn has_award_between(
        &self,
        tier: AchievementTier,
        from: OffsetDateTime,
        until: OffsetDateTime,
    ) -> Result<bool, LedgerError> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1
                  FROM trophies
                 WHERE user_id = $1
                   AND tier = $2
                   AND earned_at >= $3
                   AND earned_at <= $4
            )
            "#,
        )
        .bind(self.user_id)
        .bind(tier.as_str())
        .bind(from)
        .bind(until)
        .fetch_one(&self.db)
        .await?;
        Ok(exists)
    }

    async fn persist(&self, award: &Award) -> Result<(), LedgerError> {
        let res = sqlx::query(
            r#"
            INSERT INTO trophies (id, user_id, tier, earned_at, streak_days, window_start,
                                  calories, protein, fat, carbohydrate)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(award.id)
        .bind(self.user_id)
        .bind(award.tier.as_str())
        .bind(award.earned_at)
        .bind(award.streak_length as i32)
        .bind(award.window_start)
        .bind(award.snapshot.calories)
        .bind(award.snapshot.protein)
        .bind(award.snapshot.fat)
        .bind(award.snapshot.carbohydrate)
        .execute(&self.db)
        .await;

        match res {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(LedgerError::Duplicate {
                    tier: award.tier,
                    window_start: award.window_start,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<Award>, LedgerError> {
        let rows = sqlx::query_as::<_, TrophyRow>(
            r#"
            SELECT id, tier, earned_at, streak_days, window_start,
                   calories, protein, fat, carbohydrate
              FROM trophies
             WHERE user_id = $1
             ORDER BY earned_at DESC
            "#,
        )
        .bind(self.user_id)
        .fetch_all(&self.db)
        .await?;

        // skip rows we cannot decode instead of hiding every trophy
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id;
                match Award::try_from(row) {
                    Ok(award) => Some(award),
                    Err(e) => {
                        warn!(error = %e, trophy_id = %id, "skipping undecodable trophy row");
                        None
                    }
                }
            })
            .collect())
    }

    async fn count(&self) -> Result<i64, LedgerError> {
        let n: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM trophies WHERE user_id = $1"#)
            .bind(self.user_id)
            .fetch_one(&self.db)
            .await?;
        Ok(n)
    }
}
