use thiserror::Error;
use time::Date;

use super::model::AchievementTier;

/// Errors raised by an award ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The `(tier, window_start)` slot is already taken for this user.
    #[error("{tier} award already recorded for streak starting {window_start}")]
    Duplicate {
        tier: AchievementTier,
        window_start: Date,
    },
    #[error("ledger database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("ledger unavailable: {0}")]
    Unavailable(String),
}

/// Errors that abort an evaluation.
#[derive(Debug, Error)]
pub enum TrophyError {
    #[error("failed to read meals for {day}")]
    MealStore {
        day: Date,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
    #[error("award ledger lookup failed")]
    Ledger(#[from] LedgerError),
}
