//! Daily and streak trophies for meeting nutrition targets.

pub mod calendar;
mod dto;
pub mod error;
pub mod evaluator;
pub mod handlers;
pub mod ledger;
pub mod locks;
pub mod memory;
pub mod model;
pub mod services;
pub mod window;

use crate::state::AppState;
use axum::Router;

pub use calendar::{Calendar, FixedOffsetCalendar};
pub use error::{LedgerError, TrophyError};
pub use ledger::{AwardLedger, PgAwardLedger};
pub use model::{AchievementTier, Award, DailyTotals};
pub use services::{check_for_new_trophies, check_for_user, Evaluation, PersistWarning};
pub use window::{build_window, MealSource, LOOKBACK_DAYS};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::trophy_routes())
}
