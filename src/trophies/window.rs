use async_trait::async_trait;
use time::Date;
use tracing::debug;

use super::calendar::Calendar;
use super::error::TrophyError;
use super::model::DailyTotals;
use crate::nutrition::{MealRecord, NutrientTotals};

/// Longest tier; the host always builds windows this deep.
pub const LOOKBACK_DAYS: u32 = 7;

/// Where the streak builder reads a day's meals from.
#[async_trait]
pub trait MealSource: Send + Sync {
    async fn meals_for_day(&self, day: Date) -> anyhow::Result<Vec<MealRecord>>;
}

/// Walks back from `anchor_day` one calendar day at a time and stops at the
/// first day without meals. Index 0 is the anchor day.
pub async fn build_window<M>(
    anchor_day: Date,
    max_days: u32,
    calendar: &dyn Calendar,
    source: &M,
) -> Result<Vec<DailyTotals>, TrophyError>
where
    M: MealSource + ?Sized,
{
    let mut window = Vec::with_capacity(max_days as usize);
    for offset in 0..max_days {
        let Some(day) = calendar.days_before(anchor_day, offset) else {
            break;
        };

        let meals = source
            .meals_for_day(day)
            .await
            .map_err(|e| TrophyError::MealStore { day, source: e.into() })?;

        if meals.is_empty() {
            debug!(%day, offset, "no meals logged, streak window ends");
            break;
        }

        window.push(DailyTotals {
            date: day,
            totals: NutrientTotals::aggregate(&meals),
        });
    }
    Ok(window)
}
