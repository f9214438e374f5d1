use time::{Date, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use super::calendar::Calendar;
use super::error::TrophyError;
use super::ledger::AwardLedger;
use super::model::{AchievementTier, Award, DailyTotals};
use crate::nutrition::{all_in_range, NutrientTotals, NutritionTargets};

/// Was `tier` already awarded for a streak starting at `window_start`?
///
/// Looks for an award earned in `[start_of_day(window_start - dedup_window_days), now]`.
pub async fn has_existing_award<L>(
    ledger: &L,
    calendar: &dyn Calendar,
    tier: AchievementTier,
    window_start: Date,
    now: OffsetDateTime,
) -> Result<bool, TrophyError>
where
    L: AwardLedger + ?Sized,
{
    let lookback_day = calendar
        .days_before(window_start, tier.dedup_window_days())
        .unwrap_or(Date::MIN);
    let from = calendar.start_of_day(lookback_day);
    Ok(ledger.has_award_between(tier, from, now).await?)
}

/// Decides which tiers are newly earned for `anchor_day`.
///
/// `window` is the contiguous streak ending at `anchor_day`, most recent first.
/// Nothing is persisted here.
pub async fn evaluate<L>(
    anchor_day: Date,
    targets: Option<&NutritionTargets>,
    window: &[DailyTotals],
    now: OffsetDateTime,
    calendar: &dyn Calendar,
    ledger: &L,
) -> Result<Vec<Award>, TrophyError>
where
    L: AwardLedger + ?Sized,
{
    let Some(targets) = targets else {
        return Ok(Vec::new());
    };

    let mut awards = Vec::new();
    for tier in AchievementTier::ALL {
        let required = tier.required_days();
        if window.len() < required as usize {
            debug!(%tier, have = window.len(), required, "not enough history");
            continue;
        }
        let slice = &window[..required as usize];

        if !slice.iter().all(|day| all_in_range(&day.totals, targets)) {
            debug!(%tier, "streak has a day outside target ranges");
            continue;
        }

        let window_start = calendar
            .days_before(anchor_day, required - 1)
            .unwrap_or(slice[slice.len() - 1].date);

        if has_existing_award(ledger, calendar, tier, window_start, now).await? {
            debug!(%tier, %window_start, "already awarded");
            continue;
        }

        let snapshot = match tier {
            AchievementTier::SingleDay => slice[0].totals,
            _ => NutrientTotals::mean(slice.iter().map(|d| &d.totals)),
        };

        awards.push(Award {
            id: Uuid::new_v4(),
            tier,
            earned_at: now,
            streak_length: required,
            window_start,
            snapshot,
        });
    }
    Ok(awards)
}
