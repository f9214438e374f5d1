use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::nutrition::NutrientTotals;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Achievement kinds, in the order they are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementTier {
    SingleDay,
    ThreeDayStreak,
    SevenDayStreak,
}

impl AchievementTier {
    pub const ALL: [AchievementTier; 3] = [
        AchievementTier::SingleDay,
        AchievementTier::ThreeDayStreak,
        AchievementTier::SevenDayStreak,
    ];

    pub fn required_days(self) -> u32 {
        match self {
            AchievementTier::SingleDay => 1,
            AchievementTier::ThreeDayStreak => 3,
            AchievementTier::SevenDayStreak => 7,
        }
    }

    /// How far back from the streak start an earlier award still counts as "this one".
    pub fn dedup_window_days(self) -> u32 {
        self.required_days()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AchievementTier::SingleDay => "single_day",
            AchievementTier::ThreeDayStreak => "three_day_streak",
            AchievementTier::SevenDayStreak => "seven_day_streak",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AchievementTier::SingleDay => "Daily Goal",
            AchievementTier::ThreeDayStreak => "3-Day Champion",
            AchievementTier::SevenDayStreak => "Week Warrior",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            AchievementTier::SingleDay => "🏅",
            AchievementTier::ThreeDayStreak => "🥈",
            AchievementTier::SevenDayStreak => "🏆",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AchievementTier::SingleDay => "Met all nutrition targets for the day",
            AchievementTier::ThreeDayStreak => "Maintained nutrition goals for 3 consecutive days",
            AchievementTier::SevenDayStreak => "Stayed on track for 7 consecutive days",
        }
    }
}

impl fmt::Display for AchievementTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AchievementTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single_day" => Ok(AchievementTier::SingleDay),
            "three_day_streak" => Ok(AchievementTier::ThreeDayStreak),
            "seven_day_streak" => Ok(AchievementTier::SevenDayStreak),
            other => anyhow::bail!("unknown trophy tier {other:?}"),
        }
    }
}

/// Totals for one calendar day that had at least one meal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyTotals {
    pub date: Date,
    pub totals: NutrientTotals,
}

/// An issued trophy. Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub id: Uuid,
    pub tier: AchievementTier,
    #[serde(with = "time::serde::rfc3339")]
    pub earned_at: OffsetDateTime,
    pub streak_length: u32,
    #[serde(with = "iso_date")]
    pub window_start: Date, // oldest day of the streak; dedup anchor
    pub snapshot: NutrientTotals,
}
