use serde::Serialize;

use super::model::Award;
use super::services::{PersistWarning, UserCheck};

#[derive(Debug, Serialize)]
pub struct TrophyResponse {
    #[serde(flatten)]
    pub award: Award,
    pub title: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

impl From<Award> for TrophyResponse {
    fn from(award: Award) -> Self {
        let tier = award.tier;
        Self {
            award,
            title: tier.title(),
            icon: tier.icon(),
            description: tier.description(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct CheckTrophiesResponse {
    pub new_trophies: Vec<TrophyResponse>,
    pub warnings: Vec<PersistWarning>,
    pub targets_configured: bool,
    pub targets_expired: bool,
}

impl From<UserCheck> for CheckTrophiesResponse {
    fn from(c: UserCheck) -> Self {
        Self {
            new_trophies: c.evaluation.awards.into_iter().map(Into::into).collect(),
            warnings: c.evaluation.warnings,
            targets_configured: c.targets_configured,
            targets_expired: c.targets_expired,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::NutrientTotals;
    use crate::trophies::model::AchievementTier;
    use crate::trophies::services::Evaluation;
    use serde_json::json;
    use time::macros::{date, datetime};
    use uuid::Uuid;

    fn award() -> Award {
        Award {
            id: Uuid::nil(),
            tier: AchievementTier::ThreeDayStreak,
            earned_at: datetime!(2025-03-10 20:00 UTC),
            streak_length: 3,
            window_start: date!(2025-03-08),
            snapshot: NutrientTotals {
                calories: 2000.0,
                protein: 140.0,
                fat: 65.0,
                carbohydrate: 240.0,
            },
        }
    }

    #[test]
    fn trophy_serializes_flat_with_display_fields() {
        let v = serde_json::to_value(TrophyResponse::from(award())).unwrap();
        assert_eq!(
            v,
            json!({
                "id": "00000000-0000-0000-0000-000000000000",
                "tier": "three_day_streak",
                "earned_at": "2025-03-10T20:00:00Z",
                "streak_length": 3,
                "window_start": "2025-03-08",
                "snapshot": {
                    "calories": 2000.0,
                    "protein": 140.0,
                    "fat": 65.0,
                    "carbohydrate": 240.0
                },
                "title": "3-Day Champion",
                "icon": "🥈",
                "description": "Maintained nutrition goals for 3 consecutive days"
            })
        );
    }

    #[test]
    fn check_response_carries_warnings_and_flags() {
        let a = award();
        let check = UserCheck {
            evaluation: Evaluation {
                warnings: vec![PersistWarning {
                    award_id: a.id,
                    tier: a.tier,
                    message: "ledger unavailable".into(),
                }],
                awards: vec![a],
            },
            targets_configured: true,
            targets_expired: true,
        };
        let v = serde_json::to_value(CheckTrophiesResponse::from(check)).unwrap();
        assert_eq!(v["new_trophies"].as_array().unwrap().len(), 1);
        assert_eq!(v["warnings"][0]["tier"], "three_day_streak");
        assert_eq!(v["warnings"][0]["message"], "ledger unavailable");
        assert_eq!(v["targets_configured"], true);
        assert_eq!(v["targets_expired"], true);
    }

    #[test]
    fn count_response_shape() {
        let v = serde_json::to_value(CountResponse { count: 4 }).unwrap();
        assert_eq!(v, json!({ "count": 4 }));
    }
}
