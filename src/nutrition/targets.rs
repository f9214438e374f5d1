use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::totals::NutrientTotals;

/// Daily range for a single nutrient. Callers own `min <= target <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionTargetRange {
    pub min: f64,
    pub max: f64,
    pub target: f64,
}

impl NutritionTargetRange {
    pub fn new(min: f64, max: f64, target: f64) -> Self {
        Self { min, max, target }
    }

    /// Inclusive on both ends; `target` plays no part.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Per-user daily targets, generated outside this service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionTargets {
    pub calories: NutritionTargetRange,
    pub protein: NutritionTargetRange,
    pub fat: NutritionTargetRange,
    pub carbohydrate: NutritionTargetRange,
    pub explanation: String,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
}

pub fn in_range(value: f64, range: &NutritionTargetRange) -> bool {
    range.contains(value)
}

pub fn all_in_range(totals: &NutrientTotals, targets: &NutritionTargets) -> bool {
    targets.is_all_in_range(totals)
}

impl NutritionTargets {
    pub fn is_calories_in_range(&self, value: f64) -> bool {
        in_range(value, &self.calories)
    }

    pub fn is_protein_in_range(&self, value: f64) -> bool {
        in_range(value, &self.protein)
    }

    pub fn is_fat_in_range(&self, value: f64) -> bool {
        in_range(value, &self.fat)
    }

    pub fn is_carbohydrate_in_range(&self, value: f64) -> bool {
        in_range(value, &self.carbohydrate)
    }

    pub fn is_all_in_range(&self, totals: &NutrientTotals) -> bool {
        let calories = self.is_calories_in_range(totals.calories);
        let protein = self.is_protein_in_range(totals.protein);
        let fat = self.is_fat_in_range(totals.fat);
        let carbohydrate = self.is_carbohydrate_in_range(totals.carbohydrate);
        calories && protein && fat && carbohydrate
    }

    /// Targets go stale once `validity_days` whole days have passed since generation.
    pub fn is_valid_at(&self, now: OffsetDateTime, validity_days: i64) -> bool {
        (now - self.generated_at).whole_days() < validity_days
    }
}
