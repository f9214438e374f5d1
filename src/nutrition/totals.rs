use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One logged meal, already reduced to its macro totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MealRecord {
    pub timestamp: OffsetDateTime,
    pub calories: f64,     // kcal
    pub protein: f64,      // g
    pub fat: f64,          // g
    pub carbohydrate: f64, // g
}

/// Summed (or averaged) macros for a day or a streak.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    pub carbohydrate: f64,
}

impl NutrientTotals {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Sums every meal. Values are taken as-is, no validation.
    pub fn aggregate(meals: &[MealRecord]) -> Self {
        meals.iter().fold(Self::zero(), |acc, m| Self {
            calories: acc.calories + m.calories,
            protein: acc.protein + m.protein,
            fat: acc.fat + m.fat,
            carbohydrate: acc.carbohydrate + m.carbohydrate,
        })
    }

    /// Per-nutrient arithmetic mean. Empty input yields zeros.
    pub fn mean<'a, I>(days: I) -> Self
    where
        I: IntoIterator<Item = &'a NutrientTotals>,
    {
        let (sum, count) = days.into_iter().fold((Self::zero(), 0usize), |(acc, n), d| {
            (
                Self {
                    calories: acc.calories + d.calories,
                    protein: acc.protein + d.protein,
                    fat: acc.fat + d.fat,
                    carbohydrate: acc.carbohydrate + d.carbohydrate,
                },
                n + 1,
            )
        });
        if count == 0 {
            return Self::zero();
        }
        let n = count as f64;
        Self {
            calories: sum.calories / n,
            protein: sum.protein / n,
            fat: sum.fat / n,
            carbohydrate: sum.carbohydrate / n,
        }
    }
}
