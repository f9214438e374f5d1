pub mod repo;
pub mod targets;
pub mod totals;

pub use targets::{all_in_range, in_range, NutritionTargetRange, NutritionTargets};
pub use totals::{MealRecord, NutrientTotals};
