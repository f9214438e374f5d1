use anyhow::Context;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::targets::{NutritionTargetRange, NutritionTargets};
use super::totals::MealRecord;

/// Row of `nutrition_targets`.
#[derive(Debug, FromRow)]
pub struct NutritionTargetsRow {
    pub calories_min: f64,
    pub calories_max: f64,
    pub calories_target: f64,
    pub protein_min: f64,
    pub protein_max: f64,
    pub protein_target: f64,
    pub fat_min: f64,
    pub fat_max: f64,
    pub fat_target: f64,
    pub carb_min: f64,
    pub carb_max: f64,
    pub carb_target: f64,
    pub explanation: String,
    pub generated_at: OffsetDateTime,
}

impl From<NutritionTargetsRow> for NutritionTargets {
    fn from(r: NutritionTargetsRow) -> Self {
        Self {
            calories: NutritionTargetRange::new(r.calories_min, r.calories_max, r.calories_target),
            protein: NutritionTargetRange::new(r.protein_min, r.protein_max, r.protein_target),
            fat: NutritionTargetRange::new(r.fat_min, r.fat_max, r.fat_target),
            carbohydrate: NutritionTargetRange::new(r.carb_min, r.carb_max, r.carb_target),
            explanation: r.explanation,
            generated_at: r.generated_at,
        }
    }
}

/// Meal joined with its nutrition row; a meal not yet analysed has NULL macros.
#[derive(Debug, FromRow)]
pub struct MealNutritionRow {
    pub created_at: OffsetDateTime,
    pub total_calories_kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbs_g: Option<f64>,
}

impl From<MealNutritionRow> for MealRecord {
    fn from(r: MealNutritionRow) -> Self {
        Self {
            timestamp: r.created_at,
            calories: r.total_calories_kcal.unwrap_or(0.0),
            protein: r.protein_g.unwrap_or(0.0),
            fat: r.fat_g.unwrap_or(0.0),
            carbohydrate: r.carbs_g.unwrap_or(0.0),
        }
    }
}

/// Load the user's current targets, if any were generated.
pub async fn find_targets_for_user(
    db: &PgPool,
    user_id: Uuid,
) -> anyhow::Result<Option<NutritionTargets>> {
    let row = sqlx::query_as::<_, NutritionTargetsRow>(
        r#"
        SELECT calories_min, calories_max, calories_target,
               protein_min, protein_max, protein_target,
               fat_min, fat_max, fat_target,
               carb_min, carb_max, carb_target,
               explanation, generated_at
          FROM nutrition_targets
         WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("load nutrition targets")?;

    Ok(row.map(NutritionTargets::from))
}

/// Meals logged by the user in `[from, until)`, newest first.
pub async fn list_meals_between(
    db: &PgPool,
    user_id: Uuid,
    from: OffsetDateTime,
    until: OffsetDateTime,
) -> anyhow::Result<Vec<MealRecord>> {
    let rows = sqlx::query_as::<_, MealNutritionRow>(
        r#"
        SELECT m.created_at,
               n.total_calories_kcal::float8 AS total_calories_kcal,
               n.protein_g::float8           AS protein_g,
               n.fat_g::float8               AS fat_g,
               n.carbs_g::float8             AS carbs_g
          FROM meals m
          LEFT JOIN meal_nutrition n ON n.meal_id = m.id
         WHERE m.user_id = $1
           AND m.created_at >= $2
           AND m.created_at < $3
         ORDER BY m.created_at DESC
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(until)
    .fetch_all(db)
    .await
    .context("list meals between")?;

    Ok(rows.into_iter().map(MealRecord::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn unanalysed_meal_counts_as_zero() {
        let rec = MealRecord::from(MealNutritionRow {
            created_at: datetime!(2025-03-10 12:00 UTC),
            total_calories_kcal: None,
            protein_g: Some(12.5),
            fat_g: None,
            carbs_g: None,
        });
        assert_eq!(rec.calories, 0.0);
        assert_eq!(rec.protein, 12.5);
        assert_eq!(rec.carbohydrate, 0.0);
    }

    #[test]
    fn targets_row_maps_ranges() {
        let targets = NutritionTargets::from(NutritionTargetsRow {
            calories_min: 1800.0,
            calories_max: 2200.0,
            calories_target: 2000.0,
            protein_min: 120.0,
            protein_max: 160.0,
            protein_target: 140.0,
            fat_min: 50.0,
            fat_max: 80.0,
            fat_target: 65.0,
            carb_min: 200.0,
            carb_max: 280.0,
            carb_target: 240.0,
            explanation: "maintenance".into(),
            generated_at: datetime!(2025-03-01 08:00 UTC),
        });
        assert_eq!(targets.carbohydrate, NutritionTargetRange::new(200.0, 280.0, 240.0));
        assert_eq!(targets.explanation, "maintenance");
    }
}
