use sqlx::{FromRow, PgPool};
use std::collections::HashSet;
use time::{Date, OffsetDateTime};

use super::services::MealType;

/// One cell of the weekly grid as stored. At most one row exists per
/// (user_id, date, meal_type); the unique constraint backs the upsert.
#[derive(Debug, Clone, FromRow)]
pub struct MealSlot {
    pub id: i64,
    pub user_id: i64,
    pub date: Date,
    pub meal_type: String,
    pub recipe_id: Option<i64>,
    pub note: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// Recipe catalog entry as the planner needs it (dropdown data).
#[derive(Debug, Clone, FromRow)]
pub struct CatalogRecipe {
    pub id: i64,
    pub title: String,
    pub category: Option<String>,
}

pub async fn list_slots_in_range(
    db: &PgPool,
    user_id: i64,
    from: Date,
    to: Date,
) -> anyhow::Result<Vec<MealSlot>> {
    let rows = sqlx::query_as::<_, MealSlot>(
        r#"
        SELECT id, user_id, date, meal_type, recipe_id, note, created_at, updated_at
        FROM meal_slots
        WHERE user_id = $1 AND date >= $2 AND date <= $3
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Insert the slot or, when the (user, date, meal_type) cell already exists,
/// overwrite recipe and note in place. Id and created_at survive overwrites.
pub async fn upsert_slot(
    db: &PgPool,
    user_id: i64,
    date: Date,
    meal_type: MealType,
    recipe_id: Option<i64>,
    note: &str,
) -> anyhow::Result<MealSlot> {
    let slot = sqlx::query_as::<_, MealSlot>(
        r#"
        INSERT INTO meal_slots (user_id, date, meal_type, recipe_id, note)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT ON CONSTRAINT meal_slots_cell_key
        DO UPDATE SET recipe_id = EXCLUDED.recipe_id, note = EXCLUDED.note, updated_at = now()
        RETURNING id, user_id, date, meal_type, recipe_id, note, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(date)
    .bind(meal_type.as_str())
    .bind(recipe_id)
    .bind(note)
    .fetch_one(db)
    .await?;
    Ok(slot)
}

pub async fn recipe_exists(db: &PgPool, recipe_id: i64) -> anyhow::Result<bool> {
    let row: Option<(i64,)> = sqlx::query_as(
        r#"
        SELECT id FROM recipes WHERE id = $1
        "#,
    )
    .bind(recipe_id)
    .fetch_optional(db)
    .await?;
    Ok(row.is_some())
}

/// Full catalog for the planner dropdown.
pub async fn recipe_catalog(db: &PgPool) -> anyhow::Result<Vec<CatalogRecipe>> {
    let rows = sqlx::query_as::<_, CatalogRecipe>(
        r#"
        SELECT id, title, category FROM recipes ORDER BY id
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn favorite_recipe_ids(db: &PgPool, user_id: i64) -> anyhow::Result<HashSet<i64>> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        r#"
        SELECT recipe_id FROM favorite_recipes WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}
