use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub ingredients: String,
    pub steps: String,
    pub note: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub created_at: OffsetDateTime,
}

const RECIPE_COLUMNS: &str = "id, title, ingredients, steps, note, category, image, created_at";

pub async fn list(db: &PgPool, category: Option<&str>) -> anyhow::Result<Vec<Recipe>> {
    let rows = match category {
        Some(cat) => {
            sqlx::query_as::<_, Recipe>(&format!(
                "SELECT {RECIPE_COLUMNS} FROM recipes WHERE category = $1 ORDER BY id"
            ))
            .bind(cat)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Recipe>(&format!(
                "SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY id"
            ))
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

/// Gym / eat-clean planner view: only the healthy category.
pub async fn list_healthy(db: &PgPool) -> anyhow::Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, Recipe>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE category = 'healthy' ORDER BY id"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Student planner view: everything that is not the healthy category.
pub async fn list_everyday(db: &PgPool) -> anyhow::Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, Recipe>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE category IS DISTINCT FROM 'healthy' ORDER BY id"
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, id: i64) -> anyhow::Result<Option<Recipe>> {
    let row = sqlx::query_as::<_, Recipe>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn insert(
    db: &PgPool,
    title: &str,
    ingredients: &str,
    steps: &str,
    note: Option<&str>,
    category: Option<&str>,
    image: Option<&str>,
) -> anyhow::Result<Recipe> {
    let row = sqlx::query_as::<_, Recipe>(&format!(
        r#"
        INSERT INTO recipes (title, ingredients, steps, note, category, image)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {RECIPE_COLUMNS}
        "#
    ))
    .bind(title)
    .bind(ingredients)
    .bind(steps)
    .bind(note)
    .bind(category)
    .bind(image)
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// `image` is only touched when a new file was uploaded.
pub async fn update(
    db: &PgPool,
    id: i64,
    title: &str,
    ingredients: &str,
    steps: &str,
    note: Option<&str>,
    category: Option<&str>,
    image: Option<&str>,
) -> anyhow::Result<Option<Recipe>> {
    let row = sqlx::query_as::<_, Recipe>(&format!(
        r#"
        UPDATE recipes
        SET title = $2, ingredients = $3, steps = $4, note = $5, category = $6,
            image = COALESCE($7, image)
        WHERE id = $1
        RETURNING {RECIPE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(title)
    .bind(ingredients)
    .bind(steps)
    .bind(note)
    .bind(category)
    .bind(image)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Dependent meal slots keep their row; the FK nulls their recipe link.
pub async fn delete(db: &PgPool, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Flip the favorite mark for (user, recipe); returns the new state.
pub async fn toggle_favorite(db: &PgPool, user_id: i64, recipe_id: i64) -> anyhow::Result<bool> {
    let removed = sqlx::query(
        r#"
        DELETE FROM favorite_recipes WHERE user_id = $1 AND recipe_id = $2
        "#,
    )
    .bind(user_id)
    .bind(recipe_id)
    .execute(db)
    .await?
    .rows_affected();

    if removed > 0 {
        return Ok(false);
    }

    sqlx::query(
        r#"
        INSERT INTO favorite_recipes (user_id, recipe_id) VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(recipe_id)
    .execute(db)
    .await?;
    Ok(true)
}
