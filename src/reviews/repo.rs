use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: i64,
    pub recipe_id: i64,
    pub author: Option<String>,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: OffsetDateTime,
}

pub async fn list_by_recipe(db: &PgPool, recipe_id: i64) -> anyhow::Result<Vec<Review>> {
    let rows = sqlx::query_as::<_, Review>(
        r#"
        SELECT id, recipe_id, author, rating, comment, created_at
        FROM reviews
        WHERE recipe_id = $1
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn insert(
    db: &PgPool,
    recipe_id: i64,
    author: Option<&str>,
    rating: i32,
    comment: Option<&str>,
) -> anyhow::Result<Review> {
    let row = sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (recipe_id, author, rating, comment)
        VALUES ($1, $2, $3, $4)
        RETURNING id, recipe_id, author, rating, comment, created_at
        "#,
    )
    .bind(recipe_id)
    .bind(author)
    .bind(rating)
    .bind(comment)
    .fetch_one(db)
    .await?;
    Ok(row)
}

pub async fn recipe_title(db: &PgPool, recipe_id: i64) -> anyhow::Result<Option<String>> {
    let row: Option<(String,)> = sqlx::query_as(
        r#"
        SELECT title FROM recipes WHERE id = $1
        "#,
    )
    .bind(recipe_id)
    .fetch_optional(db)
    .await?;
    Ok(row.map(|(title,)| title))
}
