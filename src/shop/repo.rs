use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use super::services::LineSnapshot;

#[derive(Debug, Clone, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub unit: Option<String>,
    pub badge: Option<String>,
    pub image: Option<String>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct Order {
    pub id: i64,
    pub customer_name: String,
    pub note: Option<String>,
    pub total_price: i64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
}

// ---- Products ----

pub async fn list_products(db: &PgPool) -> anyhow::Result<Vec<Product>> {
    let rows = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, price, unit, badge, image, created_at
        FROM products
        ORDER BY id DESC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get_product(db: &PgPool, id: i64) -> anyhow::Result<Option<Product>> {
    let row = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, price, unit, badge, image, created_at
        FROM products
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn insert_product(
    db: &PgPool,
    name: &str,
    price: i64,
    unit: Option<&str>,
    badge: Option<&str>,
    image: Option<&str>,
) -> anyhow::Result<Product> {
    let row = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (name, price, unit, badge, image)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, price, unit, badge, image, created_at
        "#,
    )
    .bind(name)
    .bind(price)
    .bind(unit)
    .bind(badge)
    .bind(image)
    .fetch_one(db)
    .await?;
    Ok(row)
}

/// `image` is only touched when a new file was uploaded.
pub async fn update_product(
    db: &PgPool,
    id: i64,
    name: &str,
    price: i64,
    unit: Option<&str>,
    badge: Option<&str>,
    image: Option<&str>,
) -> anyhow::Result<Option<Product>> {
    let row = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET name = $2, price = $3, unit = $4, badge = $5,
            image = COALESCE($6, image)
        WHERE id = $1
        RETURNING id, name, price, unit, badge, image, created_at
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(price)
    .bind(unit)
    .bind(badge)
    .bind(image)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn delete_product(db: &PgPool, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM products WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Batch lookup for order validation.
pub async fn products_by_ids(db: &PgPool, ids: &[i64]) -> anyhow::Result<Vec<Product>> {
    let rows = sqlx::query_as::<_, Product>(
        r#"
        SELECT id, name, price, unit, badge, image, created_at
        FROM products
        WHERE id = ANY($1)
        "#,
    )
    .bind(ids)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

// ---- Orders ----

/// Order row plus its line snapshots in one transaction. A failure anywhere
/// rolls the whole order back; there is never an order without its items.
pub async fn create_order(
    db: &PgPool,
    customer_name: &str,
    note: &str,
    total_price: i64,
    lines: &[LineSnapshot],
) -> Result<i64, sqlx::Error> {
    let mut tx = db.begin().await?;

    let (order_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO orders (customer_name, note, total_price)
        VALUES ($1, $2, $3)
        RETURNING id
        "#,
    )
    .bind(customer_name)
    .bind(note)
    .bind(total_price)
    .fetch_one(&mut *tx)
    .await?;

    for line in lines {
        sqlx::query(
            r#"
            INSERT INTO order_items (order_id, product_id, product_name, unit_price, quantity)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(&line.product_name)
        .bind(line.unit_price)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(order_id)
}

pub async fn list_orders(db: &PgPool) -> anyhow::Result<Vec<Order>> {
    let rows = sqlx::query_as::<_, Order>(
        r#"
        SELECT id, customer_name, note, total_price, created_at
        FROM orders
        ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_items_for_orders(db: &PgPool, order_ids: &[i64]) -> anyhow::Result<Vec<OrderItem>> {
    let rows = sqlx::query_as::<_, OrderItem>(
        r#"
        SELECT id, order_id, product_id, product_name, unit_price, quantity
        FROM order_items
        WHERE order_id = ANY($1)
        ORDER BY id
        "#,
    )
    .bind(order_ids)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Items go with the order (FK cascade).
pub async fn delete_order(db: &PgPool, id: i64) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM orders WHERE id = $1
        "#,
    )
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
