use std::collections::HashMap;

use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument};
use uuid::Uuid;

use super::dto::{
    CreateOrderRequest, MessageResponse, OrderCreated, OrderItemOut, OrderOut, ProductOut,
};
use super::repo::{self, Product};
use super::services::{price_cart, DEFAULT_CUSTOMER_NAME, DEFAULT_ORDER_NOTE};
use crate::error::ApiError;
use crate::state::AppState;

pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/shop/products",
            get(list_products).post(create_product),
        )
        .route(
            "/api/shop/products/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/api/shop/orders", get(list_orders).post(create_order))
        .route("/api/shop/orders/:id", delete(delete_order))
}

// ---- products ----

fn product_out(state: &AppState, p: Product) -> ProductOut {
    ProductOut {
        id: p.id,
        name: p.name,
        price: p.price,
        unit: p.unit,
        badge: p.badge,
        image: state.images.url_opt(p.image.as_deref()),
    }
}

#[instrument(skip(state))]
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductOut>>, ApiError> {
    let products = repo::list_products(&state.db).await?;
    let items = products
        .into_iter()
        .map(|p| product_out(&state, p))
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ProductOut>, ApiError> {
    let product = repo::get_product(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("product"))?;
    Ok(Json(product_out(&state, product)))
}

#[instrument(skip(state, mp))]
pub async fn create_product(
    State(state): State<AppState>,
    mp: Multipart,
) -> Result<(StatusCode, Json<ProductOut>), ApiError> {
    let form = read_product_form(mp).await?;
    let name = form
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("name is required".into()))?;
    let price = form
        .price
        .ok_or_else(|| ApiError::Validation("price is required".into()))?;

    let image_key = match form.image {
        Some((filename, data)) => {
            let key = product_image_key(&filename);
            state.images.save(&key, data).await?;
            Some(key)
        }
        None => None,
    };

    let product = repo::insert_product(
        &state.db,
        name.trim(),
        price,
        form.unit.as_deref(),
        form.badge.as_deref(),
        image_key.as_deref(),
    )
    .await?;

    info!(product_id = %product.id, name = %product.name, "product created");
    Ok((StatusCode::CREATED, Json(product_out(&state, product))))
}

#[instrument(skip(state, mp))]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mp: Multipart,
) -> Result<Json<ProductOut>, ApiError> {
    let form = read_product_form(mp).await?;
    let name = form
        .name
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("name is required".into()))?;
    let price = form
        .price
        .ok_or_else(|| ApiError::Validation("price is required".into()))?;

    let image_key = match form.image {
        Some((filename, data)) => {
            let key = product_image_key(&filename);
            state.images.save(&key, data).await?;
            Some(key)
        }
        None => None,
    };

    let product = repo::update_product(
        &state.db,
        id,
        name.trim(),
        price,
        form.unit.as_deref(),
        form.badge.as_deref(),
        image_key.as_deref(),
    )
    .await?
    .ok_or(ApiError::NotFound("product"))?;

    info!(product_id = %product.id, "product updated");
    Ok(Json(product_out(&state, product)))
}

#[instrument(skip(state))]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !repo::delete_product(&state.db, id).await? {
        return Err(ApiError::NotFound("product"));
    }
    info!(product_id = %id, "product deleted");
    Ok(Json(MessageResponse {
        message: "Deleted".into(),
    }))
}

// ---- orders ----

/// POST /api/shop/orders
///
/// Validates the cart, prices it against the live catalog and writes the
/// order with its line snapshots in one transaction. Nothing is written
/// when validation fails.
#[instrument(skip(state, payload))]
pub async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderCreated>), ApiError> {
    let ids: Vec<i64> = payload.items.iter().map(|i| i.product_id).collect();
    let products = if ids.is_empty() {
        Vec::new()
    } else {
        repo::products_by_ids(&state.db, &ids).await?
    };
    let catalog: HashMap<i64, Product> = products.into_iter().map(|p| (p.id, p)).collect();

    let (lines, total) = price_cart(&payload.items, &catalog)?;

    let customer_name = payload
        .customer_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string());
    let note = payload
        .note
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ORDER_NOTE.to_string());

    let order_id = repo::create_order(&state.db, &customer_name, &note, total, &lines)
        .await
        .map_err(ApiError::OrderPersistence)?;

    info!(order_id = %order_id, total_price = %total, lines = lines.len(), "order created");
    Ok((
        StatusCode::CREATED,
        Json(OrderCreated {
            order_id,
            total_price: total,
        }),
    ))
}

/// GET /api/shop/orders — newest first, items are the stored snapshots.
#[instrument(skip(state))]
pub async fn list_orders(State(state): State<AppState>) -> Result<Json<Vec<OrderOut>>, ApiError> {
    let orders = repo::list_orders(&state.db).await?;
    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let items = if ids.is_empty() {
        Vec::new()
    } else {
        repo::list_items_for_orders(&state.db, &ids).await?
    };

    let mut by_order: HashMap<i64, Vec<OrderItemOut>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(OrderItemOut {
            product_id: item.product_id,
            product_name: item.product_name,
            unit_price: item.unit_price,
            quantity: item.quantity,
        });
    }

    let out = orders
        .into_iter()
        .map(|o| OrderOut {
            items: by_order.remove(&o.id).unwrap_or_default(),
            id: o.id,
            customer_name: o.customer_name,
            note: o.note,
            total_price: o.total_price,
            created_at: o.created_at,
        })
        .collect();
    Ok(Json(out))
}

#[instrument(skip(state))]
pub async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if !repo::delete_order(&state.db, id).await? {
        return Err(ApiError::NotFound("order"));
    }
    info!(order_id = %id, "order deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---- multipart form ----

struct ProductForm {
    name: Option<String>,
    price: Option<i64>,
    unit: Option<String>,
    badge: Option<String>,
    image: Option<(String, Bytes)>,
}

async fn read_product_form(mut mp: Multipart) -> Result<ProductForm, ApiError> {
    let mut form = ProductForm {
        name: None,
        price: None,
        unit: None,
        badge: None,
        image: None,
    };
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("name") => form.name = Some(field_text(field).await?),
            Some("price") => {
                let raw = field_text(field).await?;
                let parsed = raw.trim().parse::<i64>().map_err(|_| {
                    ApiError::Validation(format!("price must be an integer, got {raw:?}"))
                })?;
                form.price = Some(parsed);
            }
            Some("unit") => form.unit = non_empty(field_text(field).await?),
            Some("badge") => form.badge = non_empty(field_text(field).await?),
            Some("image") => {
                let filename = field.file_name().unwrap_or("upload.bin").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?;
                if !data.is_empty() {
                    form.image = Some((filename, data));
                }
            }
            _ => {}
        }
    }
    Ok(form)
}

async fn field_text(field: Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Random key under products/, keeping the upload's extension.
fn product_image_key(original: &str) -> String {
    let ext = original
        .rsplit_once('.')
        .map(|(_, e)| e)
        .filter(|e| !e.is_empty() && e.len() <= 8)
        .unwrap_or("bin");
    format!("products/{}.{}", Uuid::new_v4().simple(), ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_image_key_keeps_extension() {
        let key = product_image_key("photo.JPG");
        assert!(key.starts_with("products/"));
        assert!(key.ends_with(".JPG"));

        let no_ext = product_image_key("photo");
        assert!(no_ext.ends_with(".bin"));

        // oversized "extension" is not trusted
        let weird = product_image_key("archive.tar.gz.backup-of-backup");
        assert!(weird.ends_with(".bin"));
    }

    #[test]
    fn non_empty_trims_and_drops_blank_fields() {
        assert_eq!(non_empty("  kg ".into()).as_deref(), Some("kg"));
        assert_eq!(non_empty("   ".into()), None);
        assert_eq!(non_empty(String::new()), None);
    }
}
