use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One requested cart line.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub qty: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: Option<String>,
    pub note: Option<String>,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

#[derive(Debug, Serialize)]
pub struct OrderCreated {
    pub order_id: i64,
    pub total_price: i64,
}

#[derive(Debug, Serialize)]
pub struct ProductOut {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub unit: Option<String>,
    pub badge: Option<String>,
    pub image: Option<String>,
}

/// Order line as stored: the name/price snapshot, not the live product.
#[derive(Debug, Serialize)]
pub struct OrderItemOut {
    pub product_id: Option<i64>,
    pub product_name: String,
    pub unit_price: i64,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct OrderOut {
    pub id: i64,
    pub customer_name: String,
    pub note: Option<String>,
    pub total_price: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub items: Vec<OrderItemOut>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
