use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Failure kinds surfaced to API clients. Every variant maps to a stable
/// machine-checkable `error` string and an HTTP status.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid meal type: {0}")]
    InvalidMealType(String),

    #[error("cart is empty")]
    EmptyCart,

    #[error("{0}")]
    InvalidItem(String),

    #[error("unknown product ids: {}", .0.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", "))]
    MissingProducts(Vec<i64>),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("order could not be persisted")]
    OrderPersistence(#[source] sqlx::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidDate(_) => "invalid_date",
            ApiError::InvalidMealType(_) => "invalid_meal_type",
            ApiError::EmptyCart => "empty_cart",
            ApiError::InvalidItem(_) => "invalid_item",
            ApiError::MissingProducts(_) => "missing_products",
            ApiError::NotFound(_) => "not_found",
            ApiError::OrderPersistence(_) => "order_persistence",
            ApiError::Validation(_) => "validation",
            ApiError::Conflict(_) => "conflict",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Internal(_) => "internal",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidDate(_)
            | ApiError::InvalidMealType(_)
            | ApiError::EmptyCart
            | ApiError::InvalidItem(_)
            | ApiError::MissingProducts(_)
            | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::OrderPersistence(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(anyhow::Error::new(e).context("database error"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                ApiError::OrderPersistence(src) => error!(error = %src, "order write failed"),
                ApiError::Internal(src) => error!(error = %src, "internal error"),
                _ => error!(error = %self, "server error"),
            }
        }
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_and_statuses() {
        let cases: Vec<(ApiError, StatusCode, &str)> = vec![
            (
                ApiError::InvalidDate("2024-13-01".into()),
                StatusCode::BAD_REQUEST,
                "invalid_date",
            ),
            (
                ApiError::InvalidMealType("brunch".into()),
                StatusCode::BAD_REQUEST,
                "invalid_meal_type",
            ),
            (ApiError::EmptyCart, StatusCode::BAD_REQUEST, "empty_cart"),
            (
                ApiError::MissingProducts(vec![2, 9]),
                StatusCode::BAD_REQUEST,
                "missing_products",
            ),
            (ApiError::NotFound("order"), StatusCode::NOT_FOUND, "not_found"),
            (
                ApiError::Unauthorized("bad token".into()),
                StatusCode::UNAUTHORIZED,
                "unauthorized",
            ),
        ];
        for (err, status, kind) in cases {
            assert_eq!(err.status(), status);
            assert_eq!(err.kind(), kind);
        }
    }

    #[test]
    fn missing_products_lists_offenders() {
        let err = ApiError::MissingProducts(vec![3, 7, 11]);
        assert_eq!(err.to_string(), "unknown product ids: 3, 7, 11");
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(ApiError::NotFound("recipe").to_string(), "recipe not found");
    }
}
