use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{CreateReviewRequest, ReviewOut};
use super::repo::{self, Review};
use crate::error::ApiError;
use crate::notify::{dispatch_review_created, ReviewCreated};
use crate::state::AppState;

pub fn review_routes() -> Router<AppState> {
    Router::new().route(
        "/api/recipes/:id/reviews",
        get(list_reviews).post(create_review),
    )
}

fn review_out(r: Review) -> ReviewOut {
    ReviewOut {
        id: r.id,
        recipe_id: r.recipe_id,
        author: r.author,
        rating: r.rating,
        comment: r.comment,
        created_at: r.created_at,
    }
}

fn validate_rating(rating: i32) -> Result<(), ApiError> {
    if (1..=5).contains(&rating) {
        Ok(())
    } else {
        Err(ApiError::Validation(format!(
            "rating must be between 1 and 5, got {rating}"
        )))
    }
}

#[instrument(skip(state))]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
) -> Result<Json<Vec<ReviewOut>>, ApiError> {
    repo::recipe_title(&state.db, recipe_id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    let reviews = repo::list_by_recipe(&state.db, recipe_id).await?;
    Ok(Json(reviews.into_iter().map(review_out).collect()))
}

/// POST /api/recipes/:id/reviews
///
/// The notification mail goes out on a detached task after the insert has
/// committed; a failed notification only logs.
#[instrument(skip(state, payload))]
pub async fn create_review(
    State(state): State<AppState>,
    Path(recipe_id): Path<i64>,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<ReviewOut>), ApiError> {
    validate_rating(payload.rating)?;

    let recipe_title = repo::recipe_title(&state.db, recipe_id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;

    let author = payload
        .author
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let comment = payload
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let review = repo::insert(&state.db, recipe_id, author, payload.rating, comment).await?;

    info!(recipe_id = %recipe_id, review_id = %review.id, rating = review.rating, "review created");
    dispatch_review_created(
        state.notifier.clone(),
        ReviewCreated {
            recipe_title,
            author: review.author.clone().unwrap_or_else(|| "Ẩn danh".into()),
            rating: review.rating,
            comment: review.comment.clone().unwrap_or_default(),
        },
    );

    Ok((StatusCode::CREATED, Json(review_out(review))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_bounds() {
        for ok in 1..=5 {
            assert!(validate_rating(ok).is_ok());
        }
        for bad in [0, 6, -1, 100] {
            assert!(matches!(
                validate_rating(bad),
                Err(ApiError::Validation(_))
            ));
        }
    }
}
