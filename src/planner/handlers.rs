use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::dto::{SaveSlotRequest, SavedSlot, WeekQuery, WeekResponse};
use super::repo;
use super::services::{build_week, format_iso_date, parse_iso_date, week_range, MealType};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub fn planner_routes() -> Router<AppState> {
    Router::new()
        .route("/planner/week", get(planner_week))
        .route("/planner/slot", post(save_slot))
}

/// GET /planner/week?start=YYYY-MM-DD
///
/// Weekly grid for the calling user: the 7 days around `start` (today when
/// omitted), the recipe catalog for the dropdown and all 21 slot cells.
#[instrument(skip(state))]
pub async fn planner_week(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<WeekQuery>,
) -> Result<Json<WeekResponse>, ApiError> {
    let anchor = match q.start.as_deref() {
        Some(s) => parse_iso_date(s)?,
        None => OffsetDateTime::now_utc().date(),
    };
    let days = week_range(anchor);

    let slots = repo::list_slots_in_range(&state.db, user_id, days[0], days[6]).await?;
    let recipes = repo::recipe_catalog(&state.db).await?;
    let favorites = repo::favorite_recipe_ids(&state.db, user_id).await?;

    Ok(Json(build_week(days, &slots, recipes, &favorites)))
}

/// POST /planner/slot
///
/// Upsert one grid cell. Saving the same (date, meal_type) again overwrites
/// recipe and note instead of creating a second row.
#[instrument(skip(state, payload))]
pub async fn save_slot(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SaveSlotRequest>,
) -> Result<Json<SavedSlot>, ApiError> {
    let date = parse_iso_date(&payload.date)?;
    let meal_type = MealType::parse(&payload.meal_type)
        .ok_or_else(|| ApiError::InvalidMealType(payload.meal_type.clone()))?;

    if let Some(recipe_id) = payload.recipe_id {
        if !repo::recipe_exists(&state.db, recipe_id).await? {
            return Err(ApiError::NotFound("recipe"));
        }
    }

    let note = payload.note.unwrap_or_default();
    let slot = repo::upsert_slot(&state.db, user_id, date, meal_type, payload.recipe_id, &note)
        .await?;

    info!(
        user_id = %user_id,
        date = %slot.date,
        meal_type = %slot.meal_type,
        recipe_id = ?slot.recipe_id,
        "slot saved"
    );
    Ok(Json(SavedSlot {
        id: slot.id,
        date: format_iso_date(slot.date),
        meal_type: slot.meal_type,
        recipe_id: slot.recipe_id,
        note: slot.note,
    }))
}
