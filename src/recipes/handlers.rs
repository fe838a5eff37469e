use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument};
use uuid::Uuid;

use super::defaults::{self, DefaultRecipe};
use super::dto::{DefaultsQuery, FavoriteStatus, ListQuery, MessageResponse, RecipeOut};
use super::repo::{self, Recipe};
use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/api/recipes", get(list_recipes).post(create_recipe))
        .route(
            "/api/recipes/:id",
            get(get_recipe).put(update_recipe).delete(delete_recipe),
        )
        .route("/api/recipes/:id/favorite", post(toggle_favorite))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

pub fn planner_variant_routes() -> Router<AppState> {
    Router::new()
        .route("/api/gym/recipes", get(list_gym_recipes))
        .route("/api/student/recipes", get(list_student_recipes))
}

pub fn default_recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/default-recipes", get(list_default_recipes))
        .route("/default-recipes/:id", get(get_default_recipe))
}

fn recipe_out(state: &AppState, r: Recipe) -> RecipeOut {
    RecipeOut {
        id: r.id,
        title: r.title,
        ingredients: r.ingredients,
        steps: r.steps,
        note: r.note,
        category: r.category,
        image: state.images.url_opt(r.image.as_deref()),
    }
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<RecipeOut>>, ApiError> {
    let recipes = repo::list(&state.db, q.category.as_deref()).await?;
    Ok(Json(
        recipes.into_iter().map(|r| recipe_out(&state, r)).collect(),
    ))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecipeOut>, ApiError> {
    let recipe = repo::get(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("recipe"))?;
    Ok(Json(recipe_out(&state, recipe)))
}

#[instrument(skip(state, mp))]
pub async fn create_recipe(
    State(state): State<AppState>,
    mp: Multipart,
) -> Result<(StatusCode, Json<RecipeOut>), ApiError> {
    let form = read_recipe_form(mp).await?;
    let (title, ingredients, steps) = form.required()?;

    let image_key = match form.image {
        Some((filename, data)) => {
            let key = recipe_image_key(&filename);
            state.images.save(&key, data).await?;
            Some(key)
        }
        None => None,
    };

    let recipe = repo::insert(
        &state.db,
        &title,
        &ingredients,
        &steps,
        form.note.as_deref(),
        form.category.as_deref(),
        image_key.as_deref(),
    )
    .await?;

    info!(recipe_id = %recipe.id, title = %recipe.title, "recipe created");
    Ok((StatusCode::CREATED, Json(recipe_out(&state, recipe))))
}

#[instrument(skip(state, mp))]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mp: Multipart,
) -> Result<Json<RecipeOut>, ApiError> {
    let form = read_recipe_form(mp).await?;
    let (title, ingredients, steps) = form.required()?;

    let image_key = match form.image {
        Some((filename, data)) => {
            let key = recipe_image_key(&filename);
            state.images.save(&key, data).await?;
            Some(key)
        }
        None => None,
    };

    let recipe = repo::update(
        &state.db,
        id,
        &title,
        &ingredients,
        &steps,
        form.note.as_deref(),
        form.category.as_deref(),
        image_key.as_deref(),
    )
    .await?
    .ok_or(ApiError::NotFound("recipe"))?;

    info!(recipe_id = %recipe.id, "recipe updated");
    Ok(Json(recipe_out(&state, recipe)))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !repo::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("recipe"));
    }
    info!(recipe_id = %id, "recipe deleted");
    Ok(Json(MessageResponse {
        message: "Deleted".into(),
    }))
}

#[instrument(skip(state))]
pub async fn toggle_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<FavoriteStatus>, ApiError> {
    if repo::get(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("recipe"));
    }
    let is_favorite = repo::toggle_favorite(&state.db, user_id, id).await?;
    info!(user_id = %user_id, recipe_id = %id, is_favorite, "favorite toggled");
    Ok(Json(FavoriteStatus {
        recipe_id: id,
        is_favorite,
    }))
}

/// Gym / eat-clean planner data source.
#[instrument(skip(state))]
pub async fn list_gym_recipes(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecipeOut>>, ApiError> {
    let recipes = repo::list_healthy(&state.db).await?;
    Ok(Json(
        recipes.into_iter().map(|r| recipe_out(&state, r)).collect(),
    ))
}

/// Student planner data source: everyday (non-healthy) dishes.
#[instrument(skip(state))]
pub async fn list_student_recipes(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecipeOut>>, ApiError> {
    let recipes = repo::list_everyday(&state.db).await?;
    Ok(Json(
        recipes.into_iter().map(|r| recipe_out(&state, r)).collect(),
    ))
}

#[instrument]
pub async fn list_default_recipes(
    Query(q): Query<DefaultsQuery>,
) -> Json<Vec<&'static DefaultRecipe>> {
    Json(defaults::search(q.search.as_deref(), q.category.as_deref()))
}

#[instrument]
pub async fn get_default_recipe(
    Path(id): Path<i64>,
) -> Result<Json<&'static DefaultRecipe>, ApiError> {
    defaults::get(id)
        .map(Json)
        .ok_or(ApiError::NotFound("recipe"))
}

// ---- multipart form ----

struct RecipeForm {
    title: Option<String>,
    ingredients: Option<String>,
    steps: Option<String>,
    note: Option<String>,
    category: Option<String>,
    image: Option<(String, Bytes)>,
}

impl RecipeForm {
    fn required(&self) -> Result<(String, String, String), ApiError> {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::Validation("title is required".into()))?;
        let ingredients = self
            .ingredients
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::Validation("ingredients is required".into()))?;
        let steps = self
            .steps
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::Validation("steps is required".into()))?;
        Ok((title.to_string(), ingredients.to_string(), steps.to_string()))
    }
}

async fn read_recipe_form(mut mp: Multipart) -> Result<RecipeForm, ApiError> {
    let mut form = RecipeForm {
        title: None,
        ingredients: None,
        steps: None,
        note: None,
        category: None,
        image: None,
    };
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("title") => form.title = Some(field_text(field).await?),
            Some("ingredients") => form.ingredients = Some(field_text(field).await?),
            Some("steps") => form.steps = Some(field_text(field).await?),
            Some("note") => form.note = non_empty(field_text(field).await?),
            Some("category") => form.category = non_empty(field_text(field).await?),
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

/// Random prefix so repeated uploads of the same filename never collide.
fn recipe_image_key(original: &str) -> String {
    format!("{}_{}", Uuid::new_v4().simple(), original)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipe_image_key_keeps_original_name() {
        let key = recipe_image_key("bun-cha.jpg");
        assert!(key.ends_with("_bun-cha.jpg"));
        assert_ne!(recipe_image_key("a.jpg"), recipe_image_key("a.jpg"));
    }

    #[test]
    fn required_fields_are_enforced() {
        let form = RecipeForm {
            title: Some("Phở bò".into()),
            ingredients: Some("Bánh phở; Thịt bò".into()),
            steps: Some("1. Nấu nước dùng".into()),
            note: None,
            category: None,
            image: None,
        };
        assert!(form.required().is_ok());

        let missing = RecipeForm {
            title: Some("  ".into()),
            ingredients: Some("x".into()),
            steps: Some("y".into()),
            note: None,
            category: None,
            image: None,
        };
        assert!(matches!(missing.required(), Err(ApiError::Validation(_))));
    }
}
