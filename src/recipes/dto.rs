use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct RecipeOut {
    pub id: i64,
    pub title: String,
    pub ingredients: String,
    pub steps: String,
    pub note: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DefaultsQuery {
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FavoriteStatus {
    pub recipe_id: i64,
    pub is_favorite: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
