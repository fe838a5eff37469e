use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub start: Option<String>,
}

/// Body of POST /planner/slot.
#[derive(Debug, Deserialize)]
pub struct SaveSlotRequest {
    pub date: String,
    pub meal_type: String,
    #[serde(default)]
    pub recipe_id: Option<i64>,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecipeOption {
    pub id: i64,
    pub title: String,
    pub category: Option<String>,
    pub is_favorite: bool,
}

/// One cell of the 7x3 grid.
#[derive(Debug, Serialize)]
pub struct SlotCell {
    pub date: String,
    pub meal_type: &'static str,
    pub recipe_id: Option<i64>,
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct WeekResponse {
    pub days: Vec<String>,
    pub meal_types: Vec<&'static str>,
    pub recipes: Vec<RecipeOption>,
    pub slots: Vec<SlotCell>,
}

#[derive(Debug, Serialize)]
pub struct SavedSlot {
    pub id: i64,
    pub date: String,
    pub meal_type: String,
    pub recipe_id: Option<i64>,
    pub note: String,
}
