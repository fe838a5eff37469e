//! Built-in starter recipes shown before the user has created any.

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DefaultRecipe {
    pub id: i64,
    pub title: &'static str,
    pub ingredients: &'static str,
    pub steps: &'static str,
    pub note: &'static str,
    pub category: &'static str,
    pub image: &'static str,
}

pub const DEFAULT_RECIPES: &[DefaultRecipe] = &[
    DefaultRecipe {
        id: 1,
        title: "Cá hồi",
        ingredients: "Cá hồi; Hành lá; Nước mắm; Dầu ăn",
        steps: "1. chiên cá...\n2. Phi hành...\n3. trộn cá và hành...",
        note: "Thời gian: 20 phút, độ khó: Dễ",
        category: "chiên",
        image: "/static/default/comchien.jpg",
    },
    DefaultRecipe {
        id: 2,
        title: "Lẩu thái",
        ingredients: "Tôm; Mực; Thịt bò; Nấm; Bún",
        steps: "1. Nấu nước...\n2. Trụng thịt...\n3. lấy bún...",
        note: "20 phút, dễ",
        category: "canh",
        image: "/static/default/raucai.jpg",
    },
];

/// Case-insensitive filter over title/ingredients plus exact (but
/// case-insensitive) category match.
pub fn search(term: Option<&str>, category: Option<&str>) -> Vec<&'static DefaultRecipe> {
    DEFAULT_RECIPES
        .iter()
        .filter(|r| match term {
            Some(s) => {
                let s = s.to_lowercase();
                r.title.to_lowercase().contains(&s) || r.ingredients.to_lowercase().contains(&s)
            }
            None => true,
        })
        .filter(|r| match category {
            Some(c) => r.category.to_lowercase() == c.to_lowercase(),
            None => true,
        })
        .collect()
}

pub fn get(id: i64) -> Option<&'static DefaultRecipe> {
    DEFAULT_RECIPES.iter().find(|r| r.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_without_filters_returns_everything() {
        assert_eq!(search(None, None).len(), DEFAULT_RECIPES.len());
    }

    #[test]
    fn search_matches_title_and_ingredients_case_insensitively() {
        let hits = search(Some("cá hồi"), None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);

        // ingredient match
        let hits = search(Some("tôm"), None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);

        assert!(search(Some("pizza"), None).is_empty());
    }

    #[test]
    fn category_filter_is_exact() {
        let hits = search(None, Some("canh"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);

        assert!(search(None, Some("can")).is_empty());
    }

    #[test]
    fn get_by_id() {
        assert_eq!(get(1).map(|r| r.title), Some("Cá hồi"));
        assert!(get(99).is_none());
    }
}
