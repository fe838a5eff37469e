use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use time::{format_description::FormatItem, macros::format_description, Date, Duration};

use super::dto::{RecipeOption, SlotCell, WeekResponse};
use super::repo::{CatalogRecipe, MealSlot};
use crate::error::ApiError;

/// The three fixed meals of a day, in grid order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }

    pub fn parse(s: &str) -> Option<MealType> {
        match s {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            _ => None,
        }
    }
}

const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

pub fn parse_iso_date(s: &str) -> Result<Date, ApiError> {
    Date::parse(s, ISO_DATE).map_err(|_| ApiError::InvalidDate(s.to_string()))
}

pub fn format_iso_date(d: Date) -> String {
    // Date's Display is the ISO calendar date
    d.to_string()
}

/// Monday..=Sunday of the week containing `anchor`, ascending.
pub fn week_range(anchor: Date) -> [Date; 7] {
    let monday = anchor - Duration::days(anchor.weekday().number_days_from_monday() as i64);
    core::array::from_fn(|i| monday + Duration::days(i as i64))
}

/// Flatten stored slots into the UI grid: 7 days x 3 meal types, date-major,
/// meal types in declared order. Cells without a stored slot come back with
/// no recipe and an empty note.
pub fn build_week(
    days: [Date; 7],
    slots: &[MealSlot],
    recipes: Vec<CatalogRecipe>,
    favorites: &HashSet<i64>,
) -> WeekResponse {
    let by_cell: HashMap<(Date, &str), &MealSlot> = slots
        .iter()
        .map(|s| ((s.date, s.meal_type.as_str()), s))
        .collect();

    let mut cells = Vec::with_capacity(days.len() * MealType::ALL.len());
    for d in days {
        for mt in MealType::ALL {
            let slot = by_cell.get(&(d, mt.as_str()));
            cells.push(SlotCell {
                date: format_iso_date(d),
                meal_type: mt.as_str(),
                recipe_id: slot.and_then(|s| s.recipe_id),
                note: slot.map(|s| s.note.clone()).unwrap_or_default(),
            });
        }
    }

    WeekResponse {
        days: days.iter().copied().map(format_iso_date).collect(),
        meal_types: MealType::ALL.iter().map(MealType::as_str).collect(),
        recipes: recipes
            .into_iter()
            .map(|r| RecipeOption {
                is_favorite: favorites.contains(&r.id),
                id: r.id,
                title: r.title,
                category: r.category,
            })
            .collect(),
        slots: cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;
    use time::{OffsetDateTime, Weekday};

    fn slot(date: Date, meal_type: MealType, recipe_id: Option<i64>, note: &str) -> MealSlot {
        MealSlot {
            id: 1,
            user_id: 1,
            date,
            meal_type: meal_type.as_str().to_string(),
            recipe_id,
            note: note.to_string(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn week_range_starts_monday_and_contains_anchor() {
        // a Thursday
        let anchor = date!(2024 - 03 - 14);
        let days = week_range(anchor);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].weekday(), Weekday::Monday);
        assert_eq!(days[0], date!(2024 - 03 - 11));
        assert_eq!(days[6], date!(2024 - 03 - 17));
        assert!(days.contains(&anchor));
        for pair in days.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
    }

    #[test]
    fn week_range_on_monday_and_sunday_edges() {
        let monday = date!(2024 - 03 - 11);
        assert_eq!(week_range(monday)[0], monday);

        let sunday = date!(2024 - 03 - 17);
        let days = week_range(sunday);
        assert_eq!(days[0], monday);
        assert_eq!(days[6], sunday);
    }

    #[test]
    fn week_range_idempotent_under_reanchoring() {
        let anchor = date!(2025 - 12 - 31);
        let days = week_range(anchor);
        assert_eq!(week_range(days[0]), days);
    }

    #[test]
    fn week_range_crosses_month_and_year_boundaries() {
        // 2024-01-01 is a Monday; anchoring the previous Sunday stays in 2023
        let days = week_range(date!(2023 - 12 - 31));
        assert_eq!(days[0], date!(2023 - 12 - 25));
        assert_eq!(days[6], date!(2023 - 12 - 31));
    }

    #[test]
    fn meal_type_parse_and_order() {
        assert_eq!(MealType::parse("breakfast"), Some(MealType::Breakfast));
        assert_eq!(MealType::parse("lunch"), Some(MealType::Lunch));
        assert_eq!(MealType::parse("dinner"), Some(MealType::Dinner));
        assert_eq!(MealType::parse("brunch"), None);
        assert_eq!(MealType::parse("Breakfast"), None);
        let names: Vec<_> = MealType::ALL.iter().map(MealType::as_str).collect();
        assert_eq!(names, ["breakfast", "lunch", "dinner"]);
    }

    #[test]
    fn parse_iso_date_rejects_malformed_input() {
        assert!(parse_iso_date("2024-05-01").is_ok());
        for bad in ["2024-13-01", "01-05-2024", "yesterday", "", "2024-05-32"] {
            match parse_iso_date(bad) {
                Err(ApiError::InvalidDate(s)) => assert_eq!(s, bad),
                other => panic!("expected InvalidDate for {bad:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_week_yields_21_blank_cells() {
        let days = week_range(date!(2024 - 06 - 05));
        let resp = build_week(days, &[], vec![], &HashSet::new());
        assert_eq!(resp.days.len(), 7);
        assert_eq!(resp.meal_types, ["breakfast", "lunch", "dinner"]);
        assert_eq!(resp.slots.len(), 21);
        for cell in &resp.slots {
            assert_eq!(cell.recipe_id, None);
            assert_eq!(cell.note, "");
        }
    }

    #[test]
    fn grid_order_is_date_major_meal_type_minor() {
        let days = week_range(date!(2024 - 06 - 05));
        let resp = build_week(days, &[], vec![], &HashSet::new());
        for (i, cell) in resp.slots.iter().enumerate() {
            assert_eq!(cell.date, resp.days[i / 3]);
            assert_eq!(cell.meal_type, MealType::ALL[i % 3].as_str());
        }
    }

    #[test]
    fn stored_slots_land_in_their_cells() {
        let days = week_range(date!(2024 - 06 - 05));
        let slots = vec![
            slot(days[2], MealType::Lunch, Some(9), "pho bo"),
            slot(days[6], MealType::Dinner, None, "leftovers"),
        ];
        let resp = build_week(days, &slots, vec![], &HashSet::new());

        let lunch = &resp.slots[2 * 3 + 1];
        assert_eq!(lunch.recipe_id, Some(9));
        assert_eq!(lunch.note, "pho bo");

        let dinner = &resp.slots[6 * 3 + 2];
        assert_eq!(dinner.recipe_id, None);
        assert_eq!(dinner.note, "leftovers");

        let filled = resp
            .slots
            .iter()
            .filter(|c| c.recipe_id.is_some() || !c.note.is_empty())
            .count();
        assert_eq!(filled, 2);
    }

    #[test]
    fn catalog_carries_favorite_flags() {
        let days = week_range(date!(2024 - 06 - 05));
        let recipes = vec![
            CatalogRecipe {
                id: 1,
                title: "Cá hồi".into(),
                category: Some("chiên".into()),
            },
            CatalogRecipe {
                id: 2,
                title: "Lẩu thái".into(),
                category: None,
            },
        ];
        let favorites: HashSet<i64> = [2].into_iter().collect();
        let resp = build_week(days, &[], recipes, &favorites);
        assert!(!resp.recipes[0].is_favorite);
        assert!(resp.recipes[1].is_favorite);
    }
}
