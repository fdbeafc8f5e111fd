// Copyright 2023 Remi Bernotavicius

use derive_more::Display;
use diesel::associations::Identifiable;
use diesel::deserialize::Queryable;
use diesel::expression::Selectable;
use diesel::prelude::Insertable;
use diesel_derive_enum::DbEnum;
use diesel_derive_newtype::DieselNewType;
use strum::EnumIter;

#[derive(DieselNewType, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub struct IngredientId(i32);

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::database::schema::ingredients)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub category: String,
}

/// The aisles an ingredient can be filed under. Categories are stored as plain text so rows
/// written with a name outside this list still load, they just show up under `Other`.
#[derive(Debug, Default, Display, EnumIter, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngredientCategory {
    #[display("Produce")]
    Produce,
    #[display("Butcher")]
    Butcher,
    #[display("Deli")]
    Deli,
    #[display("Fishmonger")]
    Fishmonger,
    #[display("Dairy")]
    Dairy,
    #[display("Bakery")]
    Bakery,
    #[display("Pantry")]
    Pantry,
    #[display("Cleaning")]
    Cleaning,
    #[display("Frozen")]
    Frozen,
    #[default]
    #[display("Other")]
    Other,
}

impl IngredientCategory {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }

    pub fn from_name(name: &str) -> Self {
        Self::iter()
            .find(|c| c.to_string() == name.trim())
            .unwrap_or(Self::Other)
    }
}

#[derive(DieselNewType, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Copy, Clone)]
pub struct RecipeId(i32);

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub is_system: bool,
}

impl Recipe {
    pub fn to_handle(&self) -> RecipeHandle {
        RecipeHandle {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::database::schema::recipes)]
pub struct RecipeHandle {
    pub id: RecipeId,
    pub name: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::database::schema::recipe_ingredients)]
pub struct RecipeIngredient {
    pub recipe_id: RecipeId,
    pub ingredient_id: IngredientId,
}

/// The fixed set of moments in a day a recipe can be planned for, in display order.
#[derive(
    Debug, Display, EnumIter, Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, DbEnum,
)]
pub enum MealSlot {
    #[display("Breakfast")]
    Breakfast,
    #[display("Mid-Morning")]
    MidMorning,
    #[display("Lunch")]
    Lunch,
    #[display("Mid-Afternoon")]
    MidAfternoon,
    #[display("Dinner")]
    Dinner,
    #[display("General Shopping")]
    GeneralShopping,
}

impl MealSlot {
    pub fn iter() -> impl Iterator<Item = Self> {
        <Self as strum::IntoEnumIterator>::iter()
    }
}

#[derive(Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::database::schema::meal_plan)]
pub struct MealPlanEntry {
    pub day: chrono::NaiveDate,
    pub slot: MealSlot,
    pub recipe_id: Option<RecipeId>,
}

/// A meal plan row joined with the name of the recipe it points at, if any.
#[derive(Queryable, Debug, Clone, PartialEq, Eq)]
pub struct PlannedMeal {
    pub day: chrono::NaiveDate,
    pub slot: MealSlot,
    pub recipe_id: Option<RecipeId>,
    pub recipe_name: Option<String>,
}

impl PlannedMeal {
    pub fn recipe(&self) -> Option<RecipeHandle> {
        match (self.recipe_id, &self.recipe_name) {
            (Some(id), Some(name)) => Some(RecipeHandle {
                id,
                name: name.clone(),
            }),
            _ => None,
        }
    }
}
