// Copyright 2023 Remi Bernotavicius

use crate::access::EditorCapability;
use crate::database::models::{
    Ingredient, IngredientCategory, IngredientId, Recipe, RecipeId,
};
use crate::database::{self, query, Error};

/// Name the system recipe gets when it is first created. Its ingredients are added to every
/// week's shopping list.
pub const SHOPPING_RECIPE: &str = "Shopping";

fn clean_name(name: &str) -> database::Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::EmptyName);
    }
    Ok(name)
}

pub fn ingredients(conn: &mut database::Connection) -> database::Result<Vec<Ingredient>> {
    query::list_ingredients(conn)
}

pub fn add_ingredient(
    conn: &mut database::Connection,
    _editor: &EditorCapability,
    name: &str,
    category: IngredientCategory,
) -> database::Result<IngredientId> {
    let name = clean_name(name)?;
    let id = query::add_ingredient(conn, name, &category.to_string())?;
    log::info!("added ingredient {name:?} to {category}");
    Ok(id)
}

pub fn update_ingredient(
    conn: &mut database::Connection,
    _editor: &EditorCapability,
    id: IngredientId,
    name: &str,
    category: IngredientCategory,
) -> database::Result<()> {
    query::update_ingredient(conn, id, clean_name(name)?, &category.to_string())
}

pub fn delete_ingredient(
    conn: &mut database::Connection,
    _editor: &EditorCapability,
    id: IngredientId,
) -> database::Result<()> {
    query::delete_ingredient(conn, id)
}

/// Every recipe, system recipe included. The system recipe is created here the first time.
pub fn recipes(conn: &mut database::Connection) -> database::Result<Vec<Recipe>> {
    query::ensure_special_recipe(conn, SHOPPING_RECIPE)?;
    query::list_recipes(conn)
}

pub fn create_recipe(
    conn: &mut database::Connection,
    _editor: &EditorCapability,
    name: &str,
    ingredient_ids: &[IngredientId],
) -> database::Result<RecipeId> {
    let name = clean_name(name)?;
    let id = query::create_recipe(conn, name, ingredient_ids)?;
    log::info!(
        "created recipe {name:?} with {} ingredients",
        ingredient_ids.len()
    );
    Ok(id)
}

pub fn update_recipe(
    conn: &mut database::Connection,
    _editor: &EditorCapability,
    id: RecipeId,
    name: &str,
    ingredient_ids: &[IngredientId],
) -> database::Result<()> {
    query::update_recipe(conn, id, clean_name(name)?, ingredient_ids)
}

pub fn delete_recipe(
    conn: &mut database::Connection,
    _editor: &EditorCapability,
    id: RecipeId,
) -> database::Result<()> {
    query::delete_recipe(conn, id)
}

#[test]
fn recipes_include_system_recipe() {
    let mut conn = database::establish_in_memory();

    let recipes = recipes(&mut conn).unwrap();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0].name, SHOPPING_RECIPE);
    assert!(recipes[0].is_system);

    assert_eq!(self::recipes(&mut conn).unwrap(), recipes);
}

#[test]
fn names_are_trimmed() {
    let editor = crate::access::test_editor();
    let mut conn = database::establish_in_memory();

    let tomato =
        add_ingredient(&mut conn, &editor, "  Tomato ", IngredientCategory::Produce).unwrap();
    assert!(matches!(
        add_ingredient(&mut conn, &editor, "Tomato", IngredientCategory::Other),
        Err(Error::AlreadyExists { .. })
    ));
    assert!(matches!(
        add_ingredient(&mut conn, &editor, "   ", IngredientCategory::Other),
        Err(Error::EmptyName)
    ));

    let salad = create_recipe(&mut conn, &editor, " Salad", &[tomato]).unwrap();
    assert!(matches!(
        update_recipe(&mut conn, &editor, salad, "", &[]),
        Err(Error::EmptyName)
    ));

    let ingredients = ingredients(&mut conn).unwrap();
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0].name, "Tomato");
    assert_eq!(
        IngredientCategory::from_name(&ingredients[0].category),
        IngredientCategory::Produce
    );
    assert_eq!(query::get_recipe(&mut conn, salad).unwrap().name, "Salad");
}

#[test]
fn unknown_category_is_other() {
    assert_eq!(IngredientCategory::from_name("Fishmonger"), IngredientCategory::Fishmonger);
    assert_eq!(IngredientCategory::from_name("Garden"), IngredientCategory::Other);
    assert_eq!(IngredientCategory::from_name(""), IngredientCategory::Other);
}
