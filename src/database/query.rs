// Copyright 2023 Remi Bernotavicius

use super::models::{
    Ingredient, IngredientId, MealPlanEntry, MealSlot, PlannedMeal, Recipe, RecipeId,
    RecipeIngredient,
};
use super::{Connection, Error, Result};
use diesel::prelude::Connection as _;
use diesel::prelude::OptionalExtension as _;
use diesel::BoolExpressionMethods as _;
use diesel::ExpressionMethods as _;
use diesel::NullableExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use diesel::SelectableHelper as _;
use std::collections::{BTreeSet, HashMap};

pub fn add_ingredient(
    conn: &mut Connection,
    new_name: &str,
    new_category: &str,
) -> Result<IngredientId> {
    use super::schema::ingredients::dsl::*;

    conn.transaction::<_, Error, _>(|conn| {
        diesel::insert_into(ingredients)
            .values((name.eq(new_name), category.eq(new_category)))
            .execute(conn)
            .map_err(Error::on_unique("ingredient", new_name))?;
        Ok(ingredients
            .filter(name.eq(new_name))
            .select(id)
            .get_result(conn)?)
    })
}

pub fn update_ingredient(
    conn: &mut Connection,
    edit_id: IngredientId,
    edit_name: &str,
    edit_category: &str,
) -> Result<()> {
    use super::schema::ingredients::dsl::*;

    let updated = diesel::update(ingredients)
        .filter(id.eq(edit_id))
        .set((name.eq(edit_name), category.eq(edit_category)))
        .execute(conn)
        .map_err(Error::on_unique("ingredient", edit_name))?;
    if updated == 0 {
        return Err(Error::NotFound);
    }
    Ok(())
}

pub fn delete_ingredient(conn: &mut Connection, delete_id: IngredientId) -> Result<()> {
    use super::schema::{ingredients, recipe_ingredients};

    conn.transaction::<_, Error, _>(|conn| {
        diesel::delete(recipe_ingredients::table)
            .filter(recipe_ingredients::ingredient_id.eq(delete_id))
            .execute(conn)?;
        diesel::delete(ingredients::table)
            .filter(ingredients::id.eq(delete_id))
            .execute(conn)?;
        Ok(())
    })
}

pub fn list_ingredients(conn: &mut Connection) -> Result<Vec<Ingredient>> {
    use super::schema::ingredients::dsl::*;

    Ok(ingredients
        .select(Ingredient::as_select())
        .order_by(name.asc())
        .load(conn)?)
}

/// Maps every ingredient name to the category it is filed under.
pub fn ingredient_categories(conn: &mut Connection) -> Result<HashMap<String, String>> {
    use super::schema::ingredients::dsl::*;

    Ok(ingredients
        .select((name, category))
        .load::<(String, String)>(conn)?
        .into_iter()
        .collect())
}

/// Makes sure the system recipe exists, creating it under `special_name` if there isn't one yet.
/// A regular recipe that already uses the name gets promoted.
pub fn ensure_special_recipe(conn: &mut Connection, special_name: &str) -> Result<RecipeId> {
    use super::schema::recipes::dsl::*;

    conn.transaction::<_, Error, _>(|conn| {
        if let Some(existing) = recipes
            .filter(is_system.eq(true))
            .select(id)
            .first::<RecipeId>(conn)
            .optional()?
        {
            return Ok(existing);
        }

        let existing = recipes
            .filter(name.eq(special_name))
            .select(id)
            .first::<RecipeId>(conn)
            .optional()?;
        if let Some(existing) = existing {
            diesel::update(recipes)
                .filter(id.eq(existing))
                .set(is_system.eq(true))
                .execute(conn)?;
            return Ok(existing);
        }

        log::info!("creating system recipe {special_name:?}");
        diesel::insert_into(recipes)
            .values((name.eq(special_name), is_system.eq(true)))
            .execute(conn)?;
        Ok(recipes
            .filter(name.eq(special_name))
            .select(id)
            .get_result(conn)?)
    })
}

pub fn system_recipe(conn: &mut Connection) -> Result<Option<Recipe>> {
    use super::schema::recipes::dsl::*;

    Ok(recipes
        .select(Recipe::as_select())
        .filter(is_system.eq(true))
        .first(conn)
        .optional()?)
}

fn insert_recipe_ingredients(
    conn: &mut Connection,
    recipe: RecipeId,
    ingredient_ids: &[IngredientId],
) -> Result<()> {
    use super::schema::recipe_ingredients::dsl::*;

    let rows: Vec<_> = ingredient_ids
        .iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|&i| RecipeIngredient {
            recipe_id: recipe,
            ingredient_id: i,
        })
        .collect();
    if rows.is_empty() {
        return Ok(());
    }

    diesel::insert_into(recipe_ingredients)
        .values(&rows)
        .execute(conn)?;
    Ok(())
}

pub fn create_recipe(
    conn: &mut Connection,
    new_name: &str,
    ingredient_ids: &[IngredientId],
) -> Result<RecipeId> {
    use super::schema::recipes::dsl::*;

    conn.transaction::<_, Error, _>(|conn| {
        diesel::insert_into(recipes)
            .values((name.eq(new_name), is_system.eq(false)))
            .execute(conn)
            .map_err(Error::on_unique("recipe", new_name))?;
        let new_id = recipes
            .filter(name.eq(new_name))
            .select(id)
            .get_result(conn)?;
        insert_recipe_ingredients(conn, new_id, ingredient_ids)?;
        Ok(new_id)
    })
}

pub fn get_recipe(conn: &mut Connection, recipe: RecipeId) -> Result<Recipe> {
    use super::schema::recipes::dsl::*;

    recipes
        .select(Recipe::as_select())
        .filter(id.eq(recipe))
        .first(conn)
        .optional()?
        .ok_or(Error::NotFound)
}

/// Replaces the name and the whole ingredient set of a recipe.
pub fn update_recipe(
    conn: &mut Connection,
    edit_id: RecipeId,
    new_name: &str,
    ingredient_ids: &[IngredientId],
) -> Result<()> {
    use super::schema::{recipe_ingredients, recipes};

    conn.transaction::<_, Error, _>(|conn| {
        let recipe = get_recipe(conn, edit_id)?;
        if recipe.is_system && recipe.name != new_name {
            return Err(Error::SystemRecipe(recipe.name));
        }

        diesel::update(recipes::table)
            .filter(recipes::id.eq(edit_id))
            .set(recipes::name.eq(new_name))
            .execute(conn)
            .map_err(Error::on_unique("recipe", new_name))?;
        diesel::delete(recipe_ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq(edit_id))
            .execute(conn)?;
        insert_recipe_ingredients(conn, edit_id, ingredient_ids)
    })
}

/// Deletes a recipe and its ingredient links. Meal plan entries pointing at it stay, emptied.
pub fn delete_recipe(conn: &mut Connection, delete_id: RecipeId) -> Result<()> {
    use super::schema::{meal_plan, recipe_ingredients, recipes};

    conn.transaction::<_, Error, _>(|conn| {
        let recipe = get_recipe(conn, delete_id)?;
        if recipe.is_system {
            return Err(Error::SystemRecipe(recipe.name));
        }

        diesel::update(meal_plan::table)
            .filter(meal_plan::recipe_id.eq(delete_id))
            .set(meal_plan::recipe_id.eq(None::<RecipeId>))
            .execute(conn)?;
        diesel::delete(recipe_ingredients::table)
            .filter(recipe_ingredients::recipe_id.eq(delete_id))
            .execute(conn)?;
        diesel::delete(recipes::table)
            .filter(recipes::id.eq(delete_id))
            .execute(conn)?;
        Ok(())
    })
}

pub fn list_recipes(conn: &mut Connection) -> Result<Vec<Recipe>> {
    use super::schema::recipes::dsl::*;

    Ok(recipes
        .select(Recipe::as_select())
        .order_by(name.asc())
        .load(conn)?)
}

pub fn get_recipe_ingredients(conn: &mut Connection, recipe: RecipeId) -> Result<Vec<String>> {
    use super::schema::{ingredients, recipe_ingredients};

    Ok(recipe_ingredients::table
        .inner_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq(recipe))
        .select(ingredients::name)
        .order_by(ingredients::name.asc())
        .load(conn)?)
}

pub fn get_recipe_ingredient_ids(
    conn: &mut Connection,
    recipe: RecipeId,
) -> Result<BTreeSet<IngredientId>> {
    use super::schema::recipe_ingredients::dsl::*;

    Ok(recipe_ingredients
        .filter(recipe_id.eq(recipe))
        .select(ingredient_id)
        .load::<IngredientId>(conn)?
        .into_iter()
        .collect())
}

/// Assigns a recipe to a slot, replacing whatever was there. `None` empties the slot.
pub fn save_meal_plan_entry(
    conn: &mut Connection,
    edit_day: chrono::NaiveDate,
    edit_slot: MealSlot,
    edit_recipe: Option<RecipeId>,
) -> Result<()> {
    use super::schema::meal_plan::dsl::*;

    let entry = MealPlanEntry {
        day: edit_day,
        slot: edit_slot,
        recipe_id: edit_recipe,
    };
    diesel::insert_into(meal_plan)
        .values(&entry)
        .on_conflict((day, slot))
        .do_update()
        .set(recipe_id.eq(edit_recipe))
        .execute(conn)?;
    Ok(())
}

/// Every meal plan entry between `start` and `end`, both inclusive, ordered by day then slot.
pub fn get_plan_range(
    conn: &mut Connection,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
) -> Result<Vec<PlannedMeal>> {
    use super::schema::{meal_plan, recipes};

    let mut meals: Vec<PlannedMeal> = meal_plan::table
        .left_join(recipes::table)
        .filter(meal_plan::day.ge(start).and(meal_plan::day.le(end)))
        .select((
            meal_plan::day,
            meal_plan::slot,
            meal_plan::recipe_id,
            recipes::name.nullable(),
        ))
        .load(conn)?;
    meals.sort_by_key(|m| (m.day, m.slot));
    Ok(meals)
}

pub fn get_shopping_status(
    conn: &mut Connection,
    week: chrono::NaiveDate,
) -> Result<HashMap<String, bool>> {
    use super::schema::shopping_status::dsl::*;

    Ok(shopping_status
        .filter(week_start.eq(week))
        .select((ingredient_name, checked))
        .load::<(String, bool)>(conn)?
        .into_iter()
        .collect())
}

pub fn set_shopping_status(
    conn: &mut Connection,
    week: chrono::NaiveDate,
    ingredient: &str,
    value: bool,
) -> Result<()> {
    use super::schema::shopping_status::dsl::*;

    diesel::insert_into(shopping_status)
        .values((
            week_start.eq(week),
            ingredient_name.eq(ingredient),
            checked.eq(value),
        ))
        .on_conflict((week_start, ingredient_name))
        .do_update()
        .set(checked.eq(value))
        .execute(conn)?;
    Ok(())
}

pub fn clear_shopping_status(conn: &mut Connection, week: chrono::NaiveDate) -> Result<()> {
    use super::schema::shopping_status::dsl::*;

    diesel::delete(shopping_status)
        .filter(week_start.eq(week))
        .execute(conn)?;
    Ok(())
}

/// Wipes every meal plan entry and every shopping checkbox. Ingredients and recipes are kept.
pub fn reset_historical_data(conn: &mut Connection) -> Result<()> {
    use super::schema::{meal_plan, shopping_status};

    conn.transaction::<_, Error, _>(|conn| {
        let meals = diesel::delete(meal_plan::table).execute(conn)?;
        let statuses = diesel::delete(shopping_status::table).execute(conn)?;
        log::warn!("reset history: removed {meals} planned meals and {statuses} shopping entries");
        Ok(())
    })
}

#[cfg(test)]
fn date(s: &str) -> chrono::NaiveDate {
    s.parse().unwrap()
}

#[test]
fn add_ingredient_twice() {
    let mut conn = super::establish_in_memory();

    add_ingredient(&mut conn, "Tomato", "Produce").unwrap();
    let error = add_ingredient(&mut conn, "Tomato", "Produce").unwrap_err();
    assert!(error.is_already_exists(), "{error}");

    let all = list_ingredients(&mut conn).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Tomato");
    assert_eq!(all[0].category, "Produce");
}

#[test]
fn list_ingredients_sorted_by_name() {
    let mut conn = super::establish_in_memory();

    for n in ["Onion", "Egg", "Cheese"] {
        add_ingredient(&mut conn, n, "Other").unwrap();
    }
    let names: Vec<_> = list_ingredients(&mut conn)
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, ["Cheese", "Egg", "Onion"]);
}

#[test]
fn update_ingredient_to_taken_name() {
    let mut conn = super::establish_in_memory();

    add_ingredient(&mut conn, "Egg", "Dairy").unwrap();
    let onion = add_ingredient(&mut conn, "Onion", "Produce").unwrap();

    let error = update_ingredient(&mut conn, onion, "Egg", "Produce").unwrap_err();
    assert!(error.is_already_exists(), "{error}");

    update_ingredient(&mut conn, onion, "Red Onion", "Other").unwrap();
    let categories = ingredient_categories(&mut conn).unwrap();
    assert_eq!(
        categories,
        maplit::hashmap! {
            "Egg".to_owned() => "Dairy".to_owned(),
            "Red Onion".to_owned() => "Other".to_owned(),
        }
    );
}

#[test]
fn update_missing_ingredient() {
    let mut conn = super::establish_in_memory();

    let egg = add_ingredient(&mut conn, "Egg", "Dairy").unwrap();
    delete_ingredient(&mut conn, egg).unwrap();
    assert!(matches!(
        update_ingredient(&mut conn, egg, "Egg", "Dairy"),
        Err(Error::NotFound)
    ));
}

#[test]
fn recipe_ingredients_round_trip() {
    let mut conn = super::establish_in_memory();

    let b = add_ingredient(&mut conn, "B", "Other").unwrap();
    let a = add_ingredient(&mut conn, "A", "Other").unwrap();
    let recipe = create_recipe(&mut conn, "Mix", &[b, a, b]).unwrap();

    assert_eq!(get_recipe_ingredients(&mut conn, recipe).unwrap(), ["A", "B"]);
    assert_eq!(
        get_recipe_ingredient_ids(&mut conn, recipe).unwrap(),
        maplit::btreeset! {a, b}
    );
}

#[test]
fn create_recipe_is_all_or_nothing() {
    let mut conn = super::establish_in_memory();

    let egg = add_ingredient(&mut conn, "Egg", "Dairy").unwrap();
    let gone = add_ingredient(&mut conn, "Gone", "Other").unwrap();
    delete_ingredient(&mut conn, gone).unwrap();

    create_recipe(&mut conn, "Omelette", &[egg, gone]).unwrap_err();
    assert!(list_recipes(&mut conn).unwrap().is_empty());

    create_recipe(&mut conn, "Omelette", &[egg]).unwrap();
    let error = create_recipe(&mut conn, "Omelette", &[]).unwrap_err();
    assert!(error.is_already_exists(), "{error}");
    assert_eq!(list_recipes(&mut conn).unwrap().len(), 1);
}

#[test]
fn update_recipe_replaces_ingredients() {
    let mut conn = super::establish_in_memory();

    let egg = add_ingredient(&mut conn, "Egg", "Dairy").unwrap();
    let cheese = add_ingredient(&mut conn, "Cheese", "Dairy").unwrap();
    let onion = add_ingredient(&mut conn, "Onion", "Produce").unwrap();
    let recipe = create_recipe(&mut conn, "Omelette", &[egg, cheese]).unwrap();
    create_recipe(&mut conn, "Soup", &[onion]).unwrap();

    update_recipe(&mut conn, recipe, "Onion Omelette", &[egg, onion]).unwrap();
    assert_eq!(get_recipe(&mut conn, recipe).unwrap().name, "Onion Omelette");
    assert_eq!(
        get_recipe_ingredients(&mut conn, recipe).unwrap(),
        ["Egg", "Onion"]
    );

    let error = update_recipe(&mut conn, recipe, "Soup", &[cheese]).unwrap_err();
    assert!(error.is_already_exists(), "{error}");
    assert_eq!(
        get_recipe_ingredients(&mut conn, recipe).unwrap(),
        ["Egg", "Onion"]
    );
}

#[test]
fn delete_ingredient_keeps_recipe() {
    let mut conn = super::establish_in_memory();

    let egg = add_ingredient(&mut conn, "Egg", "Dairy").unwrap();
    let cheese = add_ingredient(&mut conn, "Cheese", "Dairy").unwrap();
    let recipe = create_recipe(&mut conn, "Omelette", &[egg, cheese]).unwrap();

    delete_ingredient(&mut conn, cheese).unwrap();
    assert_eq!(get_recipe_ingredients(&mut conn, recipe).unwrap(), ["Egg"]);
    assert_eq!(get_recipe(&mut conn, recipe).unwrap().name, "Omelette");
}

#[test]
fn delete_recipe_empties_plan_entry() {
    let mut conn = super::establish_in_memory();

    let egg = add_ingredient(&mut conn, "Egg", "Dairy").unwrap();
    let recipe = create_recipe(&mut conn, "Omelette", &[egg]).unwrap();
    let monday = date("2024-01-01");
    save_meal_plan_entry(&mut conn, monday, MealSlot::Breakfast, Some(recipe)).unwrap();

    delete_recipe(&mut conn, recipe).unwrap();

    let plan = get_plan_range(&mut conn, monday, monday).unwrap();
    assert_eq!(
        plan,
        [PlannedMeal {
            day: monday,
            slot: MealSlot::Breakfast,
            recipe_id: None,
            recipe_name: None,
        }]
    );
    assert!(list_recipes(&mut conn).unwrap().is_empty());
    assert_eq!(list_ingredients(&mut conn).unwrap().len(), 1);
}

#[test]
fn system_recipe_is_protected() {
    let mut conn = super::establish_in_memory();

    let egg = add_ingredient(&mut conn, "Egg", "Dairy").unwrap();
    let shopping = ensure_special_recipe(&mut conn, "Shopping").unwrap();
    assert_eq!(ensure_special_recipe(&mut conn, "Shopping").unwrap(), shopping);
    assert_eq!(list_recipes(&mut conn).unwrap().len(), 1);

    assert!(matches!(
        delete_recipe(&mut conn, shopping),
        Err(Error::SystemRecipe(_))
    ));
    assert!(matches!(
        update_recipe(&mut conn, shopping, "Groceries", &[egg]),
        Err(Error::SystemRecipe(_))
    ));

    update_recipe(&mut conn, shopping, "Shopping", &[egg]).unwrap();
    assert_eq!(get_recipe_ingredients(&mut conn, shopping).unwrap(), ["Egg"]);

    let recipe = system_recipe(&mut conn).unwrap().unwrap();
    assert_eq!(recipe.id, shopping);
    assert!(recipe.is_system);
}

#[test]
fn ensure_special_recipe_promotes_existing() {
    let mut conn = super::establish_in_memory();

    let existing = create_recipe(&mut conn, "Shopping", &[]).unwrap();
    assert_eq!(ensure_special_recipe(&mut conn, "Shopping").unwrap(), existing);
    assert!(get_recipe(&mut conn, existing).unwrap().is_system);
}

#[test]
fn meal_plan_upsert() {
    let mut conn = super::establish_in_memory();

    let omelette = create_recipe(&mut conn, "Omelette", &[]).unwrap();
    let soup = create_recipe(&mut conn, "Soup", &[]).unwrap();
    let monday = date("2024-01-01");

    save_meal_plan_entry(&mut conn, monday, MealSlot::Lunch, Some(omelette)).unwrap();
    save_meal_plan_entry(&mut conn, monday, MealSlot::Lunch, Some(soup)).unwrap();
    let plan = get_plan_range(&mut conn, monday, monday).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].recipe_name.as_deref(), Some("Soup"));

    save_meal_plan_entry(&mut conn, monday, MealSlot::Lunch, None).unwrap();
    let plan = get_plan_range(&mut conn, monday, monday).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].recipe(), None);
}

#[test]
fn plan_range_is_inclusive() {
    let mut conn = super::establish_in_memory();

    let soup = create_recipe(&mut conn, "Soup", &[]).unwrap();
    for d in ["2023-12-31", "2024-01-01", "2024-01-07", "2024-01-08"] {
        save_meal_plan_entry(&mut conn, date(d), MealSlot::Dinner, Some(soup)).unwrap();
    }
    save_meal_plan_entry(&mut conn, date("2024-01-01"), MealSlot::Breakfast, Some(soup))
        .unwrap();

    let plan = get_plan_range(&mut conn, date("2024-01-01"), date("2024-01-07")).unwrap();
    let keys: Vec<_> = plan.iter().map(|m| (m.day, m.slot)).collect();
    assert_eq!(
        keys,
        [
            (date("2024-01-01"), MealSlot::Breakfast),
            (date("2024-01-01"), MealSlot::Dinner),
            (date("2024-01-07"), MealSlot::Dinner),
        ]
    );
}

#[test]
fn shopping_status_per_week() {
    let mut conn = super::establish_in_memory();

    let week = date("2024-01-01");
    let next_week = date("2024-01-08");
    set_shopping_status(&mut conn, week, "Egg", true).unwrap();
    set_shopping_status(&mut conn, week, "Onion", true).unwrap();
    set_shopping_status(&mut conn, week, "Onion", false).unwrap();
    set_shopping_status(&mut conn, next_week, "Egg", true).unwrap();

    assert_eq!(
        get_shopping_status(&mut conn, week).unwrap(),
        maplit::hashmap! {"Egg".to_owned() => true, "Onion".to_owned() => false}
    );

    clear_shopping_status(&mut conn, week).unwrap();
    assert!(get_shopping_status(&mut conn, week).unwrap().is_empty());
    assert_eq!(get_shopping_status(&mut conn, next_week).unwrap().len(), 1);
}

#[test]
fn reset_history_keeps_pantry() {
    let mut conn = super::establish_in_memory();

    let egg = add_ingredient(&mut conn, "Egg", "Dairy").unwrap();
    let omelette = create_recipe(&mut conn, "Omelette", &[egg]).unwrap();
    let monday = date("2024-01-01");
    save_meal_plan_entry(&mut conn, monday, MealSlot::Breakfast, Some(omelette)).unwrap();
    set_shopping_status(&mut conn, monday, "Egg", true).unwrap();

    reset_historical_data(&mut conn).unwrap();

    assert!(get_plan_range(&mut conn, monday, monday).unwrap().is_empty());
    assert!(get_shopping_status(&mut conn, monday).unwrap().is_empty());
    assert_eq!(get_recipe_ingredients(&mut conn, omelette).unwrap(), ["Egg"]);
}
