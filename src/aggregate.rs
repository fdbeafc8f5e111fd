// Copyright 2023 Remi Bernotavicius

use crate::database::models::{PlannedMeal, RecipeId};
use crate::database::{self, query};
use chrono::Datelike as _;
use std::collections::{BTreeMap, HashMap};

/// The Monday of the week `date` falls in.
pub fn week_start(date: chrono::NaiveDate) -> chrono::NaiveDate {
    date - chrono::Days::new(date.weekday().num_days_from_monday().into())
}

/// A Monday-to-Sunday week. Always starts on a Monday no matter how it was built.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Week {
    start: chrono::NaiveDate,
}

impl Week {
    pub fn containing(date: chrono::NaiveDate) -> Self {
        Self {
            start: week_start(date),
        }
    }

    pub fn this_week() -> Self {
        Self::containing(chrono::Local::now().date_naive())
    }

    pub fn start(&self) -> chrono::NaiveDate {
        self.start
    }

    pub fn end(&self) -> chrono::NaiveDate {
        self.start + chrono::Days::new(6)
    }

    pub fn days(&self) -> impl Iterator<Item = chrono::NaiveDate> {
        self.start.iter_days().take(7)
    }

    pub fn next(&self) -> Self {
        Self::containing(self.start + chrono::Days::new(7))
    }

    pub fn previous(&self) -> Self {
        Self::containing(self.start - chrono::Days::new(7))
    }

    pub fn jump_to(&mut self, date: chrono::NaiveDate) {
        *self = Self::containing(date);
    }
}

/// Trims, collapses inner whitespace and title-cases an ingredient name, so "  red  onion" and
/// "Red Onion" land on the same shopping list line.
pub fn normalize_ingredient_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    for word in name.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        let mut previous_is_letter = false;
        for c in word.chars() {
            if c.is_alphabetic() {
                if previous_is_letter {
                    normalized.extend(c.to_lowercase());
                } else {
                    normalized.extend(c.to_uppercase());
                }
                previous_is_letter = true;
            } else {
                normalized.push(c);
                previous_is_letter = false;
            }
        }
    }
    normalized
}

/// Looks up the ingredients of every planned recipe and flattens them into one list. A recipe
/// planned twice contributes its ingredients twice.
pub fn expand_plan_to_ingredients(
    conn: &mut database::Connection,
    plan: &[PlannedMeal],
) -> database::Result<Vec<String>> {
    let mut recipe_ingredients: HashMap<RecipeId, Vec<String>> = HashMap::new();
    let mut names = vec![];
    for recipe_id in plan.iter().filter_map(|meal| meal.recipe_id) {
        if !recipe_ingredients.contains_key(&recipe_id) {
            let ingredients = query::get_recipe_ingredients(conn, recipe_id)?
                .iter()
                .map(|n| normalize_ingredient_name(n))
                .filter(|n| !n.is_empty())
                .collect();
            recipe_ingredients.insert(recipe_id, ingredients);
        }
        names.extend(recipe_ingredients[&recipe_id].iter().cloned());
    }
    Ok(names)
}

/// Counts how many times each name appears.
pub fn aggregate<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for name in names {
        *counts.entry(name.as_ref().to_owned()).or_default() += 1;
    }
    counts
}

#[cfg(test)]
fn date(s: &str) -> chrono::NaiveDate {
    s.parse().unwrap()
}

#[test]
fn week_start_is_monday_and_idempotent() {
    let mut d = date("2023-12-20");
    while d < date("2024-03-10") {
        let start = week_start(d);
        assert_eq!(start.weekday(), chrono::Weekday::Mon);
        assert_eq!(week_start(start), start);
        assert!(start <= d && d - start < chrono::TimeDelta::days(7));
        d = d.succ_opt().unwrap();
    }
    assert_eq!(week_start(date("2024-01-07")), date("2024-01-01"));
    assert_eq!(week_start(date("2024-01-01")), date("2024-01-01"));
}

#[test]
fn week_navigation() {
    let mut week = Week::containing(date("2024-01-03"));
    assert_eq!(week.start(), date("2024-01-01"));
    assert_eq!(week.end(), date("2024-01-07"));
    assert_eq!(week.days().count(), 7);
    assert_eq!(week.days().last(), Some(date("2024-01-07")));

    assert_eq!(week.next().start(), date("2024-01-08"));
    assert_eq!(week.previous().start(), date("2023-12-25"));

    week.jump_to(date("2024-02-29"));
    assert_eq!(week.start(), date("2024-02-26"));
}

#[test]
fn normalize_names() {
    assert_eq!(normalize_ingredient_name("  tomato "), "Tomato");
    assert_eq!(normalize_ingredient_name("RED   onion"), "Red Onion");
    assert_eq!(normalize_ingredient_name("crème fraîche"), "Crème Fraîche");
    assert_eq!(normalize_ingredient_name("o'neil's 2x-salt"), "O'Neil'S 2X-Salt");
    assert_eq!(normalize_ingredient_name("   "), "");
}

#[test]
fn aggregate_counts() {
    let names = ["Egg", "Cheese", "Onion", "Egg"];
    let counts = aggregate(names);
    assert_eq!(
        counts,
        maplit::btreemap! {
            "Cheese".to_owned() => 1,
            "Egg".to_owned() => 2,
            "Onion".to_owned() => 1,
        }
    );
    assert_eq!(counts.values().sum::<usize>(), names.len());
    assert!(aggregate(Vec::<String>::new()).is_empty());
}

#[test]
fn expand_week_plan() {
    use crate::database::models::MealSlot;

    let mut conn = database::establish_in_memory();
    let egg = query::add_ingredient(&mut conn, "egg", "Dairy").unwrap();
    let cheese = query::add_ingredient(&mut conn, "Cheese", "Dairy").unwrap();
    let onion = query::add_ingredient(&mut conn, "Onion", "Produce").unwrap();
    let omelette = query::create_recipe(&mut conn, "Omelette", &[egg, cheese]).unwrap();
    let soup = query::create_recipe(&mut conn, "Soup", &[onion, egg]).unwrap();
    let unused = query::create_recipe(&mut conn, "Unused", &[onion]).unwrap();

    let week = Week::containing(date("2024-01-01"));
    query::save_meal_plan_entry(&mut conn, date("2024-01-01"), MealSlot::Breakfast, Some(omelette))
        .unwrap();
    query::save_meal_plan_entry(&mut conn, date("2024-01-02"), MealSlot::Dinner, Some(soup))
        .unwrap();
    query::save_meal_plan_entry(&mut conn, date("2024-01-03"), MealSlot::Lunch, Some(unused))
        .unwrap();
    query::save_meal_plan_entry(&mut conn, date("2024-01-03"), MealSlot::Lunch, None).unwrap();
    query::save_meal_plan_entry(&mut conn, date("2024-01-08"), MealSlot::Lunch, Some(soup))
        .unwrap();

    let plan = query::get_plan_range(&mut conn, week.start(), week.end()).unwrap();
    let names = expand_plan_to_ingredients(&mut conn, &plan).unwrap();
    assert_eq!(names.len(), 4);

    assert_eq!(
        aggregate(&names),
        maplit::btreemap! {
            "Cheese".to_owned() => 1,
            "Egg".to_owned() => 2,
            "Onion".to_owned() => 1,
        }
    );
}
