// Copyright 2023 Remi Bernotavicius

use crate::access::EditorCapability;
use crate::aggregate::{self, Week};
use crate::database::models::{IngredientCategory, MealSlot, PlannedMeal};
use crate::database::{self, query};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingItem {
    pub name: String,
    pub count: usize,
    pub checked: bool,
}

impl ShoppingItem {
    pub fn label(&self) -> String {
        format!("{} (x{})", self.name, self.count)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Progress {
    pub checked: usize,
    pub total: usize,
}

impl Progress {
    pub fn fraction(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.checked as f32 / self.total as f32
        }
    }
}

/// The aggregated shopping list for one week, grouped by category. Both the categories and the
/// items inside each category are in alphabetical order.
#[derive(Debug, Clone)]
pub struct ShoppingList {
    week: Week,
    categories: BTreeMap<String, Vec<ShoppingItem>>,
}

/// Keys each ingredient's category by the name it shows up under on the list. When several
/// stored names land on the same line, the one already spelled that way wins, then the first in
/// sorted order.
fn categories_by_list_name(stored: HashMap<String, String>) -> HashMap<String, String> {
    let mut stored: Vec<_> = stored.into_iter().collect();
    stored.sort();

    let mut categories = HashMap::new();
    for (name, category) in stored {
        let list_name = aggregate::normalize_ingredient_name(&name);
        let exact = list_name == name;
        if exact || !categories.contains_key(&list_name) {
            categories.insert(list_name, category);
        }
    }
    categories
}

impl ShoppingList {
    pub fn build(conn: &mut database::Connection, week: Week) -> database::Result<Self> {
        let mut plan = query::get_plan_range(conn, week.start(), week.end())?;

        // The system recipe's items go on every week's list, once.
        if let Some(standing) = query::system_recipe(conn)? {
            if !plan.iter().any(|m| m.recipe_id == Some(standing.id)) {
                plan.push(PlannedMeal {
                    day: week.start(),
                    slot: MealSlot::GeneralShopping,
                    recipe_id: Some(standing.id),
                    recipe_name: Some(standing.name),
                });
            }
        }

        let names = aggregate::expand_plan_to_ingredients(conn, &plan)?;
        let counts = aggregate::aggregate(&names);

        let ingredient_categories = categories_by_list_name(query::ingredient_categories(conn)?);
        let status = query::get_shopping_status(conn, week.start())?;

        let mut categories: BTreeMap<String, Vec<ShoppingItem>> = BTreeMap::new();
        for (name, count) in counts {
            let category = ingredient_categories
                .get(&name)
                .map(|c| c.trim())
                .filter(|c| !c.is_empty())
                .map(String::from)
                .unwrap_or_else(|| IngredientCategory::Other.to_string());
            categories.entry(category).or_default().push(ShoppingItem {
                checked: status.get(&name).copied().unwrap_or(false),
                name,
                count,
            });
        }

        Ok(Self { week, categories })
    }

    pub fn week(&self) -> Week {
        self.week
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &[ShoppingItem])> {
        self.categories
            .iter()
            .map(|(category, items)| (category.as_str(), items.as_slice()))
    }

    pub fn items(&self) -> impl Iterator<Item = &ShoppingItem> {
        self.categories.values().flatten()
    }

    #[cfg(test)]
    pub fn item(&self, name: &str) -> Option<&ShoppingItem> {
        self.items().find(|i| i.name == name)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            checked: self.items().filter(|i| i.checked).count(),
            total: self.items().count(),
        }
    }

    /// Checks or unchecks one line, writing it to the database before updating the list.
    pub fn set_checked(
        &mut self,
        conn: &mut database::Connection,
        editor: &EditorCapability,
        name: &str,
        checked: bool,
    ) -> database::Result<()> {
        set_checked(conn, editor, self.week, name, checked)?;
        for item in self.categories.values_mut().flatten() {
            if item.name == name {
                item.checked = checked;
            }
        }
        Ok(())
    }

    pub fn clear(
        &mut self,
        conn: &mut database::Connection,
        editor: &EditorCapability,
    ) -> database::Result<()> {
        clear_week(conn, editor, self.week)?;
        for item in self.categories.values_mut().flatten() {
            item.checked = false;
        }
        Ok(())
    }
}

pub fn set_checked(
    conn: &mut database::Connection,
    _editor: &EditorCapability,
    week: Week,
    name: &str,
    checked: bool,
) -> database::Result<()> {
    query::set_shopping_status(conn, week.start(), name, checked)
}

/// Unchecks everything on the given week's list.
pub fn clear_week(
    conn: &mut database::Connection,
    _editor: &EditorCapability,
    week: Week,
) -> database::Result<()> {
    log::info!("clearing shopping list for week of {}", week.start());
    query::clear_shopping_status(conn, week.start())
}

#[cfg(test)]
fn date(s: &str) -> chrono::NaiveDate {
    s.parse().unwrap()
}

#[cfg(test)]
fn plan_omelette_and_soup(conn: &mut database::Connection) -> Week {
    let egg = query::add_ingredient(conn, "Egg", "Dairy").unwrap();
    let cheese = query::add_ingredient(conn, "Cheese", "Dairy").unwrap();
    let onion = query::add_ingredient(conn, "Onion", "Produce").unwrap();
    let omelette = query::create_recipe(conn, "Omelette", &[egg, cheese]).unwrap();
    let soup = query::create_recipe(conn, "Soup", &[onion, egg]).unwrap();

    query::save_meal_plan_entry(conn, date("2024-01-01"), MealSlot::Breakfast, Some(omelette))
        .unwrap();
    query::save_meal_plan_entry(conn, date("2024-01-02"), MealSlot::Dinner, Some(soup)).unwrap();
    Week::containing(date("2024-01-01"))
}

#[cfg(test)]
fn summary(list: &ShoppingList) -> Vec<(String, Vec<(String, usize, bool)>)> {
    list.categories()
        .map(|(category, items)| {
            (
                category.to_owned(),
                items
                    .iter()
                    .map(|i| (i.name.clone(), i.count, i.checked))
                    .collect(),
            )
        })
        .collect()
}

#[test]
fn omelette_and_soup_week() {
    let editor = crate::access::test_editor();
    let mut conn = database::establish_in_memory();
    let week = plan_omelette_and_soup(&mut conn);

    let mut list = ShoppingList::build(&mut conn, week).unwrap();
    assert_eq!(
        summary(&list),
        [
            (
                "Dairy".to_owned(),
                vec![("Cheese".to_owned(), 1, false), ("Egg".to_owned(), 2, false)]
            ),
            ("Produce".to_owned(), vec![("Onion".to_owned(), 1, false)]),
        ]
    );
    assert_eq!(list.progress(), Progress { checked: 0, total: 3 });

    list.set_checked(&mut conn, &editor, "Egg", true).unwrap();
    assert_eq!(list.progress(), Progress { checked: 1, total: 3 });

    let reloaded = ShoppingList::build(&mut conn, week).unwrap();
    assert!(reloaded.item("Egg").unwrap().checked);
    assert!(!reloaded.item("Onion").unwrap().checked);
    assert_eq!(reloaded.progress(), Progress { checked: 1, total: 3 });
    assert_eq!(reloaded.item("Egg").unwrap().label(), "Egg (x2)");
}

#[test]
fn checked_state_is_per_week() {
    let editor = crate::access::test_editor();
    let mut conn = database::establish_in_memory();
    let week = plan_omelette_and_soup(&mut conn);

    set_checked(&mut conn, &editor, week.next(), "Egg", true).unwrap();
    set_checked(&mut conn, &editor, week, "Flour", true).unwrap();

    let list = ShoppingList::build(&mut conn, week).unwrap();
    assert_eq!(list.progress(), Progress { checked: 0, total: 3 });
}

#[test]
fn clear_week_unchecks_everything() {
    let editor = crate::access::test_editor();
    let mut conn = database::establish_in_memory();
    let week = plan_omelette_and_soup(&mut conn);

    let mut list = ShoppingList::build(&mut conn, week).unwrap();
    list.set_checked(&mut conn, &editor, "Egg", true).unwrap();
    list.set_checked(&mut conn, &editor, "Onion", true).unwrap();
    list.clear(&mut conn, &editor).unwrap();
    assert_eq!(list.progress().checked, 0);

    let reloaded = ShoppingList::build(&mut conn, week).unwrap();
    assert_eq!(reloaded.progress(), Progress { checked: 0, total: 3 });
    assert!(query::get_shopping_status(&mut conn, week.start())
        .unwrap()
        .is_empty());
}

#[test]
fn empty_week() {
    let mut conn = database::establish_in_memory();
    let list = ShoppingList::build(&mut conn, Week::containing(date("2024-01-01"))).unwrap();

    assert!(list.is_empty());
    assert_eq!(list.progress(), Progress { checked: 0, total: 0 });
    assert_eq!(list.progress().fraction(), 0.0);
}

#[test]
fn standing_items_added_once() {
    let mut conn = database::establish_in_memory();
    let week = plan_omelette_and_soup(&mut conn);

    let soap = query::add_ingredient(&mut conn, "soap", "").unwrap();
    let egg = query::list_ingredients(&mut conn)
        .unwrap()
        .into_iter()
        .find(|i| i.name == "Egg")
        .unwrap()
        .id;
    let shopping = query::ensure_special_recipe(&mut conn, "Shopping").unwrap();
    query::update_recipe(&mut conn, shopping, "Shopping", &[soap, egg]).unwrap();

    let list = ShoppingList::build(&mut conn, week).unwrap();
    assert_eq!(list.item("Soap").unwrap().count, 1);
    assert_eq!(list.item("Egg").unwrap().count, 3);
    assert_eq!(
        list.categories().map(|(c, _)| c).collect::<Vec<_>>(),
        ["Dairy", "Other", "Produce"]
    );

    query::save_meal_plan_entry(
        &mut conn,
        date("2024-01-05"),
        MealSlot::GeneralShopping,
        Some(shopping),
    )
    .unwrap();
    let list = ShoppingList::build(&mut conn, week).unwrap();
    assert_eq!(list.item("Soap").unwrap().count, 1);

    let other_week = ShoppingList::build(&mut conn, week.previous()).unwrap();
    assert_eq!(other_week.progress().total, 2);
}

#[test]
fn categories_follow_stored_names() {
    let mut conn = database::establish_in_memory();
    let egg = query::add_ingredient(&mut conn, "egg", "Dairy").unwrap();
    let lower = query::add_ingredient(&mut conn, "tomato", "Produce").unwrap();
    let upper = query::add_ingredient(&mut conn, "Tomato", "Other").unwrap();
    let salad = query::create_recipe(&mut conn, "Salad", &[egg, lower, upper]).unwrap();
    query::save_meal_plan_entry(&mut conn, date("2024-01-01"), MealSlot::Lunch, Some(salad))
        .unwrap();

    let list = ShoppingList::build(&mut conn, Week::containing(date("2024-01-01"))).unwrap();
    assert_eq!(
        summary(&list),
        [
            ("Dairy".to_owned(), vec![("Egg".to_owned(), 1, false)]),
            ("Other".to_owned(), vec![("Tomato".to_owned(), 2, false)]),
        ]
    );
}

#[test]
fn category_tie_break_ignores_row_order() {
    let forward = categories_by_list_name(maplit::hashmap! {
        "oNION".to_owned() => "Pantry".to_owned(),
        "onion".to_owned() => "Produce".to_owned(),
    });
    assert_eq!(forward["Onion"], "Pantry");

    let with_exact = categories_by_list_name(maplit::hashmap! {
        "Zucchini".to_owned() => "Produce".to_owned(),
        "ZUCCHINI".to_owned() => "Frozen".to_owned(),
        "zucchini".to_owned() => "Other".to_owned(),
    });
    assert_eq!(with_exact["Zucchini"], "Produce");
}
