// Copyright 2023 Remi Bernotavicius

use crate::access::EditorCapability;
use crate::aggregate::Week;
use crate::database::models::{MealSlot, RecipeHandle, RecipeId};
use crate::database::{self, query};
use diesel::prelude::Connection as _;
use std::collections::HashMap;

/// The recipes planned for each day and slot of one week.
pub struct WeekGrid {
    week: Week,
    cells: HashMap<(chrono::NaiveDate, MealSlot), RecipeHandle>,
}

impl WeekGrid {
    pub fn week(&self) -> Week {
        self.week
    }

    pub fn get(&self, day: chrono::NaiveDate, slot: MealSlot) -> Option<&RecipeHandle> {
        self.cells.get(&(day, slot))
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

pub fn load_week(conn: &mut database::Connection, week: Week) -> database::Result<WeekGrid> {
    let cells = query::get_plan_range(conn, week.start(), week.end())?
        .into_iter()
        .filter_map(|meal| Some(((meal.day, meal.slot), meal.recipe()?)))
        .collect();
    Ok(WeekGrid { week, cells })
}

/// Saves the choice for one cell straight away. `None` empties the cell.
pub fn assign(
    conn: &mut database::Connection,
    _editor: &EditorCapability,
    day: chrono::NaiveDate,
    slot: MealSlot,
    recipe: Option<RecipeId>,
) -> database::Result<()> {
    log::debug!("planning {recipe:?} for {slot} on {day}");
    query::save_meal_plan_entry(conn, day, slot, recipe)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied(usize),
    TargetNotEmpty,
    NothingToCopy,
}

impl CopyOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Copied(1) => "Copied 1 meal to next week".into(),
            Self::Copied(n) => format!("Copied {n} meals to next week"),
            Self::TargetNotEmpty => {
                "Next week already has meals planned, nothing was copied. \
                Clear next week first to copy this one over it."
                    .into()
            }
            Self::NothingToCopy => "There is nothing planned this week to copy".into(),
        }
    }
}

/// Copies every planned meal of `week` exactly seven days forward, but only when the following
/// week has nothing planned yet. Either every meal is copied or none is.
pub fn copy_week_forward(
    conn: &mut database::Connection,
    _editor: &EditorCapability,
    week: Week,
) -> database::Result<CopyOutcome> {
    conn.transaction::<_, database::Error, _>(|conn| {
        let target = week.next();
        let target_planned = query::get_plan_range(conn, target.start(), target.end())?
            .iter()
            .any(|meal| meal.recipe_id.is_some());
        if target_planned {
            log::info!("not copying week of {}, target week is not empty", week.start());
            return Ok(CopyOutcome::TargetNotEmpty);
        }

        let mut copied = 0;
        for meal in query::get_plan_range(conn, week.start(), week.end())? {
            if let Some(recipe) = meal.recipe_id {
                let day = meal.day + chrono::Days::new(7);
                query::save_meal_plan_entry(conn, day, meal.slot, Some(recipe))?;
                copied += 1;
            }
        }

        if copied == 0 {
            Ok(CopyOutcome::NothingToCopy)
        } else {
            log::info!("copied {copied} meals from week of {}", week.start());
            Ok(CopyOutcome::Copied(copied))
        }
    })
}

#[cfg(test)]
fn date(s: &str) -> chrono::NaiveDate {
    s.parse().unwrap()
}

#[test]
fn assign_and_load() {
    let editor = crate::access::test_editor();
    let mut conn = database::establish_in_memory();
    let soup = query::create_recipe(&mut conn, "Soup", &[]).unwrap();
    let week = Week::containing(date("2024-01-03"));

    assign(&mut conn, &editor, date("2024-01-02"), MealSlot::Dinner, Some(soup)).unwrap();
    assign(&mut conn, &editor, date("2024-01-04"), MealSlot::Lunch, Some(soup)).unwrap();
    assign(&mut conn, &editor, date("2024-01-04"), MealSlot::Lunch, None).unwrap();

    let grid = load_week(&mut conn, week).unwrap();
    assert_eq!(grid.week(), week);
    assert_eq!(grid.len(), 1);
    assert_eq!(
        grid.get(date("2024-01-02"), MealSlot::Dinner)
            .map(|r| r.name.as_str()),
        Some("Soup")
    );
    assert!(grid.get(date("2024-01-04"), MealSlot::Lunch).is_none());
}

#[test]
fn copy_week_forward_into_empty_week() {
    let editor = crate::access::test_editor();
    let mut conn = database::establish_in_memory();
    let omelette = query::create_recipe(&mut conn, "Omelette", &[]).unwrap();
    let soup = query::create_recipe(&mut conn, "Soup", &[]).unwrap();
    let week = Week::containing(date("2024-01-01"));

    assign(&mut conn, &editor, date("2024-01-01"), MealSlot::Breakfast, Some(omelette)).unwrap();
    assign(&mut conn, &editor, date("2024-01-07"), MealSlot::Dinner, Some(soup)).unwrap();
    assign(&mut conn, &editor, date("2024-01-03"), MealSlot::Lunch, None).unwrap();

    let outcome = copy_week_forward(&mut conn, &editor, week).unwrap();
    assert_eq!(outcome, CopyOutcome::Copied(2));

    let next = load_week(&mut conn, week.next()).unwrap();
    assert_eq!(next.len(), 2);
    assert_eq!(
        next.get(date("2024-01-08"), MealSlot::Breakfast)
            .map(|r| r.id),
        Some(omelette)
    );
    assert_eq!(
        next.get(date("2024-01-14"), MealSlot::Dinner).map(|r| r.id),
        Some(soup)
    );
}

#[test]
fn copy_week_forward_refuses_non_empty_target() {
    let editor = crate::access::test_editor();
    let mut conn = database::establish_in_memory();
    let omelette = query::create_recipe(&mut conn, "Omelette", &[]).unwrap();
    let soup = query::create_recipe(&mut conn, "Soup", &[]).unwrap();
    let week = Week::containing(date("2024-01-01"));

    assign(&mut conn, &editor, date("2024-01-01"), MealSlot::Breakfast, Some(omelette)).unwrap();
    assign(&mut conn, &editor, date("2024-01-02"), MealSlot::Lunch, Some(omelette)).unwrap();
    assign(&mut conn, &editor, date("2024-01-09"), MealSlot::Dinner, Some(soup)).unwrap();

    let before = query::get_plan_range(&mut conn, date("2024-01-08"), date("2024-01-14")).unwrap();
    let outcome = copy_week_forward(&mut conn, &editor, week).unwrap();
    assert_eq!(outcome, CopyOutcome::TargetNotEmpty);
    let after = query::get_plan_range(&mut conn, date("2024-01-08"), date("2024-01-14")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn copy_empty_week() {
    let editor = crate::access::test_editor();
    let mut conn = database::establish_in_memory();
    let week = Week::containing(date("2024-01-01"));

    assert_eq!(
        copy_week_forward(&mut conn, &editor, week).unwrap(),
        CopyOutcome::NothingToCopy
    );
    assert!(load_week(&mut conn, week.next()).unwrap().is_empty());
}

#[test]
fn copy_over_emptied_cells() {
    let editor = crate::access::test_editor();
    let mut conn = database::establish_in_memory();
    let soup = query::create_recipe(&mut conn, "Soup", &[]).unwrap();
    let week = Week::containing(date("2024-01-01"));

    assign(&mut conn, &editor, date("2024-01-01"), MealSlot::Dinner, Some(soup)).unwrap();
    assign(&mut conn, &editor, date("2024-01-08"), MealSlot::Dinner, None).unwrap();

    assert_eq!(
        copy_week_forward(&mut conn, &editor, week).unwrap(),
        CopyOutcome::Copied(1)
    );
    let next = load_week(&mut conn, week.next()).unwrap();
    assert_eq!(
        next.get(date("2024-01-08"), MealSlot::Dinner).map(|r| r.id),
        Some(soup)
    );
}
