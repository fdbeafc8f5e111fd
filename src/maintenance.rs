// Copyright 2023 Remi Bernotavicius

use crate::access::EditorCapability;
#[cfg(test)]
use crate::database::models::MealSlot;
use crate::database::{self, query};
use crate::Result;
use diesel::ExpressionMethods as _;
use diesel::QueryDsl as _;
use diesel::RunQueryDsl as _;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

#[derive(diesel::QueryableByName)]
struct DatabaseFile {
    #[diesel(sql_type = diesel::sql_types::Text)]
    name: String,
    #[diesel(sql_type = diesel::sql_types::Text)]
    file: String,
}

/// The file backing the connection's main database, `None` when it lives in memory.
fn live_database_file(conn: &mut database::Connection) -> Result<Option<PathBuf>> {
    let files: Vec<DatabaseFile> = diesel::sql_query("PRAGMA database_list").load(conn)?;
    Ok(files
        .into_iter()
        .find(|f| f.name == "main" && !f.file.is_empty())
        .map(|f| PathBuf::from(f.file)))
}

/// Resolves `path` even when the file itself doesn't exist yet.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(resolved) = path.canonicalize() {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(file_name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            match parent.canonicalize() {
                Ok(parent) => parent.join(file_name),
                Err(_) => path.to_owned(),
            }
        }
        _ => path.to_owned(),
    }
}

/// Writes a consistent copy of the whole database to `path`, replacing any file already there.
/// The copy is written next to `path` first, so a failed backup leaves the old file alone.
pub fn backup(conn: &mut database::Connection, path: impl AsRef<Path>) -> Result<()> {
    use diesel::sql_types::Text;

    let path = path.as_ref();
    if let Some(live) = live_database_file(conn)? {
        if resolve(&live) == resolve(path) {
            return Err(format!(
                "{} is the database in use, pick another file for the backup",
                path.display()
            )
            .into());
        }
    }

    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);
    if partial.exists() {
        std::fs::remove_file(&partial)?;
    }
    let written = diesel::sql_query("VACUUM INTO ?")
        .bind::<Text, _>(partial.to_string_lossy().into_owned())
        .execute(conn);
    if let Err(error) = written {
        let _ = std::fs::remove_file(&partial);
        return Err(error.into());
    }
    std::fs::rename(&partial, path)?;
    log::info!("backed up database to {}", path.display());
    Ok(())
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn sql_bool(b: bool) -> &'static str {
    if b {
        "TRUE"
    } else {
        "FALSE"
    }
}

/// Dumps every row as insert statements that find recipes and ingredients by name instead of by
/// id, so the script can be replayed into a database whose ids differ. Rows already present in
/// the target are left alone.
pub fn export_sql(conn: &mut database::Connection) -> Result<String> {
    use database::schema::{ingredients, meal_plan, recipe_ingredients, recipes, shopping_status};

    let mut sql = String::new();
    writeln!(sql, "-- Meal planner export")?;

    writeln!(sql, "\n-- Ingredients")?;
    let all_ingredients: Vec<(String, String)> = ingredients::table
        .select((ingredients::name, ingredients::category))
        .order_by(ingredients::name.asc())
        .load(conn)?;
    for (name, category) in all_ingredients {
        writeln!(
            sql,
            "INSERT INTO ingredients (name, category) VALUES ({}, {}) \
            ON CONFLICT (name) DO NOTHING;",
            quote(&name),
            quote(&category)
        )?;
    }

    writeln!(sql, "\n-- Recipes")?;
    let all_recipes: Vec<(String, bool)> = recipes::table
        .select((recipes::name, recipes::is_system))
        .order_by(recipes::name.asc())
        .load(conn)?;
    for (name, is_system) in all_recipes {
        writeln!(
            sql,
            "INSERT INTO recipes (name, is_system) VALUES ({}, {}) \
            ON CONFLICT (name) DO NOTHING;",
            quote(&name),
            sql_bool(is_system)
        )?;
    }

    writeln!(sql, "\n-- Recipe ingredients")?;
    let pairs: Vec<(String, String)> = recipe_ingredients::table
        .inner_join(recipes::table)
        .inner_join(ingredients::table)
        .select((recipes::name, ingredients::name))
        .order_by((recipes::name.asc(), ingredients::name.asc()))
        .load(conn)?;
    for (recipe, ingredient) in pairs {
        writeln!(
            sql,
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id) \
            SELECT r.id, i.id FROM recipes r, ingredients i \
            WHERE r.name = {} AND i.name = {} ON CONFLICT DO NOTHING;",
            quote(&recipe),
            quote(&ingredient)
        )?;
    }

    writeln!(sql, "\n-- Meal plan")?;
    // Slots are copied as the text they are stored as.
    let planned: Vec<(chrono::NaiveDate, String, String)> = meal_plan::table
        .inner_join(recipes::table)
        .select((
            meal_plan::day,
            diesel::dsl::sql::<diesel::sql_types::Text>("meal_plan.slot"),
            recipes::name,
        ))
        .order_by(meal_plan::day.asc())
        .load(conn)?;
    for (day, slot, recipe) in planned {
        writeln!(
            sql,
            "INSERT INTO meal_plan (day, slot, recipe_id) \
            SELECT {}, {}, id FROM recipes WHERE name = {} \
            ON CONFLICT (day, slot) DO NOTHING;",
            quote(&day.to_string()),
            quote(&slot),
            quote(&recipe)
        )?;
    }

    writeln!(sql, "\n-- Shopping list")?;
    let statuses: Vec<(chrono::NaiveDate, String, bool)> = shopping_status::table
        .select((
            shopping_status::week_start,
            shopping_status::ingredient_name,
            shopping_status::checked,
        ))
        .order_by((
            shopping_status::week_start.asc(),
            shopping_status::ingredient_name.asc(),
        ))
        .load(conn)?;
    for (week_start, ingredient, checked) in statuses {
        writeln!(
            sql,
            "INSERT INTO shopping_status (week_start, ingredient_name, checked) \
            VALUES ({}, {}, {}) ON CONFLICT (week_start, ingredient_name) DO NOTHING;",
            quote(&week_start.to_string()),
            quote(&ingredient),
            sql_bool(checked)
        )?;
    }

    Ok(sql)
}

pub fn export_sql_to_path(conn: &mut database::Connection, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    std::fs::write(path, export_sql(conn)?)?;
    log::info!("exported database as SQL to {}", path.display());
    Ok(())
}

/// Forgets every planned meal and every shopping checkbox.
pub fn reset_history(
    conn: &mut database::Connection,
    _editor: &EditorCapability,
) -> database::Result<()> {
    query::reset_historical_data(conn)
}

#[cfg(test)]
fn populate(conn: &mut database::Connection) {
    let monday: chrono::NaiveDate = "2024-01-01".parse().unwrap();
    let egg = query::add_ingredient(conn, "Egg", "Dairy").unwrap();
    let flour = query::add_ingredient(conn, "Baker's Flour", "Pantry").unwrap();
    let pie = query::create_recipe(conn, "Grandma's Pie", &[egg, flour]).unwrap();
    let shopping = query::ensure_special_recipe(conn, "Shopping").unwrap();
    query::update_recipe(conn, shopping, "Shopping", &[flour]).unwrap();
    query::save_meal_plan_entry(conn, monday, MealSlot::MidAfternoon, Some(pie)).unwrap();
    query::save_meal_plan_entry(conn, monday, MealSlot::Dinner, None).unwrap();
    query::set_shopping_status(conn, monday, "Egg", true).unwrap();
}

#[test]
fn export_replays_into_empty_database() {
    use diesel::connection::SimpleConnection as _;

    let mut source = database::establish_in_memory();
    populate(&mut source);
    let sql = export_sql(&mut source).unwrap();

    let mut target = database::establish_in_memory();
    let unrelated = query::add_ingredient(&mut target, "Aaa", "Other").unwrap();
    query::delete_ingredient(&mut target, unrelated).unwrap();
    target.batch_execute(&sql).unwrap();
    // replaying twice changes nothing
    target.batch_execute(&sql).unwrap();

    assert_eq!(
        query::list_ingredients(&mut target)
            .unwrap()
            .into_iter()
            .map(|i| (i.name, i.category))
            .collect::<Vec<_>>(),
        [
            ("Baker's Flour".to_owned(), "Pantry".to_owned()),
            ("Egg".to_owned(), "Dairy".to_owned())
        ]
    );

    let recipes = query::list_recipes(&mut target).unwrap();
    let pie = recipes.iter().find(|r| r.name == "Grandma's Pie").unwrap();
    assert_eq!(
        query::get_recipe_ingredients(&mut target, pie.id).unwrap(),
        ["Baker's Flour", "Egg"]
    );
    let shopping = query::system_recipe(&mut target).unwrap().unwrap();
    assert_eq!(shopping.name, "Shopping");
    assert_eq!(
        query::get_recipe_ingredients(&mut target, shopping.id).unwrap(),
        ["Baker's Flour"]
    );

    let monday: chrono::NaiveDate = "2024-01-01".parse().unwrap();
    let plan = query::get_plan_range(&mut target, monday, monday).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(plan[0].slot, MealSlot::MidAfternoon);
    assert_eq!(plan[0].recipe_name.as_deref(), Some("Grandma's Pie"));

    assert_eq!(
        query::get_shopping_status(&mut target, monday).unwrap(),
        maplit::hashmap! {"Egg".to_owned() => true}
    );
}

#[test]
fn backup_and_export_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut conn = database::establish_in_memory();
    populate(&mut conn);

    let backup_path = dir.path().join("backup.sqlite");
    std::fs::write(&backup_path, b"stale").unwrap();
    backup(&mut conn, &backup_path).unwrap();

    assert!(!dir.path().join("backup.sqlite.partial").exists());

    let mut restored = database::establish_connection(&backup_path).unwrap();
    assert_eq!(query::list_ingredients(&mut restored).unwrap().len(), 2);
    assert_eq!(query::list_recipes(&mut restored).unwrap().len(), 2);

    let sql_path = dir.path().join("export.sql");
    export_sql_to_path(&mut conn, &sql_path).unwrap();
    let sql = std::fs::read_to_string(&sql_path).unwrap();
    assert!(sql.contains("VALUES ('Grandma''s Pie', FALSE)"), "{sql}");
    assert!(sql.contains("'mid_afternoon'"), "{sql}");
}

#[test]
fn reset_history_requires_editor() {
    let editor = crate::access::test_editor();
    let mut conn = database::establish_in_memory();
    populate(&mut conn);

    reset_history(&mut conn, &editor).unwrap();
    let monday: chrono::NaiveDate = "2024-01-01".parse().unwrap();
    assert!(query::get_plan_range(&mut conn, monday, monday)
        .unwrap()
        .is_empty());
    assert_eq!(query::list_recipes(&mut conn).unwrap().len(), 2);
}

#[test]
fn backup_refuses_live_database() {
    let dir = tempfile::tempdir().unwrap();
    let live = dir.path().join("planner.sqlite");
    let mut conn = database::establish_connection(&live).unwrap();
    query::add_ingredient(&mut conn, "Egg", "Dairy").unwrap();

    assert!(backup(&mut conn, &live).is_err());
    assert!(backup(&mut conn, dir.path().join(".").join("planner.sqlite")).is_err());

    // the open database is untouched and still writable
    query::add_ingredient(&mut conn, "Onion", "Produce").unwrap();
    assert_eq!(query::list_ingredients(&mut conn).unwrap().len(), 2);

    backup(&mut conn, dir.path().join("copy.sqlite")).unwrap();
    query::add_ingredient(&mut conn, "Cheese", "Dairy").unwrap();
}

#[test]
fn every_slot_survives_export() {
    use diesel::connection::SimpleConnection as _;

    let monday: chrono::NaiveDate = "2024-01-01".parse().unwrap();
    let mut source = database::establish_in_memory();
    let soup = query::create_recipe(&mut source, "Soup", &[]).unwrap();
    for slot in MealSlot::iter() {
        query::save_meal_plan_entry(&mut source, monday, slot, Some(soup)).unwrap();
    }

    let mut target = database::establish_in_memory();
    target
        .batch_execute(&export_sql(&mut source).unwrap())
        .unwrap();
    let slots: Vec<MealSlot> = query::get_plan_range(&mut target, monday, monday)
        .unwrap()
        .into_iter()
        .map(|meal| meal.slot)
        .collect();
    assert_eq!(slots, MealSlot::iter().collect::<Vec<_>>());
}
