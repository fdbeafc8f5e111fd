// Copyright 2023 Remi Bernotavicius

use diesel::prelude::Connection as _;
use diesel::RunQueryDsl as _;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::Path;

pub mod models;
pub mod query;
pub mod schema;

pub type Connection = diesel::sqlite::SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{kind} named {name:?} already exists")]
    AlreadyExists { kind: &'static str, name: String },
    #[error("the {0:?} recipe can't be renamed or deleted")]
    SystemRecipe(String),
    #[error("name can't be empty")]
    EmptyName,
    #[error("couldn't find the requested row")]
    NotFound,
    #[error("database error: {0}")]
    Storage(#[from] diesel::result::Error),
    #[error("couldn't open database: {0}")]
    Connection(#[from] diesel::ConnectionError),
    #[error("couldn't migrate database: {0}")]
    Migration(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl Error {
    /// Turns a uniqueness violation on `name` into [`Error::AlreadyExists`], leaving every other
    /// error as a storage failure.
    pub(crate) fn on_unique(
        kind: &'static str,
        name: &str,
    ) -> impl FnOnce(diesel::result::Error) -> Self {
        let name = name.to_owned();
        move |error| match error {
            diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                _,
            ) => Self::AlreadyExists { kind, name },
            other => Self::Storage(other),
        }
    }

    #[cfg(test)]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

fn prepare(mut connection: Connection) -> Result<Connection> {
    connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(Error::Migration)?;
    diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut connection)?;
    Ok(connection)
}

pub fn establish_connection(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    log::info!("opening database at {}", path.display());
    let connection = Connection::establish(&path.to_string_lossy())?;
    prepare(connection)
}

#[cfg(test)]
pub fn establish_in_memory() -> Connection {
    prepare(Connection::establish(":memory:").unwrap()).unwrap()
}

#[test]
fn migrations_apply_and_revert() {
    let mut conn = establish_in_memory();
    conn.revert_all_migrations(MIGRATIONS).unwrap();
    conn.run_pending_migrations(MIGRATIONS).unwrap();
}

#[test]
fn foreign_keys_enabled() {
    use diesel::sql_types::Integer;

    #[derive(diesel::QueryableByName)]
    struct Pragma {
        #[diesel(sql_type = Integer)]
        foreign_keys: i32,
    }

    let mut conn = establish_in_memory();
    let pragma: Pragma = diesel::sql_query("PRAGMA foreign_keys")
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(pragma.foreign_keys, 1);
}
