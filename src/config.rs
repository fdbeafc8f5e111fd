// Copyright 2023 Remi Bernotavicius

use std::path::PathBuf;

const DATABASE_FILE_NAME: &str = "planner.sqlite";

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub editor_key: Option<String>,
}

/// This is where the database and other user-data lives on-disk. On Linux it should be like:
/// `~/.local/share/meal_planner/`
fn default_data_dir() -> crate::Result<PathBuf> {
    let dirs = directories::BaseDirs::new().ok_or("failed to get user home directory")?;
    Ok(dirs.data_dir().join("meal_planner"))
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>, editor_key: Option<String>) -> crate::Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        std::fs::create_dir_all(&data_dir)?;
        let editor_key = editor_key.filter(|k| !k.is_empty());
        if editor_key.is_none() {
            log::warn!("no editor key configured, everything will be read-only");
        }
        Ok(Self {
            data_dir,
            editor_key,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE_NAME)
    }
}

#[test]
fn explicit_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("nested").join("planner");

    let config = Config::new(Some(data_dir.clone()), Some(String::new())).unwrap();
    assert!(data_dir.is_dir());
    assert_eq!(config.database_path(), data_dir.join("planner.sqlite"));
    assert_eq!(config.editor_key, None);
}
