// Copyright 2023 Remi Bernotavicius

use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;

mod access;
mod aggregate;
mod config;
mod database;
mod maintenance;
mod pantry;
mod planner;
mod shopping;
mod ui;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;
type Result<T> = std::result::Result<T, Error>;

#[derive(Parser, Debug)]
struct Args {
    /// Directory holding the database. Defaults to the user's data directory.
    #[arg(long, env = "MEAL_PLANNER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Key that unlocks editing.
    #[arg(long, env = "MEAL_PLANNER_EDITOR_KEY", hide_env_values = true)]
    editor_key: Option<String>,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Open the planner window.
    Run,
    /// Write a copy of the database to the given path.
    Backup { path: PathBuf },
    /// Write the database as name-based SQL insert statements.
    ExportSql { path: PathBuf },
    /// Delete every planned meal and shopping checkbox. Needs the editor key.
    ResetHistory {
        #[arg(long)]
        key: String,
    },
}

fn run(conn: database::Connection, config: config::Config) -> Result<()> {
    let native_options = eframe::NativeOptions {
        window_builder: Some(Box::new(|mut b: egui::viewport::ViewportBuilder| {
            b.maximized = Some(true);
            b
        })),
        ..Default::default()
    };
    eframe::run_native(
        "Meal Planner",
        native_options,
        Box::new(|_cc| Ok(Box::new(ui::MealPlanner::new(conn, config)))),
    )
    .map_err(|e| e.to_string())?;

    Ok(())
}

fn main() -> Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .env()
        .init()?;

    let args = Args::parse();
    let config = config::Config::new(args.data_dir, args.editor_key)?;
    let mut conn = database::establish_connection(config.database_path())?;
    match args.commands {
        Commands::Run => run(conn, config)?,
        Commands::Backup { path } => maintenance::backup(&mut conn, path)?,
        Commands::ExportSql { path } => maintenance::export_sql_to_path(&mut conn, path)?,
        Commands::ResetHistory { key } => {
            let capability = access::Capability::authorize(config.editor_key.as_deref(), &key);
            let Some(editor) = capability.editor() else {
                return Err("editor key doesn't match".into());
            };
            maintenance::reset_history(&mut conn, editor)?;
        }
    }
    Ok(())
}
