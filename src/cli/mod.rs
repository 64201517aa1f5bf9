//! CLI command implementations

pub mod init;
pub mod level;
pub mod online;
pub mod repair;
pub mod seed;
pub mod serve;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use guildhall::Guildhall;
use guildhall::clock::SystemClock;
use guildhall::config::Config;
use guildhall::eligibility::ExplorerOracle;

/// Load the config (auto-creating the global one) and apply `--db`
pub fn load_config(config_path: Option<PathBuf>, db_path: Option<PathBuf>) -> Result<Config> {
    let mut config = match config_path {
        Some(path) => Config::from_file(&path)?,
        None => Config::load()?,
    };
    if let Some(db_path) = db_path {
        config.database.path = Some(db_path);
    }
    Ok(config)
}

/// Open the application with the live explorer and wall clock
pub fn open_app(config: Config) -> Result<Guildhall> {
    let oracle = Arc::new(ExplorerOracle::new(&config.eligibility));
    Guildhall::open(config, oracle, Arc::new(SystemClock))
}
