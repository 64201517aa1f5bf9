//! Seed command implementation

use anyhow::Result;
use std::path::Path;

use guildhall::config::Config;
use guildhall::rewards::SeedFile;

/// Load rewards and collectables from a TOML file, skipping names that exist
pub async fn seed_command(config: Config, file: &Path) -> Result<()> {
    let seed = SeedFile::from_file(file)?;
    let app = super::open_app(config)?;
    let report = app.seed(&seed)?;

    println!(
        "Rewards:      {} created, {} already present",
        report.rewards_created, report.rewards_skipped
    );
    println!(
        "Collectables: {} created, {} already present",
        report.collectables_created, report.collectables_skipped
    );
    Ok(())
}
