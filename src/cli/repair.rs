//! Repair command implementation

use anyhow::Result;
use clap::Subcommand;

use guildhall::config::Config;

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum RepairTask {
    /// Fill in coins_spent on claims recorded before the column existed
    CoinsSpent,
}

pub async fn repair_command(config: Config, task: RepairTask) -> Result<()> {
    let app = super::open_app(config)?;
    match task {
        RepairTask::CoinsSpent => {
            let updated = app.backfill_coins_spent()?;
            println!("Backfilled coins_spent on {} claim(s).", updated);
        }
    }
    Ok(())
}
