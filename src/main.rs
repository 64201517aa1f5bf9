use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

use cli::repair::RepairTask;

#[derive(Parser)]
#[command(name = "guildhall")]
#[command(about = "Community progression core: XP, rewards shop, presence and votes")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.guildhall/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides [database].path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the JSON HTTP API
    Serve,

    /// Write a commented default config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Load rewards and collectables from a TOML file
    Seed {
        file: PathBuf,
    },

    /// Run a one-off data repair
    Repair {
        #[command(subcommand)]
        task: RepairTask,
    },

    /// Show the level for an XP total
    Level {
        xp: u64,
    },

    /// Count users currently online
    Online {
        /// Window in seconds (defaults to [activity].online_window_secs)
        #[arg(long)]
        window: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match cli.command {
        Some(Commands::Init { force }) => {
            cli::init::init_command(cli.config, force).await?;
        }
        Some(Commands::Level { xp }) => {
            cli::level::level_command(xp);
        }
        Some(Commands::Seed { file }) => {
            let config = cli::load_config(cli.config, cli.db)?;
            cli::seed::seed_command(config, &file).await?;
        }
        Some(Commands::Repair { task }) => {
            let config = cli::load_config(cli.config, cli.db)?;
            cli::repair::repair_command(config, task).await?;
        }
        Some(Commands::Online { window }) => {
            let config = cli::load_config(cli.config, cli.db)?;
            cli::online::online_command(config, window).await?;
        }
        Some(Commands::Serve) | None => {
            // Default: run the server
            let config = cli::load_config(cli.config, cli.db)?;
            cli::serve::serve_command(config).await?;
        }
    }

    Ok(())
}
