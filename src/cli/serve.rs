//! Serve command implementation

use anyhow::Result;
use tracing::info;

use guildhall::config::Config;
use guildhall::server::start_http_server;

/// Run the HTTP API until Ctrl-C
pub async fn serve_command(config: Config) -> Result<()> {
    let app = super::open_app(config)?;
    info!(
        "[guildhall:serve] Database: {}",
        app.config().database_path().display()
    );

    let handle = start_http_server(app)?;

    tokio::signal::ctrl_c().await?;
    info!("[guildhall:serve] Shutting down");
    tokio::task::spawn_blocking(move || handle.shutdown()).await?;

    Ok(())
}
