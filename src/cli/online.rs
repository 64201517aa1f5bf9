//! Online command implementation

use anyhow::Result;

use guildhall::config::Config;

/// Print the number of users seen within the window
pub async fn online_command(config: Config, window: Option<u64>) -> Result<()> {
    let window = window.unwrap_or(config.activity.online_window_secs);
    let app = super::open_app(config)?;
    let count = app.count_active_users(window)?;
    println!("{} user(s) online in the last {}s", count, window);
    Ok(())
}
