//! Init command implementation

use anyhow::{Result, bail};
use std::path::PathBuf;

use guildhall::config::Config;

/// Default configuration content for guildhall init
pub const DEFAULT_CONFIG: &str = r#"# Guildhall Configuration
# =======================
#
# Every key is optional; missing keys fall back to the defaults shown here.

# ============================================================================
# SERVER - Local JSON API (`guildhall serve`)
# ============================================================================
[server]
host = "127.0.0.1"
port = 8787
# Optional: shared secret for POST /ctl/* (sent as `X-Guildhall-Token`)
# Leave empty to disable auth (local development only)
token = ""
max_body_bytes = 65536

# ============================================================================
# DATABASE
# ============================================================================
[database]
# path = "/var/lib/guildhall/guildhall.db"   # default: ~/.guildhall/guildhall.db
busy_timeout_ms = 5000

# ============================================================================
# ACTIVITY - Online presence
# ============================================================================
[activity]
# Users who pinged within this many seconds count as online
online_window_secs = 300
# Pings older than this are cleared whenever anyone pings
ping_expiry_secs = 900

# ============================================================================
# VOTING
# ============================================================================
[voting]
lock_hours = 24

# ============================================================================
# ELIGIBILITY - Wallet history lookups for gated rewards and collectables
# ============================================================================
[eligibility]
api_url = "https://api.etherscan.io/api"
api_key = ""
timeout_secs = 10
"#;

/// Initialize a new Guildhall configuration
/// By default creates the global config at ~/.guildhall/config.toml
/// Use --config to specify a custom path
pub async fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    // Create parent directory (if any)
    if let Some(parent) = config_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    println!("Created: {}", config_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_builtin_defaults() {
        let parsed: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        let builtin = Config::default();
        assert_eq!(parsed.server.port, builtin.server.port);
        assert_eq!(parsed.server.max_body_bytes, builtin.server.max_body_bytes);
        assert_eq!(parsed.activity.online_window_secs, builtin.activity.online_window_secs);
        assert_eq!(parsed.voting.lock_hours, builtin.voting.lock_hours);
        assert_eq!(parsed.eligibility.api_url, builtin.eligibility.api_url);
        assert!(parsed.database.path.is_none());
    }
}
