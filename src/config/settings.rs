//! Settings sections of the config file

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// HTTP API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind host. Keep on loopback and put a reverse proxy in front for public traffic.
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    /// Default: 8787
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret for `/ctl/*` write endpoints (sent as `X-Guildhall-Token`)
    ///
    /// If empty, admin endpoints accept unauthenticated requests.
    #[serde(default)]
    pub token: String,

    /// Maximum accepted request body in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            token: String::new(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Path to the SQLite file. Unset means `~/.guildhall/guildhall.db`.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// How long a writer waits for the file lock before failing
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

/// Presence tracking windows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySettings {
    /// A user counts as online if they pinged within this many seconds
    #[serde(default = "default_online_window_secs")]
    pub online_window_secs: u64,

    /// Entries older than this are expired opportunistically on every ping
    #[serde(default = "default_ping_expiry_secs")]
    pub ping_expiry_secs: u64,
}

fn default_online_window_secs() -> u64 {
    300
}

fn default_ping_expiry_secs() -> u64 {
    900
}

impl Default for ActivitySettings {
    fn default() -> Self {
        Self {
            online_window_secs: default_online_window_secs(),
            ping_expiry_secs: default_ping_expiry_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingSettings {
    /// Cooldown between two votes of the same user
    #[serde(default = "default_lock_hours")]
    pub lock_hours: u32,
}

fn default_lock_hours() -> u32 {
    24
}

impl Default for VotingSettings {
    fn default() -> Self {
        Self {
            lock_hours: default_lock_hours(),
        }
    }
}

/// Block explorer used to look up a wallet's first transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EligibilitySettings {
    /// Etherscan-compatible API endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.etherscan.io/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for EligibilitySettings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}
