//! Configuration file I/O operations

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use super::Config;

impl Config {
    /// Get the global config directory path (~/.guildhall/)
    pub fn global_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".guildhall")
    }

    /// Get the global config file path (~/.guildhall/config.toml)
    pub fn global_config_path() -> PathBuf {
        Self::global_config_dir().join("config.toml")
    }

    /// Save configuration with an exclusive lock and an atomic rename.
    ///
    /// The lock file sits next to the config so concurrent `init` runs and a
    /// live server never interleave writes.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let _lock = lock_config(path)?;
        self.write_atomic(path)
    }

    /// Load `path`, writing a default config there first if it does not exist
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            let _lock = lock_config(path)?;
            // Another process may have created it while we waited for the lock
            if !path.exists() {
                Self::default().write_atomic(path)?;
                tracing::info!("[guildhall:config] Created {}", path.display());
            }
        }
        Self::from_file(path)
    }

    /// Load the global configuration, auto-creating it with defaults
    pub fn load() -> Result<Self> {
        Self::load_or_init(&Self::global_config_path())
    }

    fn write_atomic(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        let temp_path = path.with_extension("toml.tmp");
        let mut temp_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        temp_file
            .write_all(content.as_bytes())
            .with_context(|| "Failed to write config content")?;

        temp_file
            .sync_all()
            .with_context(|| "Failed to sync config file")?;

        std::fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to rename config file: {}", path.display()))?;

        Ok(())
    }
}

/// Take the exclusive config lock; released when the returned file drops
fn lock_config(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| {
            format!("Failed to create config directory: {}", parent.display())
        })?;
    }

    let lock_path = path.with_extension("toml.lock");
    let lock_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&lock_path)
        .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;

    lock_file
        .lock_exclusive()
        .with_context(|| "Failed to acquire config lock")?;

    Ok(lock_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_or_init_creates_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_or_init(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.server.port, 8787);

        // Existing files are not overwritten
        std::fs::write(&path, "[server]\nport = 9999\n").unwrap();
        let config = Config::load_or_init(&path).unwrap();
        assert_eq!(config.server.port, 9999);
    }
}
