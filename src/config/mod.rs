//! Configuration management
//!
//! Settings live in `~/.chatvault/config.json`. Loading falls back to
//! defaults when the file is absent; saving writes atomically through a
//! temp file rename.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Recognized configuration options for the backup tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory the backup tree is written to
    pub backup_path: String,

    /// Path to the chat application's SQLite database
    pub db_path: String,

    /// Remote repository URL (https or ssh); empty disables sync
    pub remote_url: String,

    /// Access token for https remotes
    pub token: String,

    /// SSH private key path for ssh remotes
    pub ssh_key_path: String,

    /// Proxy URL applied to all remote git operations
    pub proxy: String,

    /// Whether to push to the remote after exporting
    pub auto_push: bool,

    /// Local mirror location; empty means `~/.chatvault/mirror`
    pub mirror_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup_path: String::new(),
            db_path: String::new(),
            remote_url: String::new(),
            token: String::new(),
            ssh_key_path: String::new(),
            proxy: String::new(),
            auto_push: true,
            mirror_path: String::new(),
        }
    }
}

/// Returns the `~/.chatvault` directory, creating it if needed.
pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::home_dir()
        .context("Could not find home directory")?
        .join(".chatvault");

    fs::create_dir_all(&dir).context("Failed to create ~/.chatvault directory")?;
    Ok(dir)
}

impl Config {
    /// Every key accepted by `get` and `set`, in display order.
    pub const KEYS: &'static [&'static str] = &[
        "backup_path",
        "db_path",
        "remote_url",
        "token",
        "ssh_key_path",
        "proxy",
        "auto_push",
        "mirror_path",
    ];

    /// Path to the configuration file.
    pub fn config_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("config.json"))
    }

    /// Loads the configuration, or defaults when no file exists yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Saves the configuration atomically.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = serde_json::to_string_pretty(self)?;

        // Write to a temp file first, then rename for atomicity
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, &content).context("Failed to write config temp file")?;
        fs::rename(&temp_path, &path).context("Failed to rename config file")?;

        Ok(())
    }

    /// Resolves the mirror directory, defaulting under `~/.chatvault`.
    pub fn mirror_path(&self) -> Result<PathBuf> {
        if self.mirror_path.is_empty() {
            Ok(config_dir()?.join("mirror"))
        } else {
            Ok(PathBuf::from(&self.mirror_path))
        }
    }

    /// Reads a single option by key for the `config get` command.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "backup_path" => Some(self.backup_path.clone()),
            "db_path" => Some(self.db_path.clone()),
            "remote_url" => Some(self.remote_url.clone()),
            "token" => Some(self.token.clone()),
            "ssh_key_path" => Some(self.ssh_key_path.clone()),
            "proxy" => Some(self.proxy.clone()),
            "auto_push" => Some(self.auto_push.to_string()),
            "mirror_path" => Some(self.mirror_path.clone()),
            _ => None,
        }
    }

    /// Updates a single option by key for the `config set` command.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "backup_path" => self.backup_path = value.to_string(),
            "db_path" => self.db_path = value.to_string(),
            "remote_url" => self.remote_url = value.to_string(),
            "token" => self.token = value.to_string(),
            "ssh_key_path" => self.ssh_key_path = value.to_string(),
            "proxy" => self.proxy = value.to_string(),
            "auto_push" => {
                self.auto_push = value
                    .parse()
                    .with_context(|| format!("auto_push expects true or false, got '{value}'"))?
            }
            "mirror_path" => self.mirror_path = value.to_string(),
            _ => anyhow::bail!("Unknown config key '{key}'"),
        }
        Ok(())
    }
}
