// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Project configuration management.
//!
//! Configuration is stored in `.parley/config.toml` and names the chat
//! server, who the local user is, and how often to poll.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pl_core::{EngineConfig, HttpConfig, Participant};

use crate::error::{Error, Result};

const PARLEY_DIR_NAME: &str = ".parley";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Project configuration stored in `.parley/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub identity: IdentityConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Where the chat server lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL, e.g. `http://127.0.0.1:8000`.
    pub url: String,
    /// Per-request timeout in seconds (default: 10).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Who messages are sent as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    pub user_id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Delay between fetches in milliseconds (default: 2000).
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        PollingConfig {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_interval_ms() -> u64 {
    2_000
}

impl Config {
    /// Creates a config for the given server and identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the URL is not http(s) or a field is blank.
    pub fn new(server_url: &str, user_id: &str, display_name: &str) -> Result<Self> {
        let url = server_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::InvalidInput(format!(
                "invalid server URL '{}'\n  hint: use http://host:port or https://host",
                server_url
            )));
        }
        if user_id.trim().is_empty() {
            return Err(Error::InvalidInput("user id cannot be empty".to_string()));
        }
        if display_name.trim().is_empty() {
            return Err(Error::InvalidInput("display name cannot be empty".to_string()));
        }
        Ok(Config {
            server: ServerConfig {
                url: url.trim_end_matches('/').to_string(),
                timeout_secs: default_timeout_secs(),
            },
            identity: IdentityConfig {
                user_id: user_id.trim().to_string(),
                display_name: display_name.trim().to_string(),
            },
            polling: PollingConfig::default(),
        })
    }

    /// Loads configuration from the given `.parley/` directory.
    pub fn load(parley_dir: &Path) -> Result<Self> {
        let config_path = parley_dir.join(CONFIG_FILE_NAME);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Saves configuration to the given `.parley/` directory.
    pub fn save(&self, parley_dir: &Path) -> Result<()> {
        let config_path = parley_dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn participant(&self) -> Participant {
        Participant::new(&self.identity.user_id, &self.identity.display_name)
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            poll_interval: Duration::from_millis(self.polling.interval_ms.max(1)),
            ..EngineConfig::default()
        }
    }

    pub fn http_config(&self) -> HttpConfig {
        HttpConfig::new(&self.server.url).with_timeout(Duration::from_secs(self.server.timeout_secs))
    }

    /// How long a command waits for the engine to hear back from the server.
    ///
    /// One request timeout plus one poll interval, so a single slow fetch
    /// still lands.
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.server.timeout_secs) + Duration::from_millis(self.polling.interval_ms)
    }
}

/// Find the .parley directory by walking up from the current directory
pub fn find_parley_dir() -> Result<PathBuf> {
    find_parley_dir_from(&std::env::current_dir()?)
}

/// Find the .parley directory by walking up from `start`
pub fn find_parley_dir_from(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let parley_dir = current.join(PARLEY_DIR_NAME);
        if parley_dir.is_dir() {
            return Ok(parley_dir);
        }
        if !current.pop() {
            return Err(Error::NotInitialized);
        }
    }
}

/// Initialize a new .parley directory holding `config`
pub fn init_parley_dir(path: &Path, config: &Config) -> Result<PathBuf> {
    let parley_dir = path.join(PARLEY_DIR_NAME);

    if parley_dir.join(CONFIG_FILE_NAME).exists() {
        return Err(Error::AlreadyInitialized(parley_dir.display().to_string()));
    }

    fs::create_dir_all(&parley_dir)?;
    config.save(&parley_dir)?;

    Ok(parley_dir)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
