//! Configuration resolution for taskmax.
//!
//! All configuration is read once at startup, validated, and passed down as
//! explicit structs. Resolution order: CLI arguments (highest priority),
//! environment variables, built-in defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Fixed base endpoint of the MAX Bot API.
pub const DEFAULT_BOT_BASE_URL: &str = "https://platform-api.max.ru";

/// Environment variable holding the bot access token.
pub const BOT_TOKEN_ENV: &str = "MAX_BOT_TOKEN";

/// Environment variable overriding the bot API base URL.
pub const BOT_BASE_URL_ENV: &str = "MAX_API_BASE_URL";

/// Credentials for the MAX Bot API client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// API base endpoint.
    pub base_url: String,
    /// Bot access token issued by the platform.
    pub access_token: String,
}

impl BotConfig {
    /// Build a config from an explicit token, with the fixed base endpoint.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BOT_BASE_URL.to_string(),
            access_token: access_token.into(),
        }
    }

    /// Read the bot credentials from the environment, failing fast when the
    /// token is absent or blank.
    pub fn from_env() -> Result<Self> {
        let access_token = std::env::var(BOT_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::Config(format!("{BOT_TOKEN_ENV} is not set")))?;

        let base_url = std::env::var(BOT_BASE_URL_ENV)
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BOT_BASE_URL.to_string());

        Ok(Self {
            base_url,
            access_token,
        })
    }
}

/// Get the default database path for the server.
pub fn database_path() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .ok()
            .map(|h| PathBuf::from(h).join(".taskmax").join("tasks.db"))
    }
    #[cfg(target_os = "macos")]
    {
        std::env::var("HOME")
            .ok()
            .map(|h| PathBuf::from(h).join("Library/Application Support/taskmax/tasks.db"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| std::env::var("HOME").ok().map(|h| PathBuf::from(h).join(".config")))
            .map(|p| p.join("taskmax").join("tasks.db"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
    {
        None
    }
}

/// Resolve the database path from an optional CLI/env override, falling back
/// to the platform default. Fails fast when no location can be determined.
pub fn resolve_database_path(cli_path: Option<PathBuf>) -> Result<PathBuf> {
    cli_path.or_else(database_path).ok_or_else(|| {
        Error::Config("database path could not be determined; pass --db-path".into())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_config_new_uses_fixed_base() {
        let config = BotConfig::new("tok123");
        assert_eq!(config.base_url, DEFAULT_BOT_BASE_URL);
        assert_eq!(config.access_token, "tok123");
    }

    #[test]
    fn resolve_database_path_prefers_cli() {
        let path = resolve_database_path(Some(PathBuf::from("/tmp/override.db"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/override.db"));
    }
}
