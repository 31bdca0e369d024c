use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DietConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub timeline: TimelineConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// `stdio` or `http`.
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    /// Bearer token required by the HTTP transport.
    pub auth_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    /// File path, `~/`-relative path, or `:memory:`.
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TimelineConfig {
    /// Entries served by the `diet://activity` resource.
    pub activity_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 3333,
            log_level: "info".into(),
            auth_token: None,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_diet_dir()
            .join("diet.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self { activity_limit: 10 }
    }
}

/// Returns `~/.infodiet/`
pub fn default_diet_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".infodiet")
}

/// Returns the default config file path: `~/.infodiet/config.toml`
pub fn default_config_path() -> PathBuf {
    default_diet_dir().join("config.toml")
}

impl DietConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            DietConfig::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides (DIET_DB_PATH, DIET_TRANSPORT,
    /// DIET_PORT, DIET_LOG_LEVEL, DIET_AUTH_TOKEN).
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("DIET_DB_PATH") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("DIET_TRANSPORT") {
            self.server.transport = val;
        }
        if let Ok(val) = std::env::var("DIET_PORT") {
            self.server.port = val
                .parse()
                .with_context(|| format!("DIET_PORT is not a valid port: {val}"))?;
        }
        if let Ok(val) = std::env::var("DIET_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("DIET_AUTH_TOKEN") {
            self.server.auth_token = Some(val).filter(|t| !t.is_empty());
        }
        Ok(())
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}
