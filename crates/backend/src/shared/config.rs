use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::shared::analytics::{DEFAULT_ORDER_STATUSES, DEFAULT_TOP_LIMIT};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub analytics: AnalyticsSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Deployment-wide analytics rules.
#[derive(Debug, Deserialize, Clone)]
pub struct AnalyticsSettings {
    /// IANA zone used for day/month buckets
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Treat an explicit end date as a whole picked day
    #[serde(default = "default_true")]
    pub inclusive_end_day: bool,
    /// Statuses counted as placed orders
    #[serde(default = "default_order_statuses")]
    pub order_statuses: Vec<String>,
    /// Default number of rows in popularity tables
    #[serde(default = "default_top_limit")]
    pub top_limit: usize,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            inclusive_end_day: true,
            order_statuses: default_order_statuses(),
            top_limit: DEFAULT_TOP_LIMIT,
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

fn default_true() -> bool {
    true
}

fn default_order_statuses() -> Vec<String> {
    DEFAULT_ORDER_STATUSES.iter().map(|s| s.to_string()).collect()
}

fn default_top_limit() -> usize {
    DEFAULT_TOP_LIMIT
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/app.db"

[server]
bind = "0.0.0.0:3000"

[analytics]
timezone = "UTC"
inclusive_end_day = true
order_statuses = ["pending", "completed"]
top_limit = 5
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Remember the loaded configuration for request handlers
pub fn init_config(config: Config) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("Configuration already initialized, keeping the first one");
    }
}

/// Analytics settings of the running process (defaults before `init_config`)
pub fn analytics_settings() -> AnalyticsSettings {
    CONFIG
        .get()
        .map(|c| c.analytics.clone())
        .unwrap_or_default()
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/app.db");
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(config.analytics.timezone, "UTC");
        assert!(config.analytics.inclusive_end_day);
        assert_eq!(config.analytics.order_statuses, vec!["pending", "completed"]);
    }

    #[test]
    fn test_analytics_section_is_optional() {
        let config: Config = toml::from_str(
            r#"
            [database]
            path = "/var/lib/shop.db"

            [analytics]
            timezone = "Europe/Berlin"
            "#,
        )
        .unwrap();

        assert_eq!(config.analytics.timezone, "Europe/Berlin");
        assert_eq!(config.analytics.top_limit, 5);
        assert_eq!(config.server.bind, "0.0.0.0:3000");
        assert_eq!(
            get_database_path(&config).unwrap(),
            PathBuf::from("/var/lib/shop.db")
        );
    }
}
