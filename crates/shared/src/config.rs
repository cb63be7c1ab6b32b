//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Bootstrap data used by the seeder.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL (`postgres://...` or `sqlite:...`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection before failing.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    /// Whether sqlx logs every statement.
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl DatabaseConfig {
    /// Configuration for a private in-memory SQLite database.
    ///
    /// A single pooled connection keeps every caller on the same in-memory
    /// database, which also serializes units of work.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    30
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "ibank=info,ibank_db=info,sea_orm=warn".to_string()
}

/// Bootstrap manager account created by the seeder.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    /// Manager display name.
    #[serde(default = "default_manager_name")]
    pub manager_name: String,
    /// Manager login.
    #[serde(default = "default_manager_login")]
    pub manager_login: String,
    /// Manager password. Must be overridden outside development.
    #[serde(default = "default_manager_password")]
    pub manager_password: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            manager_name: default_manager_name(),
            manager_login: default_manager_login(),
            manager_password: default_manager_password(),
        }
    }
}

fn default_manager_name() -> String {
    "IBank".to_string()
}

fn default_manager_login() -> String {
    "admin".to_string()
}

fn default_manager_password() -> String {
    "boss".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("IBANK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("IBANK__DATABASE__URL", Some("sqlite::memory:")),
                ("IBANK__DATABASE__MAX_CONNECTIONS", None::<&str>),
                ("IBANK__LOGGING__JSON", None),
                ("RUN_MODE", Some("test-no-such-file")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.database.min_connections, 1);
                assert_eq!(config.database.acquire_timeout_secs, 30);
                assert!(!config.database.sqlx_logging);
                assert!(!config.logging.json);
                assert_eq!(config.bootstrap.manager_login, "admin");
            },
        );
    }

    #[test]
    fn test_environment_overrides() {
        temp_env::with_vars(
            [
                ("IBANK__DATABASE__URL", Some("postgres://localhost/ibank")),
                ("IBANK__DATABASE__MAX_CONNECTIONS", Some("4")),
                ("IBANK__LOGGING__JSON", Some("true")),
                ("RUN_MODE", Some("test-no-such-file")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/ibank");
                assert_eq!(config.database.max_connections, 4);
                assert!(config.logging.json);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("IBANK__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test-no-such-file")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_in_memory_uses_single_connection() {
        let config = DatabaseConfig::in_memory();
        assert_eq!(config.max_connections, 1);
        assert!(config.url.starts_with("sqlite:"));
    }
}
