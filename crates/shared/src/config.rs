//! Application configuration management.

use chrono_tz::Tz;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
    /// Ledger policy.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Analytics window and cache settings.
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection before failing as unavailable.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    5
}

/// JWT verification settings.
///
/// Tokens are minted by the identity provider; this service only verifies them.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Shared secret used to verify token signatures.
    pub secret: String,
}

/// Ledger policy applied when provisioning cards.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Credits granted when a card is opened. Recorded as a recharge.
    #[serde(default)]
    pub opening_grant: i64,
    /// Prefix for generated card numbers.
    #[serde(default = "default_card_prefix")]
    pub card_number_prefix: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            opening_grant: 0,
            card_number_prefix: default_card_prefix(),
        }
    }
}

fn default_card_prefix() -> String {
    "CARD".to_string()
}

/// Analytics configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// IANA timezone whose local midnight starts the "today" window.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    /// Maximum number of cached rollups.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    /// Time-to-live for cached rollups in seconds.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_timezone() -> Tz {
    Tz::UTC
}

fn default_cache_capacity() -> u64 {
    64
}

fn default_cache_ttl() -> u64 {
    60
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
            .set_default("server.host", default_host())?
            .set_default("server.port", i64::from(default_port()))?
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("MEALCARD").separator("__"))
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
                ("MEALCARD__DATABASE__URL", Some("postgres://localhost/mealcard")),
                ("MEALCARD__JWT__SECRET", Some("secret")),
                ("MEALCARD__ANALYTICS__TIMEZONE", None),
                ("MEALCARD__LEDGER__OPENING_GRANT", None),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/mealcard");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.ledger.opening_grant, 0);
                assert_eq!(config.ledger.card_number_prefix, "CARD");
                assert_eq!(config.analytics.timezone, Tz::UTC);
            },
        );
    }

    #[test]
    fn test_load_custom_timezone() {
        temp_env::with_vars(
            [
                ("MEALCARD__DATABASE__URL", Some("postgres://localhost/mealcard")),
                ("MEALCARD__JWT__SECRET", Some("secret")),
                ("MEALCARD__ANALYTICS__TIMEZONE", Some("Asia/Kolkata")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.analytics.timezone, Tz::Asia__Kolkata);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("MEALCARD__DATABASE__URL", None::<&str>),
                ("MEALCARD__JWT__SECRET", Some("secret")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
