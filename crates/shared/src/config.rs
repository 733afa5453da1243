//! Application configuration management.

use std::str::FromStr;

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Business rules applied by the posting engine.
    #[serde(default)]
    pub business_rules: BusinessRulesConfig,
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

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
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
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Business rules configuration.
///
/// The daily debit limit is a business rule, not a compiled-in constant, so it
/// lives here and is handed to the posting engine at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct BusinessRulesConfig {
    /// Maximum cumulative debit magnitude per account per business day.
    #[serde(default = "default_daily_debit_limit")]
    pub daily_debit_limit: Decimal,
    /// IANA timezone that defines the business day (e.g. `America/Guayaquil`).
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Seed for the account number generator. Random when absent.
    #[serde(default)]
    pub account_number_seed: Option<u64>,
}

impl Default for BusinessRulesConfig {
    fn default() -> Self {
        Self {
            daily_debit_limit: default_daily_debit_limit(),
            timezone: default_timezone(),
            account_number_seed: None,
        }
    }
}

fn default_daily_debit_limit() -> Decimal {
    Decimal::from(1000)
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl BusinessRulesConfig {
    /// Parses the configured business timezone.
    ///
    /// # Errors
    ///
    /// Returns an error if the timezone is not a known IANA name.
    pub fn timezone(&self) -> Result<Tz, config::ConfigError> {
        Tz::from_str(&self.timezone).map_err(|_| {
            config::ConfigError::Message(format!(
                "business_rules.timezone: unknown timezone '{}'",
                self.timezone
            ))
        })
    }

    /// Validates the business rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the daily limit is not positive or the timezone is unknown.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.daily_debit_limit <= Decimal::ZERO {
            return Err(config::ConfigError::Message(format!(
                "business_rules.daily_debit_limit must be positive, got {}",
                self.daily_debit_limit
            )));
        }
        self.timezone()?;
        Ok(())
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or fails validation.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BANKDESK").separator("__"))
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.business_rules.validate()?;
        Ok(app_config)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
