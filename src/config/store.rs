//! Store configuration loading from config.toml
//!
//! This module loads the store's display settings, the login roster (one admin
//! passphrase plus seller email/password pairs) and the advisory service settings
//! from a TOML file. Sellers listed here are seeded into the database at startup.
//! Secrets can be overridden from the environment so they stay out of the file.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Store display settings
    #[serde(default)]
    pub store: StoreConfig,
    /// Login roster
    #[serde(default)]
    pub auth: AuthConfig,
    /// Business insight service settings
    #[serde(default)]
    pub advisory: AdvisoryConfig,
}

/// Store display settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StoreConfig {
    /// Store name shown in reports
    pub name: String,
    /// Currency symbol prefixed to amounts
    pub currency_symbol: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "StockBuddy".to_string(),
            currency_symbol: "$".to_string(),
        }
    }
}

/// Login roster
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// Name displayed for the admin after login
    pub admin_name: String,
    /// Admin passphrase; admin login is disabled while this is empty
    pub admin_passphrase: String,
    /// Sellers seeded into the database at startup
    pub sellers: Vec<SellerConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_name: "Admin".to_string(),
            admin_passphrase: String::new(),
            sellers: Vec::new(),
        }
    }
}

/// One seller login from the config file
#[derive(Debug, Deserialize, Clone)]
pub struct SellerConfig {
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Plain-text password; hashed before it reaches the database
    pub password: String,
}

/// Business insight service settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// Whether `/insight refresh` may call the service
    pub enabled: bool,
    /// Full URL the insight request is POSTed to
    pub endpoint: String,
    /// Model name forwarded to the service
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// How many recent sales to include in the prompt
    pub recent_transaction_limit: u64,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
            model: "default".to_string(),
            timeout_secs: 30,
            recent_transaction_limit: 20,
        }
    }
}

impl Config {
    /// Replaces secrets and endpoints with `ADMIN_PASSPHRASE` and `ADVISORY_ENDPOINT`
    /// from the environment when those are set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(passphrase) = std::env::var("ADMIN_PASSPHRASE") {
            self.auth.admin_passphrase = passphrase;
        }
        if let Ok(endpoint) = std::env::var("ADVISORY_ENDPOINT") {
            self.advisory.endpoint = endpoint;
            self.advisory.enabled = true;
        }
    }
}

/// Loads store configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A seller entry is missing a required field
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from `path`, falling back to defaults when the file is absent.
///
/// A present but malformed file is still an error.
pub fn load_config_or_default<P: AsRef<Path>>(path: P) -> Result<Config> {
    if path.as_ref().exists() {
        load_config(path)
    } else {
        tracing::warn!(
            "Config file {:?} not found, using defaults",
            path.as_ref()
        );
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            [store]
            name = "Corner Shop"
            currency_symbol = "€"

            [auth]
            admin_passphrase = "open sesame"

            [[auth.sellers]]
            name = "Dana"
            email = "dana@example.com"
            password = "hunter2"

            [[auth.sellers]]
            name = "Lee"
            email = "lee@example.com"
            password = "swordfish"

            [advisory]
            enabled = true
            endpoint = "http://localhost:8080/v1/insight"
            model = "small"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.store.name, "Corner Shop");
        assert_eq!(config.store.currency_symbol, "€");
        assert_eq!(config.auth.admin_passphrase, "open sesame");
        assert_eq!(config.auth.admin_name, "Admin");
        assert_eq!(config.auth.sellers.len(), 2);
        assert_eq!(config.auth.sellers[1].email, "lee@example.com");
        assert!(config.advisory.enabled);
        assert_eq!(config.advisory.model, "small");
        assert_eq!(config.advisory.timeout_secs, 30);
        assert_eq!(config.advisory.recent_transaction_limit, 20);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.store.name, "StockBuddy");
        assert_eq!(config.store.currency_symbol, "$");
        assert!(config.auth.admin_passphrase.is_empty());
        assert!(config.auth.sellers.is_empty());
        assert!(!config.advisory.enabled);
    }

    #[test]
    fn test_seller_requires_password() {
        let toml_str = r#"
            [[auth.sellers]]
            name = "Dana"
            email = "dana@example.com"
        "#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let result = load_config("definitely/not/here.toml");
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn test_load_missing_file_or_default() {
        let config = load_config_or_default("definitely/not/here.toml").unwrap();
        assert_eq!(config.store.name, "StockBuddy");
    }
}
