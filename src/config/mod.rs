//! Configuration management for QuickBug
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use quickbug::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Server listening on: {}", config.server.bind_addr);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `QUICKBUG__<section>__<key>`
//!
//! Examples:
//! - `QUICKBUG__SERVER__BIND_ADDR=0.0.0.0:9000`
//! - `QUICKBUG__SERVER__MAX_UPLOAD_BYTES=10MB`
//! - `QUICKBUG__FORWARDING__TIMEOUT_SECS=5`
//!
//! Tracker tokens can be kept out of the TOML file and supplied through
//! `QUICKBUG_LINEAR_TOKEN` / `QUICKBUG_JIRA_TOKEN`.
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/quickbug.toml`.
//! This can be overridden using the `QUICKBUG_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

// Re-export public types
pub use crate::humanize::ByteSize;
pub use models::{
    Config, ForwardingConfig, ProjectConfig, ServerConfig, StorageConfig, StorageProvider,
};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`QUICKBUG__*`)
    /// 2. TOML file (default: `config/quickbug.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file is malformed
    /// - Validation fails (incomplete tracker integrations, zero limits)
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Useful for testing with custom configuration files.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[projects."pk_test_demo"]
name = "Demo"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();
        assert_eq!(config.projects.len(), 1);
        assert!(config.projects["pk_test_demo"].integration.is_none());
    }

    #[test]
    fn test_validation_catches_incomplete_jira() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[projects."pk_live_backoffice"]
name = "Backoffice"

[projects."pk_live_backoffice".integration]
provider = "jira"
api_token = "jira_token"
email = "bugs@example.com"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let result = Config::load_from_path(config_path);
        assert!(matches!(
            result,
            Err(ConfigError::ValidationError(
                ValidationError::MissingJiraField { .. }
            ))
        ));
    }

    #[test]
    fn test_full_config_example() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "0.0.0.0:8080"
max_upload_bytes = "25MB"
fjall_path = "data/ledger"

[storage]
provider = "local"
root = "data/attachments"

[forwarding]
timeout_secs = 15

[projects."pk_live_storefront"]
name = "Storefront"

[projects."pk_live_storefront".integration]
provider = "linear"
api_token = "lin_api_test"
team_id = "team-123"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = Config::load_from_path(config_path).unwrap();

        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.server.max_upload_bytes.as_u64(), 25 * 1024 * 1024);
        assert_eq!(config.storage.provider, StorageProvider::Local);
        assert_eq!(config.projects.len(), 1);
    }
}
