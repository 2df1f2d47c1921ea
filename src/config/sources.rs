use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "QUICKBUG_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/quickbug.toml";
const ENV_PREFIX: &str = "QUICKBUG";
const ENV_SEPARATOR: &str = "__";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // Load .env file if it exists (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    load_from_sources(config_path)
}

/// Load tracker tokens from environment variables into config.
/// Tokens may be omitted from TOML files and supplied per provider:
/// `QUICKBUG_LINEAR_TOKEN` / `QUICKBUG_JIRA_TOKEN`.
fn load_secrets(config: &mut Config) {
    apply_secret_tokens(
        config,
        env::var("QUICKBUG_LINEAR_TOKEN").ok(),
        env::var("QUICKBUG_JIRA_TOKEN").ok(),
    );
}

fn apply_secret_tokens(
    config: &mut Config,
    linear_token: Option<String>,
    jira_token: Option<String>,
) {
    use crate::api::models::TrackerProvider;

    for project in config.projects.values_mut() {
        if let Some(integration) = project.integration.as_mut() {
            if integration.api_token.is_empty() {
                let env_token = match integration.provider {
                    TrackerProvider::Linear => linear_token.as_ref(),
                    TrackerProvider::Jira => jira_token.as_ref(),
                };
                if let Some(token) = env_token {
                    integration.api_token = token.clone();
                }
            }
        }
    }
}

/// Load configuration from a specific path and environment
/// Useful for testing with custom config files
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    // Start with defaults (handled by struct Default implementations)
    // Add TOML file if it exists (optional)
    if config_path.exists() {
        tracing::info!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // Add environment variable overrides
    // QUICKBUG__SERVER__BIND_ADDR -> server.bind_addr
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    let mut config: Config = config.try_deserialize()?;

    // Fill empty tracker tokens from the environment on every load path,
    // including explicit --config files.
    load_secrets(&mut config);

    Ok(config)
}
