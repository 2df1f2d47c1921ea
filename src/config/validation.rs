use super::models::{Config, StorageProvider};
use crate::api::models::TrackerProvider;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Project '{project}' has an integration with an empty api_token")]
    MissingApiToken { project: String },

    #[error("Project '{project}' uses Linear but has no team_id")]
    MissingLinearTeam { project: String },

    #[error("Project '{project}' uses Jira but is missing {field}")]
    MissingJiraField { project: String, field: String },

    #[error("Storage provider is 'local' but no root directory is configured")]
    MissingStorageRoot,

    #[error("max_upload_bytes must be positive")]
    InvalidUploadLimit,

    #[error("forwarding.timeout_secs must be positive")]
    InvalidForwardTimeout,
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_limits(config)?;
    validate_storage(config)?;
    validate_integrations(config)?;
    Ok(())
}

fn validate_limits(config: &Config) -> Result<(), ValidationError> {
    if config.server.max_upload_bytes.as_u64() == 0 {
        return Err(ValidationError::InvalidUploadLimit);
    }

    if config.forwarding.timeout_secs == 0 {
        return Err(ValidationError::InvalidForwardTimeout);
    }

    Ok(())
}

fn validate_storage(config: &Config) -> Result<(), ValidationError> {
    if config.storage.provider == StorageProvider::Local && config.storage.root.is_none() {
        return Err(ValidationError::MissingStorageRoot);
    }

    Ok(())
}

/// Ensure every configured tracker integration is complete enough to forward:
/// Linear needs a team, Jira needs the site/email pair and a project key.
fn validate_integrations(config: &Config) -> Result<(), ValidationError> {
    for (project_key, project) in &config.projects {
        let Some(integration) = &project.integration else {
            continue;
        };

        if integration.api_token.is_empty() {
            return Err(ValidationError::MissingApiToken {
                project: project_key.clone(),
            });
        }

        match integration.provider {
            TrackerProvider::Linear => {
                if integration.team_id.as_deref().unwrap_or("").is_empty() {
                    return Err(ValidationError::MissingLinearTeam {
                        project: project_key.clone(),
                    });
                }
            }
            TrackerProvider::Jira => {
                for (field, value) in [
                    ("email", &integration.email),
                    ("site_url", &integration.site_url),
                    ("project_key", &integration.project_key),
                ] {
                    if value.as_deref().unwrap_or("").is_empty() {
                        return Err(ValidationError::MissingJiraField {
                            project: project_key.clone(),
                            field: field.to_string(),
                        });
                    }
                }
            }
        }
    }

    Ok(())
}
