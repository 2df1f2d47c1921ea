//! Jira integration: delivery through server-side proxy endpoints.
//!
//! Jira API tokens authenticate with Basic auth and cannot be exposed to a
//! browser context, so this provider never talks to Jira directly. The
//! embedder hosts two thin proxies: one that creates the issue and one that
//! streams attachments through to Jira. Only the create endpoint is
//! required.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::capture::{BugReportPayload, DerivedMetadata, EnvProbe};

use super::linear::build_issue_markdown;
use super::{Integration, ProgressCallback, Provider, ProviderError, SubmitResult};

pub struct JiraOptions {
    /// Proxy endpoint that creates the Jira issue.
    pub create_endpoint: String,
    /// Proxy endpoint that uploads attachments for an existing issue key.
    /// Attachments are skipped when absent.
    pub attachment_endpoint: Option<String>,
    pub probe: Option<EnvProbe>,
}

impl JiraOptions {
    pub fn new(create_endpoint: impl Into<String>) -> Self {
        Self {
            create_endpoint: create_endpoint.into(),
            attachment_endpoint: None,
            probe: None,
        }
    }
}

pub struct JiraIntegration {
    create_endpoint: String,
    attachment_endpoint: Option<String>,
    client: reqwest::Client,
    probe: EnvProbe,
}

impl JiraIntegration {
    pub fn new(options: JiraOptions) -> Result<Self, ProviderError> {
        if options.create_endpoint.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "JiraIntegration: create_endpoint is required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            create_endpoint: options.create_endpoint,
            attachment_endpoint: options.attachment_endpoint,
            client,
            probe: options.probe.unwrap_or_default(),
        })
    }

    async fn upload_attachments(
        &self,
        issue_key: &str,
        payload: &BugReportPayload,
        warnings: &mut Vec<String>,
    ) {
        let Some(endpoint) = &self.attachment_endpoint else {
            return;
        };

        let mut form = reqwest::multipart::Form::new().text("issue_key", issue_key.to_string());
        let mut any = false;
        if let Some(screenshot) = &payload.screenshot {
            form = form.part(
                "screenshot",
                reqwest::multipart::Part::bytes(screenshot.to_vec())
                    .file_name("bug-screenshot.png"),
            );
            any = true;
        }
        if let Some(video) = &payload.video {
            form = form.part(
                "video",
                reqwest::multipart::Part::bytes(video.to_vec()).file_name("bug-recording.webm"),
            );
            any = true;
        }
        if !any {
            return;
        }

        // Attachment failure leaves the created issue intact; degrade to a
        // warning like server-side forwarding does.
        let outcome = self.client.post(endpoint).multipart(form).send().await;
        match outcome {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => warnings.push(format!(
                "Attachments: upload failed with HTTP {}",
                response.status().as_u16()
            )),
            Err(e) => warnings.push(format!("Attachments: {}", e)),
        }
    }
}

#[async_trait]
impl Integration for JiraIntegration {
    fn provider(&self) -> Provider {
        Provider::Jira
    }

    async fn submit(
        &self,
        payload: &BugReportPayload,
        on_progress: ProgressCallback<'_>,
    ) -> Result<SubmitResult, ProviderError> {
        on_progress("Preparing report…");
        let derived = DerivedMetadata::collect(&EnvProbe {
            user_agent: payload
                .user_agent
                .clone()
                .or_else(|| self.probe.user_agent.clone()),
            ..self.probe.clone()
        });
        let body = build_issue_markdown(payload, &derived);

        on_progress("Sending report…");
        let response = self
            .client
            .post(&self.create_endpoint)
            .json(&json!({
                "title": payload.title,
                "body": body,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status();
        let reply: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = reply
                .get("error")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(ProviderError::Transport(message));
        }

        let issue_key = reply
            .get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProviderError::InvalidResponse("create endpoint returned no issue key".to_string())
            })?
            .to_string();
        let issue_id = reply
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or(&issue_key)
            .to_string();
        let issue_url = reply.get("url").and_then(Value::as_str).map(String::from);

        let mut warnings = Vec::new();
        self.upload_attachments(&issue_key, payload, &mut warnings)
            .await;

        on_progress("Report submitted.");
        Ok(SubmitResult {
            provider: Provider::Jira,
            issue_id,
            issue_key,
            issue_url,
            warnings,
        })
    }
}
