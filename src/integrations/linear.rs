//! Linear integration: direct GraphQL issue creation.
//!
//! Unlike the cloud provider, nothing is persisted on our side — the tracker
//! issue is the report. Logs and derived metadata are embedded in the issue
//! body since the capture client has nowhere else to put them.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;

use crate::capture::{combined_console_attachment, format_network_logs, BugReportPayload};
use crate::capture::{DerivedMetadata, EnvProbe};

use super::{Integration, ProgressCallback, Provider, ProviderError, SubmitResult};

pub const LINEAR_GRAPHQL_URL: &str = "https://api.linear.app/graphql";

/// Truncation bound for log excerpts embedded in the issue body.
const MAX_EMBEDDED_LOG_CHARS: usize = 4000;

pub struct LinearOptions {
    pub api_key: String,
    pub team_id: String,
    /// GraphQL endpoint override for self-hosted proxies or tests.
    pub endpoint: Option<String>,
    pub probe: Option<EnvProbe>,
}

impl LinearOptions {
    pub fn new(api_key: impl Into<String>, team_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            team_id: team_id.into(),
            endpoint: None,
            probe: None,
        }
    }
}

pub struct LinearIntegration {
    api_key: String,
    team_id: String,
    endpoint: String,
    client: reqwest::Client,
    probe: EnvProbe,
}

impl LinearIntegration {
    pub fn new(options: LinearOptions) -> Result<Self, ProviderError> {
        if options.api_key.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "LinearIntegration: api_key is required".to_string(),
            ));
        }
        if options.team_id.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "LinearIntegration: team_id is required".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            api_key: options.api_key,
            team_id: options.team_id,
            endpoint: options
                .endpoint
                .unwrap_or_else(|| LINEAR_GRAPHQL_URL.to_string()),
            client,
            probe: options.probe.unwrap_or_default(),
        })
    }

    fn issue_body(&self, payload: &BugReportPayload) -> String {
        let derived = DerivedMetadata::collect(&EnvProbe {
            user_agent: payload
                .user_agent
                .clone()
                .or_else(|| self.probe.user_agent.clone()),
            ..self.probe.clone()
        });
        build_issue_markdown(payload, &derived)
    }
}

/// Markdown issue body shared by the Linear client and the server-side
/// forwarder: description, an environment table, then truncated log excerpts.
pub(crate) fn build_issue_markdown(
    payload: &BugReportPayload,
    derived: &DerivedMetadata,
) -> String {
    let mut body = String::new();
    if !payload.description.is_empty() {
        body.push_str(&payload.description);
        body.push_str("\n\n");
    }

    body.push_str("### Environment\n");
    body.push_str(&format!("- Browser: {}\n", derived.browser_name));
    body.push_str(&format!("- OS: {}\n", derived.os_name));
    if !payload.page_url.is_empty() {
        body.push_str(&format!("- Page: {}\n", payload.page_url));
    }
    if !derived.viewport.is_empty() {
        body.push_str(&format!("- Viewport: {}\n", derived.viewport));
    }
    body.push_str(&format!("- Capture: {}\n", payload.capture_mode.as_str()));

    if let Some(console) =
        combined_console_attachment(&payload.js_errors, &payload.console_logs)
    {
        body.push_str("\n### Logs\n```\n");
        body.push_str(&truncate_chars(&console, MAX_EMBEDDED_LOG_CHARS));
        body.push_str("\n```\n");
    }
    if !payload.network_logs.is_empty() {
        body.push_str("\n### Network\n```\n");
        body.push_str(&truncate_chars(
            &format_network_logs(&payload.network_logs),
            MAX_EMBEDDED_LOG_CHARS,
        ));
        body.push_str("\n```\n");
    }

    body
}

pub(crate) fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max).collect();
    out.push_str("\n… (truncated)");
    out
}

#[async_trait]
impl Integration for LinearIntegration {
    fn provider(&self) -> Provider {
        Provider::Linear
    }

    async fn submit(
        &self,
        payload: &BugReportPayload,
        on_progress: ProgressCallback<'_>,
    ) -> Result<SubmitResult, ProviderError> {
        on_progress("Preparing report…");
        let body = self.issue_body(payload);

        let mutation = r#"
            mutation IssueCreate($input: IssueCreateInput!) {
                issueCreate(input: $input) {
                    success
                    issue { id identifier url }
                }
            }
        "#;
        let request = json!({
            "query": mutation,
            "variables": {
                "input": {
                    "teamId": self.team_id,
                    "title": payload.title,
                    "description": body,
                }
            }
        });

        on_progress("Sending report…");
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", &self.api_key)
            .json(&request)
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
                .pointer("/errors/0/message")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(ProviderError::Transport(message));
        }

        let issue = reply
            .pointer("/data/issueCreate/issue")
            .filter(|v| !v.is_null())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("issueCreate returned no issue".to_string())
            })?;

        let issue_id = issue
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let issue_key = issue
            .get("identifier")
            .and_then(Value::as_str)
            .unwrap_or(&issue_id)
            .to_string();
        let issue_url = issue.get("url").and_then(Value::as_str).map(String::from);

        on_progress("Report submitted.");
        Ok(SubmitResult {
            provider: Provider::Linear,
            issue_id,
            issue_key,
            issue_url,
            warnings: Vec::new(),
        })
    }
}
