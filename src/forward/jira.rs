//! Jira Cloud forwarder: REST issue creation plus attachment upload.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::{json, Value};
use tracing::warn;

use crate::api::models::TrackerConfig;
use crate::integrations::FilePart;

use super::{build_issue_body, ForwardError, ForwardInput, ForwardSuccess};

pub(super) async fn forward(
    http: &reqwest::Client,
    tracker: &TrackerConfig,
    input: &ForwardInput<'_>,
) -> Result<ForwardSuccess, ForwardError> {
    let site_url = require_field(tracker.site_url.as_deref(), "site_url")?;
    let email = require_field(tracker.email.as_deref(), "email")?;
    let project_key = require_field(tracker.project_key.as_deref(), "project_key")?;

    let base = jira_base_url(site_url);
    let auth = basic_auth(email, &tracker.api_token);
    let body = build_issue_body(input);

    let mut success =
        create_issue_at(http, &base, &auth, project_key, &input.record.title, &body).await?;

    // Binary uploads are best-effort: the issue already exists, so a failed
    // attachment must not fail the whole forward.
    let parts: Vec<&FilePart> = input
        .screenshot
        .iter()
        .chain(input.video.iter())
        .collect();
    if !parts.is_empty() {
        if let Err(e) = upload_attachments_at(http, &base, &auth, &success.issue_key, &parts).await
        {
            warn!(
                report_id = %input.record.id,
                issue_key = %success.issue_key,
                error = %e,
                "Jira attachment upload failed"
            );
        }
    }

    if success.issue_url.is_none() {
        success.issue_url = Some(format!("{}/browse/{}", base, success.issue_key));
    }
    Ok(success)
}

fn require_field<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str, ForwardError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ForwardError::Configuration(format!("Jira integration has no {name}")))
}

/// Normalize a configured Jira site into a base URL. An explicit scheme is
/// kept as-is so self-hosted and test servers can use plain `http://`.
pub fn jira_base_url(site_url: &str) -> String {
    let trimmed = site_url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

fn basic_auth(email: &str, api_token: &str) -> String {
    format!("Basic {}", BASE64.encode(format!("{email}:{api_token}")))
}

/// Wrap plain text into the Atlassian Document Format the v3 API requires.
fn adf_description(text: &str) -> Value {
    let paragraphs: Vec<Value> = text
        .split("\n\n")
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| {
            json!({
                "type": "paragraph",
                "content": [{ "type": "text", "text": chunk }]
            })
        })
        .collect();

    json!({
        "type": "doc",
        "version": 1,
        "content": paragraphs,
    })
}

async fn create_issue_at(
    http: &reqwest::Client,
    base: &str,
    auth: &str,
    project_key: &str,
    title: &str,
    body: &str,
) -> Result<ForwardSuccess, ForwardError> {
    let request = json!({
        "fields": {
            "project": { "key": project_key },
            "issuetype": { "name": "Bug" },
            "summary": title,
            "description": adf_description(body),
        }
    });

    let response = http
        .post(format!("{base}/rest/api/3/issue"))
        .header("Authorization", auth)
        .json(&request)
        .send()
        .await
        .map_err(|e| ForwardError::Transport(e.to_string()))?;

    let status = response.status();
    let reply: Value = response
        .json()
        .await
        .unwrap_or(Value::Null);

    if !status.is_success() {
        let message = reply
            .pointer("/errorMessages/0")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
        return Err(ForwardError::Transport(message));
    }

    let issue_key = reply
        .get("key")
        .and_then(Value::as_str)
        .ok_or_else(|| ForwardError::InvalidResponse("issue create returned no key".to_string()))?
        .to_string();
    let issue_id = reply
        .get("id")
        .and_then(Value::as_str)
        .unwrap_or(&issue_key)
        .to_string();

    Ok(ForwardSuccess {
        provider: "jira".to_string(),
        issue_id,
        issue_key,
        issue_url: None,
    })
}

async fn upload_attachments_at(
    http: &reqwest::Client,
    base: &str,
    auth: &str,
    issue_key: &str,
    parts: &[&FilePart],
) -> Result<(), ForwardError> {
    let mut form = reqwest::multipart::Form::new();
    for file in parts {
        let part = reqwest::multipart::Part::bytes(file.data.to_vec())
            .file_name(file.file_name.clone());
        let part = match part.mime_str(&file.content_type) {
            Ok(part) => part,
            Err(_) => reqwest::multipart::Part::bytes(file.data.to_vec())
                .file_name(file.file_name.clone()),
        };
        form = form.part("file", part);
    }

    let response = http
        .post(format!("{base}/rest/api/3/issue/{issue_key}/attachments"))
        .header("Authorization", auth)
        .header("X-Atlassian-Token", "no-check")
        .multipart(form)
        .send()
        .await
        .map_err(|e| ForwardError::Transport(e.to_string()))?;

    if !response.status().is_success() {
        return Err(ForwardError::Transport(format!(
            "attachment upload: HTTP {}",
            response.status().as_u16()
        )));
    }

    Ok(())
}
