//! Linear forwarder: GraphQL `issueCreate` on behalf of a project.
//!
//! Linear's public API offers no good binary upload path for server-to-server
//! use, so screenshots and recordings stay in attachment storage and only the
//! text body is forwarded.

use serde_json::{json, Value};

use crate::api::models::TrackerConfig;
use crate::integrations::LINEAR_GRAPHQL_URL;

use super::{build_issue_body, ForwardError, ForwardInput, ForwardSuccess};

pub(super) async fn forward(
    http: &reqwest::Client,
    tracker: &TrackerConfig,
    input: &ForwardInput<'_>,
) -> Result<ForwardSuccess, ForwardError> {
    let team_id = tracker
        .team_id
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ForwardError::Configuration("Linear integration has no team_id".into()))?;

    let endpoint = tracker.endpoint.as_deref().unwrap_or(LINEAR_GRAPHQL_URL);
    let body = build_issue_body(input);

    create_issue_at(
        http,
        endpoint,
        &tracker.api_token,
        team_id,
        &input.record.title,
        &body,
    )
    .await
}

/// Create one Linear issue against an explicit GraphQL endpoint.
async fn create_issue_at(
    http: &reqwest::Client,
    endpoint: &str,
    api_token: &str,
    team_id: &str,
    title: &str,
    body: &str,
) -> Result<ForwardSuccess, ForwardError> {
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
                "teamId": team_id,
                "title": title,
                "description": body,
            }
        }
    });

    let response = http
        .post(endpoint)
        .header("Authorization", api_token)
        .json(&request)
        .send()
        .await
        .map_err(|e| ForwardError::Transport(e.to_string()))?;

    let status = response.status();
    let reply: Value = response
        .json()
        .await
        .map_err(|e| ForwardError::Transport(e.to_string()))?;

    // GraphQL reports errors in the body even on HTTP 200
    if let Some(message) = reply.pointer("/errors/0/message").and_then(Value::as_str) {
        return Err(ForwardError::Transport(message.to_string()));
    }
    if !status.is_success() {
        return Err(ForwardError::Transport(format!(
            "HTTP {}",
            status.as_u16()
        )));
    }

    let issue = reply
        .pointer("/data/issueCreate/issue")
        .filter(|v| !v.is_null())
        .ok_or_else(|| {
            ForwardError::InvalidResponse("issueCreate returned no issue".to_string())
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

    Ok(ForwardSuccess {
        provider: "linear".to_string(),
        issue_id,
        issue_key,
        issue_url,
    })
}
