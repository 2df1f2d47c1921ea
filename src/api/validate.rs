//! Tracker credential validation endpoint.
//!
//! `POST /api/validate-integration` lets the dashboard test credentials
//! before saving them. The response is always a `{ valid, message?/error? }`
//! body; credential problems are reported with `valid: false`, not with an
//! error status.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};

use crate::forward::jira_base_url;
use crate::integrations::LINEAR_GRAPHQL_URL;

use super::models::{ValidateRequest, ValidateResponse};
use super::state::AppState;

/// POST /api/validate-integration
pub async fn validate_integration(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> impl IntoResponse {
    let provider = request.provider.as_deref().unwrap_or_default();
    let api_token = request.api_token.as_deref().unwrap_or_default();

    if provider.is_empty() || api_token.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ValidateResponse::fail("Missing provider or API token.")),
        );
    }

    let result = match provider {
        "jira" => {
            validate_jira(
                &state.http,
                api_token,
                request.email.as_deref(),
                request.site_url.as_deref(),
                request.project_key.as_deref(),
            )
            .await
        }
        "linear" => {
            validate_linear_at(
                &state.http,
                LINEAR_GRAPHQL_URL,
                api_token,
                request.team_id.as_deref(),
            )
            .await
        }
        other => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ValidateResponse::fail(format!("Unknown provider: {other}"))),
            );
        }
    };

    match result {
        Ok(response) => (StatusCode::OK, Json(response)),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ValidateResponse::fail(e)),
        ),
    }
}

/// Two-step Jira check: authenticate via `/myself`, then confirm the project
/// is visible when a key was given.
async fn validate_jira(
    http: &reqwest::Client,
    api_token: &str,
    email: Option<&str>,
    site_url: Option<&str>,
    project_key: Option<&str>,
) -> Result<ValidateResponse, String> {
    let (Some(email), Some(site_url)) = (
        email.filter(|v| !v.is_empty()),
        site_url.filter(|v| !v.is_empty()),
    ) else {
        return Ok(ValidateResponse::fail("Jira requires email and site URL."));
    };

    let base = jira_base_url(site_url);
    validate_jira_at(http, &base, email, api_token, project_key).await
}

/// Same check against an explicit base URL.
async fn validate_jira_at(
    http: &reqwest::Client,
    base: &str,
    email: &str,
    api_token: &str,
    project_key: Option<&str>,
) -> Result<ValidateResponse, String> {
    let me_response = http
        .get(format!("{base}/rest/api/3/myself"))
        .basic_auth(email, Some(api_token))
        .header("Accept", "application/json")
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = me_response.status();
    if !status.is_success() {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(ValidateResponse::fail(
                "Authentication failed. Check your email and API token.",
            ));
        }
        let text = me_response.text().await.unwrap_or_default();
        let excerpt: String = text.chars().take(200).collect();
        return Ok(ValidateResponse::fail(format!(
            "Jira returned {}: {}",
            status.as_u16(),
            excerpt
        )));
    }

    let me: Value = me_response.json().await.map_err(|e| e.to_string())?;

    if let Some(key) = project_key.filter(|v| !v.is_empty()) {
        let project_response = http
            .get(format!("{base}/rest/api/3/project/{key}"))
            .basic_auth(email, Some(api_token))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !project_response.status().is_success() {
            return Ok(ValidateResponse::fail(format!(
                "Project \"{key}\" not found or not accessible. Check the project key."
            )));
        }
    }

    let display_name = me
        .get("displayName")
        .and_then(Value::as_str)
        .or_else(|| me.get("emailAddress").and_then(Value::as_str))
        .unwrap_or(email);

    let message = match project_key.filter(|v| !v.is_empty()) {
        Some(key) => format!("Authenticated as {display_name} · Project {key} accessible"),
        None => format!("Authenticated as {display_name}"),
    };
    Ok(ValidateResponse::ok(message))
}

/// Linear check: a viewer query proves the key works, then an optional team
/// lookup confirms the configured team exists.
async fn validate_linear_at(
    http: &reqwest::Client,
    endpoint: &str,
    api_token: &str,
    team_id: Option<&str>,
) -> Result<ValidateResponse, String> {
    let viewer_response = http
        .post(endpoint)
        .header("Authorization", api_token)
        .json(&json!({ "query": "{ viewer { id name email } }" }))
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if !viewer_response.status().is_success() {
        return Ok(ValidateResponse::fail(
            "Authentication failed. Check your Linear API key.",
        ));
    }

    let body: Value = viewer_response.json().await.map_err(|e| e.to_string())?;
    let Some(viewer) = body.pointer("/data/viewer").filter(|v| !v.is_null()) else {
        return Ok(ValidateResponse::fail("Could not verify Linear credentials."));
    };

    if let Some(team_id) = team_id.filter(|v| !v.is_empty()) {
        let team_query = format!("{{ team(id: \"{team_id}\") {{ id name }} }}");
        let team_response = http
            .post(endpoint)
            .header("Authorization", api_token)
            .json(&json!({ "query": team_query }))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let team_body: Value = team_response.json().await.map_err(|e| e.to_string())?;
        if team_body
            .pointer("/data/team")
            .filter(|v| !v.is_null())
            .is_none()
        {
            return Ok(ValidateResponse::fail(format!(
                "Team ID \"{team_id}\" not found."
            )));
        }
    }

    let name = viewer
        .get("name")
        .and_then(Value::as_str)
        .or_else(|| viewer.get("email").and_then(Value::as_str))
        .unwrap_or("unknown");
    Ok(ValidateResponse::ok(format!("Authenticated as {name}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn jira_unauthorized_maps_to_friendly_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/myself"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        // A failed authentication must short-circuit the project check
        Mock::given(method("GET"))
            .and(path("/rest/api/3/project/ENG"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "key": "ENG" })))
            .expect(0)
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let response = validate_jira_at(&http, &server.uri(), "a@b.c", "bad", Some("ENG"))
            .await
            .unwrap();

        assert!(!response.valid);
        assert_eq!(
            response.error.as_deref(),
            Some("Authentication failed. Check your email and API token.")
        );
    }

    #[tokio::test]
    async fn jira_validates_project_visibility() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/myself"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "displayName": "Dana" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/project/ENG"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let response = validate_jira_at(&http, &server.uri(), "a@b.c", "tok", Some("ENG"))
            .await
            .unwrap();

        assert!(!response.valid);
        assert!(response.error.unwrap().contains("Project \"ENG\" not found"));
    }

    #[tokio::test]
    async fn jira_success_reports_display_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/myself"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "displayName": "Dana" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/api/3/project/ENG"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "key": "ENG" })))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let response = validate_jira_at(&http, &server.uri(), "a@b.c", "tok", Some("ENG"))
            .await
            .unwrap();

        assert!(response.valid);
        assert_eq!(
            response.message.as_deref(),
            Some("Authenticated as Dana · Project ENG accessible")
        );
    }

    #[tokio::test]
    async fn linear_missing_team_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("viewer"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "viewer": { "id": "u1", "name": "Dana" } }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("team(id:"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "team": null }
            })))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let response = validate_linear_at(&http, &server.uri(), "key", Some("team-404"))
            .await
            .unwrap();

        assert!(!response.valid);
        assert_eq!(
            response.error.as_deref(),
            Some("Team ID \"team-404\" not found.")
        );
    }

    #[tokio::test]
    async fn linear_success_without_team_check() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "viewer": { "id": "u1", "name": "Dana" } }
            })))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let response = validate_linear_at(&http, &server.uri(), "key", None)
            .await
            .unwrap();

        assert!(response.valid);
        assert_eq!(response.message.as_deref(), Some("Authenticated as Dana"));
    }

    #[tokio::test]
    async fn linear_rejected_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let response = validate_linear_at(&http, &server.uri(), "bad", None)
            .await
            .unwrap();

        assert!(!response.valid);
        assert_eq!(
            response.error.as_deref(),
            Some("Authentication failed. Check your Linear API key.")
        );
    }
}
