//! API models for the QuickBug ingestion and validation endpoints.
//!
//! This module defines the external contract of the ingestion service:
//! - `POST /api/ingest` accepts a multipart report and answers with an
//!   [`IngestResponse`]
//! - `GET /api/reports/{id}` returns the persisted [`ReportRecord`]
//! - `POST /api/validate-integration` takes a [`ValidateRequest`] and
//!   answers with a [`ValidateResponse`]
//!
//! # Ingest response
//!
//! The `forwarding` block is present only when a tracker integration was
//! attempted for the project:
//!
//! ```json
//! {
//!   "id": "0193e5a4-7c1b-7c3d-9b2a-6f1f00000000",
//!   "created_at": "2024-05-01T10:00:00Z",
//!   "forwarding": { "provider": "linear", "key": "ENG-123",
//!                   "url": "https://linear.app/acme/issue/ENG-123" }
//! }
//! ```
//!
//! or, when the tracker call failed after the report was stored:
//!
//! ```json
//! { "id": "…", "created_at": "…", "forwarding": { "error": "rate limited" } }
//! ```
//!
//! A 2xx status means exactly one thing: the report record was durably
//! stored. Forwarding outcome never changes the status code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// External tracker a project forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackerProvider {
    Linear,
    Jira,
}

impl TrackerProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackerProvider::Linear => "linear",
            TrackerProvider::Jira => "jira",
        }
    }
}

/// Tracker credentials and routing for one project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    pub provider: TrackerProvider,
    pub api_token: String,
    /// Linear team receiving the issues.
    #[serde(default)]
    pub team_id: Option<String>,
    /// Jira account email (Basic auth pair of the token).
    #[serde(default)]
    pub email: Option<String>,
    /// Jira site, e.g. "acme.atlassian.net".
    #[serde(default)]
    pub site_url: Option<String>,
    /// Jira project key, e.g. "ENG".
    #[serde(default)]
    pub project_key: Option<String>,
    /// Endpoint override (Linear GraphQL URL) for self-hosted or test use.
    #[serde(default)]
    pub endpoint: Option<String>,
}

/// A project registration: the unit a `project_key` resolves to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub integration: Option<TrackerConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Stored; forwarding (if configured) succeeded.
    Success,
    /// Stored; the forwarding attempt failed.
    Error,
    /// Stored; no forwarding outcome yet.
    Pending,
}

/// Server-persisted report row. Created by the ingest handler, mutated at
/// most once by the forwarding step, never deleted by this core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRecord {
    pub id: String,
    pub project_id: String,
    pub created_at: DateTime<Utc>,

    pub title: String,
    pub description: String,
    pub provider: String,
    pub capture_mode: String,
    pub status: ReportStatus,

    pub browser_name: String,
    pub os_name: String,
    pub device_type: String,
    pub screen_resolution: String,
    pub viewport: String,
    pub color_scheme: String,
    pub locale: String,
    pub timezone: String,
    pub connection_type: String,
    pub page_url: String,
    pub environment: String,
    #[serde(default)]
    pub user_agent: String,
    #[serde(default)]
    pub stopped_at: Option<String>,

    pub has_screenshot: bool,
    pub has_video: bool,
    pub has_console_logs: bool,
    pub has_network_logs: bool,
    pub js_error_count: u32,

    #[serde(default)]
    pub external_issue_id: Option<String>,
    #[serde(default)]
    pub external_issue_key: Option<String>,
    #[serde(default)]
    pub external_issue_url: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl ReportRecord {
    /// A fresh pending record with empty content fields.
    pub fn new(id: String, project_id: String) -> Self {
        Self {
            id,
            project_id,
            created_at: Utc::now(),
            title: String::new(),
            description: String::new(),
            provider: "cloud".to_string(),
            capture_mode: "none".to_string(),
            status: ReportStatus::Pending,
            browser_name: String::new(),
            os_name: String::new(),
            device_type: String::new(),
            screen_resolution: String::new(),
            viewport: String::new(),
            color_scheme: String::new(),
            locale: String::new(),
            timezone: String::new(),
            connection_type: String::new(),
            page_url: String::new(),
            environment: String::new(),
            user_agent: String::new(),
            stopped_at: None,
            has_screenshot: false,
            has_video: false,
            has_console_logs: false,
            has_network_logs: false,
            js_error_count: 0,
            external_issue_id: None,
            external_issue_key: None,
            external_issue_url: None,
            error_message: None,
        }
    }
}

/// Forwarding block of the ingest response. Success carries
/// provider/key/url; failure carries only `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForwardingOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forwarding: Option<ForwardingOutcome>,
}

/// Credential-check request. Field names follow the public JSON contract.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default)]
    pub project_key: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidateResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
    /// Flat error string kept for capture clients that only read `error`.
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub components: HashMap<String, String>,
    pub version: String,
}
