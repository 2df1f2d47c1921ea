//! Payload types produced by the capture UI.
//!
//! A payload is created once, frozen at submit time, and consumed by exactly
//! one integration. Integrations take `&BugReportPayload` and must not
//! mutate it; there is deliberately no builder that allows appending after
//! submission.
//!
//! A minimal payload serialized as JSON:
//!
//! ```json
//! {
//!   "title": "Button broken",
//!   "description": "Clicking save does nothing",
//!   "capture_mode": "screenshot",
//!   "console_logs": [
//!     { "level": "error", "message": "TypeError: x is undefined",
//!       "timestamp": "2024-05-01T10:00:00Z" }
//!   ],
//!   "js_errors": [],
//!   "network_logs": [],
//!   "metadata": { "color_scheme": "dark", "locale": "en-US",
//!                 "timezone": "Europe/Berlin" },
//!   "page_url": "https://app.example.com/settings"
//! }
//! ```

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which media was recorded alongside the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureMode {
    Screenshot,
    Video,
    None,
}

impl CaptureMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CaptureMode::Screenshot => "screenshot",
            CaptureMode::Video => "video",
            CaptureMode::None => "none",
        }
    }
}

/// One console line captured during the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleEntry {
    pub level: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// One uncaught JS error (or unhandled rejection) captured during the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsErrorEntry {
    pub message: String,
    #[serde(default)]
    pub stack: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    pub timestamp: DateTime<Utc>,
}

/// One network request observed during the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Network connection details, when the runtime exposes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub effective_type: String,
    #[serde(default)]
    pub downlink_mbps: Option<f64>,
    #[serde(default)]
    pub rtt_ms: Option<u32>,
}

/// Client metadata snapshot taken at submit time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMetadata {
    pub color_scheme: String,
    pub locale: String,
    pub timezone: String,
    #[serde(default)]
    pub connection: Option<ConnectionInfo>,
}

impl Default for ClientMetadata {
    fn default() -> Self {
        Self {
            color_scheme: "unknown".to_string(),
            locale: String::new(),
            timezone: String::new(),
            connection: None,
        }
    }
}

/// A captured bug report, frozen at submit time.
///
/// `screenshot` and `video` are mutually optional; at most one capture mode
/// is active per report. Log sequences preserve capture order.
#[derive(Debug, Clone)]
pub struct BugReportPayload {
    pub title: String,
    pub description: String,
    pub capture_mode: CaptureMode,
    pub screenshot: Option<Bytes>,
    pub video: Option<Bytes>,
    pub console_logs: Vec<ConsoleEntry>,
    pub js_errors: Vec<JsErrorEntry>,
    pub network_logs: Vec<NetworkEntry>,
    pub metadata: ClientMetadata,
    pub page_url: String,
    pub user_agent: Option<String>,
    pub stopped_at: Option<DateTime<Utc>>,
}

impl BugReportPayload {
    /// An empty report with just a title, for callers that capture nothing.
    pub fn bare(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            capture_mode: CaptureMode::None,
            screenshot: None,
            video: None,
            console_logs: Vec::new(),
            js_errors: Vec::new(),
            network_logs: Vec::new(),
            metadata: ClientMetadata::default(),
            page_url: String::new(),
            user_agent: None,
            stopped_at: None,
        }
    }
}
