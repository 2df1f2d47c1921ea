//! Server-side forwarding of stored reports to external trackers.
//!
//! Forwarding happens inside the ingest request, after the report record and
//! its attachments are durably stored. One attempt, bounded by
//! `forwarding.timeout_secs`; the outcome is written back onto the record but
//! never changes the ingest status code.

mod jira;
mod linear;

pub use jira::jira_base_url;

use std::time::Duration;

use thiserror::Error;
use tracing::{info, warn};

use crate::api::models::{ReportRecord, TrackerConfig, TrackerProvider};
use crate::integrations::{truncate_chars, FilePart};

/// Truncation bound for log excerpts embedded in forwarded issue bodies.
const MAX_EMBEDDED_LOG_CHARS: usize = 4000;

#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("{0}")]
    Configuration(String),
    #[error("{0}")]
    Transport(String),
    #[error("{0}")]
    InvalidResponse(String),
    #[error("tracker did not respond within {0}s")]
    Timeout(u64),
}

/// Successful tracker handoff.
#[derive(Debug, Clone)]
pub struct ForwardSuccess {
    pub provider: String,
    pub issue_id: String,
    pub issue_key: String,
    pub issue_url: Option<String>,
}

/// Everything the forwarder needs from one ingested report.
pub struct ForwardInput<'a> {
    pub record: &'a ReportRecord,
    /// Preformatted console/error log text, as uploaded by the capture client.
    pub console_text: Option<String>,
    pub network_text: Option<String>,
    pub screenshot: Option<FilePart>,
    pub video: Option<FilePart>,
}

/// Forward one report to the project's tracker, bounded by `timeout`.
pub async fn run(
    http: &reqwest::Client,
    tracker: &TrackerConfig,
    input: ForwardInput<'_>,
    timeout: Duration,
) -> Result<ForwardSuccess, ForwardError> {
    let report_id = &input.record.id;
    info!(
        %report_id,
        provider = tracker.provider.as_str(),
        "Forwarding report to tracker"
    );

    let attempt = dispatch(http, tracker, &input);
    match tokio::time::timeout(timeout, attempt).await {
        Ok(Ok(success)) => {
            info!(%report_id, issue_key = %success.issue_key, "Tracker issue created");
            Ok(success)
        }
        Ok(Err(e)) => {
            warn!(%report_id, error = %e, "Tracker forwarding failed");
            Err(e)
        }
        Err(_) => {
            warn!(%report_id, "Tracker forwarding timed out");
            Err(ForwardError::Timeout(timeout.as_secs()))
        }
    }
}

async fn dispatch(
    http: &reqwest::Client,
    tracker: &TrackerConfig,
    input: &ForwardInput<'_>,
) -> Result<ForwardSuccess, ForwardError> {
    match tracker.provider {
        TrackerProvider::Linear => linear::forward(http, tracker, input).await,
        TrackerProvider::Jira => jira::forward(http, tracker, input).await,
    }
}

/// Markdown issue body built from the stored record plus the log attachments
/// the capture client uploaded: description, environment list, log excerpts.
fn build_issue_body(input: &ForwardInput<'_>) -> String {
    let record = input.record;
    let mut body = String::new();

    if !record.description.is_empty() {
        body.push_str(&record.description);
        body.push_str("\n\n");
    }

    body.push_str("### Environment\n");
    body.push_str(&format!("- Browser: {}\n", record.browser_name));
    body.push_str(&format!("- OS: {}\n", record.os_name));
    if !record.page_url.is_empty() {
        body.push_str(&format!("- Page: {}\n", record.page_url));
    }
    if !record.viewport.is_empty() {
        body.push_str(&format!("- Viewport: {}\n", record.viewport));
    }
    body.push_str(&format!("- Capture: {}\n", record.capture_mode));

    if let Some(console) = input.console_text.as_deref().filter(|t| !t.is_empty()) {
        body.push_str("\n### Logs\n```\n");
        body.push_str(&truncate_chars(console, MAX_EMBEDDED_LOG_CHARS));
        body.push_str("\n```\n");
    }
    if let Some(network) = input.network_text.as_deref().filter(|t| !t.is_empty()) {
        body.push_str("\n### Network\n```\n");
        body.push_str(&truncate_chars(network, MAX_EMBEDDED_LOG_CHARS));
        body.push_str("\n```\n");
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input(record: &ReportRecord) -> ForwardInput<'_> {
        ForwardInput {
            record,
            console_text: Some("[2024-05-01T10:00:00Z] [ERROR] boom".to_string()),
            network_text: None,
            screenshot: None,
            video: None,
        }
    }

    #[test]
    fn issue_body_lists_environment_and_logs() {
        let mut record = ReportRecord::new("r-1".to_string(), "pk".to_string());
        record.description = "Clicking save does nothing".to_string();
        record.browser_name = "Firefox".to_string();
        record.os_name = "Linux".to_string();
        record.page_url = "https://app.example.com/settings".to_string();
        record.viewport = "1280x720".to_string();
        record.capture_mode = "screenshot".to_string();

        let body = build_issue_body(&sample_input(&record));

        assert!(body.starts_with("Clicking save does nothing"));
        assert!(body.contains("- Browser: Firefox"));
        assert!(body.contains("- Page: https://app.example.com/settings"));
        assert!(body.contains("### Logs"));
        assert!(body.contains("[ERROR] boom"));
        assert!(!body.contains("### Network"));
    }

    #[test]
    fn empty_log_text_is_skipped() {
        let record = ReportRecord::new("r-2".to_string(), "pk".to_string());
        let input = ForwardInput {
            record: &record,
            console_text: Some(String::new()),
            network_text: Some(String::new()),
            screenshot: None,
            video: None,
        };

        let body = build_issue_body(&input);
        assert!(!body.contains("### Logs"));
        assert!(!body.contains("### Network"));
    }
}
