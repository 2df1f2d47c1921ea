//! Provider integrations for report submission.
//!
//! Every destination a report can be delivered to implements [`Integration`]:
//! one `submit` operation that turns a frozen [`BugReportPayload`] into a
//! provider-specific delivery and normalizes the outcome into a
//! [`SubmitResult`]. The capture UI depends only on this trait and never
//! special-cases providers.
//!
//! ## Key components
//!
//! - [`Integration`] — the capability trait all providers implement
//! - [`CloudIntegration`] — multipart delivery to the hosted ingestion service
//! - [`LinearIntegration`] — direct GraphQL issue creation
//! - [`JiraIntegration`] — delivery through server-side proxy endpoints
//! - [`IngestTransport`] — injectable transport used by the cloud provider

mod cloud;
mod jira;
mod linear;
mod transport;

pub use cloud::{CloudIntegration, CloudOptions, DEFAULT_INGEST_ENDPOINT};
pub(crate) use linear::truncate_chars;
pub use jira::{JiraIntegration, JiraOptions};
pub use linear::{LinearIntegration, LinearOptions, LINEAR_GRAPHQL_URL};
pub use transport::{
    FilePart, HttpTransport, IngestTransport, ReportForm, TransportResponse,
};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::BugReportPayload;

/// Named destination for a bug report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Cloud,
    Linear,
    Jira,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Cloud => "cloud",
            Provider::Linear => "linear",
            Provider::Jira => "jira",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized outcome of a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResult {
    pub provider: Provider,
    /// Internal identifier, always present.
    pub issue_id: String,
    /// Human-readable tracker key when forwarding completed, else a
    /// locally-synthesized short code. Always displayable.
    pub issue_key: String,
    /// Link to the tracker issue; `None` when forwarding did not happen.
    pub issue_url: Option<String>,
    /// Non-fatal problems, e.g. the report was stored but forwarding failed.
    pub warnings: Vec<String>,
}

/// Submission errors (spec distinguishes configuration from transport).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A required constructor field was missing. Raised before any network
    /// activity.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The request could not be completed (network failure or non-2xx).
    /// The only class that aborts a whole submission.
    #[error("transport error: {0}")]
    Transport(String),
    /// The server answered 2xx with a body we could not interpret.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Best-effort, fire-and-forget progress notification. Invoked synchronously
/// at defined points; callers must not treat it as a synchronization point.
pub type ProgressCallback<'a> = &'a (dyn Fn(&str) + Send + Sync);

/// Default progress callback that discards messages.
pub fn noop_progress(_message: &str) {}

/// The seam between the capture UI and all providers.
#[async_trait]
pub trait Integration: Send + Sync {
    fn provider(&self) -> Provider;

    /// Deliver one payload. Payloads are immutable; implementations must not
    /// clone-and-mutate them into a different report.
    async fn submit(
        &self,
        payload: &BugReportPayload,
        on_progress: ProgressCallback<'_>,
    ) -> Result<SubmitResult, ProviderError>;
}

/// Fallback issue key used when tracker forwarding did not produce one:
/// `QB-` plus the first 8 characters of the report id. Ids shorter than 8
/// characters are used whole, so the fallback stays deterministic for any id.
pub fn fallback_issue_key(issue_id: &str) -> String {
    let short: String = issue_id.chars().take(8).collect();
    format!("QB-{}", short)
}
