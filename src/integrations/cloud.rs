//! Cloud integration: multipart delivery to the hosted ingestion service.
//!
//! This is the provider with real protocol weight. It turns a payload into
//! one `POST /api/ingest` multipart request, and reconciles the server's
//! response — report id plus optional tracker-forwarding outcome — into a
//! [`SubmitResult`]. Report persistence and tracker forwarding are
//! deliberately decoupled: a forwarding failure reported by the server
//! becomes a warning, never a failed submission.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::capture::{combined_console_attachment, format_network_logs, BugReportPayload};
use crate::capture::{DerivedMetadata, EnvProbe};

use super::transport::{HttpTransport, IngestTransport, ReportForm, TransportResponse};
use super::{
    fallback_issue_key, Integration, ProgressCallback, Provider, ProviderError, SubmitResult,
};

pub const DEFAULT_INGEST_ENDPOINT: &str = "/api/ingest";

/// Constructor options. `project_key` is the only required field.
pub struct CloudOptions {
    pub project_key: String,
    /// Ingestion endpoint; defaults to [`DEFAULT_INGEST_ENDPOINT`].
    pub endpoint: Option<String>,
    /// Delivery override for proxying, injected auth headers, or tests.
    pub transport: Option<Arc<dyn IngestTransport>>,
    /// Runtime environment snapshot; defaults to an empty probe.
    pub probe: Option<EnvProbe>,
}

impl CloudOptions {
    pub fn new(project_key: impl Into<String>) -> Self {
        Self {
            project_key: project_key.into(),
            endpoint: None,
            transport: None,
            probe: None,
        }
    }
}

pub struct CloudIntegration {
    project_key: String,
    endpoint: String,
    transport: Arc<dyn IngestTransport>,
    probe: EnvProbe,
}

impl std::fmt::Debug for CloudIntegration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudIntegration")
            .field("project_key", &self.project_key)
            .field("endpoint", &self.endpoint)
            .field("probe", &self.probe)
            .finish_non_exhaustive()
    }
}

/// Wire shape of a successful ingest response.
#[derive(Debug, Deserialize)]
struct IngestReply {
    id: String,
    #[allow(dead_code)]
    created_at: String,
    #[serde(default)]
    forwarding: Option<ForwardingReply>,
}

#[derive(Debug, Deserialize)]
struct ForwardingReply {
    #[serde(default)]
    #[allow(dead_code)]
    provider: Option<String>,
    #[serde(default)]
    key: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorReply {
    error: Option<String>,
}

impl CloudIntegration {
    /// Fails fast when `project_key` is missing; no network activity happens
    /// before or during construction.
    pub fn new(options: CloudOptions) -> Result<Self, ProviderError> {
        if options.project_key.trim().is_empty() {
            return Err(ProviderError::Configuration(
                "CloudIntegration: project_key is required".to_string(),
            ));
        }

        let transport = match options.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new()?),
        };

        Ok(Self {
            project_key: options.project_key,
            endpoint: options
                .endpoint
                .unwrap_or_else(|| DEFAULT_INGEST_ENDPOINT.to_string()),
            transport,
            probe: options.probe.unwrap_or_default(),
        })
    }

    /// Assemble the multipart form for one payload. Attachment parts are
    /// added only when the corresponding sequence is non-empty, so absence
    /// of a part is exactly what the `has_*` flags claim.
    fn build_form(&self, payload: &BugReportPayload) -> ReportForm {
        let user_agent = payload
            .user_agent
            .clone()
            .or_else(|| self.probe.user_agent.clone())
            .unwrap_or_default();

        let derived = DerivedMetadata::collect(&EnvProbe {
            user_agent: Some(user_agent.clone()),
            ..self.probe.clone()
        });

        let mut form = ReportForm::new();
        form.field("project_key", &self.project_key);
        form.field("title", &payload.title);
        form.field("description", &payload.description);
        form.field("provider", Provider::Cloud.as_str());
        form.field("capture_mode", payload.capture_mode.as_str());
        form.field("has_screenshot", payload.screenshot.is_some().to_string());
        form.field("has_video", payload.video.is_some().to_string());
        form.field(
            "has_network_logs",
            (!payload.network_logs.is_empty()).to_string(),
        );
        form.field(
            "has_console_logs",
            (!payload.console_logs.is_empty()).to_string(),
        );
        form.field("js_error_count", payload.js_errors.len().to_string());
        form.field("user_agent", user_agent);
        form.field("browser_name", derived.browser_name);
        form.field("os_name", derived.os_name);
        form.field("device_type", derived.device_type);
        form.field("screen_resolution", derived.screen_resolution);
        form.field("viewport", derived.viewport);
        let color_scheme = if payload.metadata.color_scheme == "unknown" {
            ""
        } else {
            payload.metadata.color_scheme.as_str()
        };
        form.field("color_scheme", color_scheme);
        form.field("locale", &payload.metadata.locale);
        form.field("timezone", &payload.metadata.timezone);
        form.field(
            "connection_type",
            payload
                .metadata
                .connection
                .as_ref()
                .map(|c| c.effective_type.clone())
                .unwrap_or_default(),
        );
        form.field("page_url", &payload.page_url);
        form.field("environment", derived.environment);
        form.field(
            "stopped_at",
            payload
                .stopped_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_default(),
        );

        if let Some(screenshot) = &payload.screenshot {
            form.part("screenshot", "bug-screenshot.png", "image/png", screenshot.clone());
        }
        if let Some(video) = &payload.video {
            form.part("video", "bug-recording.webm", "video/webm", video.clone());
        }
        if !payload.network_logs.is_empty() {
            form.part(
                "network_logs",
                "network-logs.txt",
                "text/plain",
                Bytes::from(format_network_logs(&payload.network_logs)),
            );
        }
        if let Some(text) =
            combined_console_attachment(&payload.js_errors, &payload.console_logs)
        {
            form.part("console_logs", "console-logs.txt", "text/plain", Bytes::from(text));
        }

        // Client metadata snapshot always travels with the report.
        let metadata_json = serde_json::to_vec_pretty(&payload.metadata)
            .unwrap_or_else(|_| b"{}".to_vec());
        form.part(
            "metadata",
            "client-metadata.json",
            "application/json",
            Bytes::from(metadata_json),
        );

        form
    }

    fn interpret(&self, response: TransportResponse) -> Result<SubmitResult, ProviderError> {
        if !response.is_success() {
            let message = serde_json::from_slice::<ErrorReply>(&response.body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            return Err(ProviderError::Transport(message));
        }

        let reply: IngestReply = serde_json::from_slice(&response.body)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        // The server reports forwarding; the client never computes it.
        let forwarding = reply.forwarding;
        let issue_key = forwarding
            .as_ref()
            .and_then(|f| f.key.clone())
            .unwrap_or_else(|| fallback_issue_key(&reply.id));
        let issue_url = forwarding.as_ref().and_then(|f| f.url.clone());
        let warnings = forwarding
            .as_ref()
            .and_then(|f| f.error.as_ref())
            .map(|e| vec![format!("Forwarding: {}", e)])
            .unwrap_or_default();

        Ok(SubmitResult {
            provider: Provider::Cloud,
            issue_id: reply.id,
            issue_key,
            issue_url,
            warnings,
        })
    }
}

#[async_trait]
impl Integration for CloudIntegration {
    fn provider(&self) -> Provider {
        Provider::Cloud
    }

    async fn submit(
        &self,
        payload: &BugReportPayload,
        on_progress: ProgressCallback<'_>,
    ) -> Result<SubmitResult, ProviderError> {
        on_progress("Preparing report…");
        let form = self.build_form(payload);

        on_progress("Sending report…");
        debug!(endpoint = %self.endpoint, parts = form.parts().len(), "Submitting report");
        let response = self.transport.send(&self.endpoint, form).await?;

        let result = self.interpret(response)?;
        on_progress("Report submitted.");
        Ok(result)
    }
}
