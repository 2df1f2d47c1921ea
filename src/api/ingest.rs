//! Report ingestion endpoints.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::forward::{self, ForwardInput};
use crate::integrations::FilePart;
use crate::storage::attachment_key;

use super::models::{
    ForwardingOutcome, HealthResponse, IngestResponse, ReportRecord, ReportStatus,
};
use super::state::AppState;

/// File part names accepted on the ingest form. Everything else is treated
/// as a scalar field.
const FILE_PART_NAMES: &[&str] = &["screenshot", "video", "network_logs", "console_logs", "metadata"];

/// Primary report ingestion endpoint (POST /api/ingest)
///
/// Accepts the multipart form produced by the capture client, stores the
/// report record and its attachments, then makes at most one forwarding
/// attempt to the project's tracker.
///
/// ## Flow:
/// 1. Walk multipart parts, enforcing the per-part upload limit
/// 2. Resolve `project_key` against the project registry (404 if unknown);
///    `project_key` is the only required field
/// 3. Generate a UUIDv7 report id
/// 4. Upload attachments to object storage under `attachments/{id}/`
/// 5. Persist the report record (Pending) to the ledger
/// 6. If the project has a tracker integration, forward once, bounded by
///    `forwarding.timeout_secs`, and write the outcome back onto the record
/// 7. Return 200 with the report id; forwarding failure is reported in the
///    `forwarding` block, never in the status code
pub async fn ingest_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    match ingest_inner(&state, multipart).await {
        Ok(response) => Ok((StatusCode::OK, Json(response))),
        Err(e) => {
            state.metrics.report_failed();
            Err(e)
        }
    }
}

async fn ingest_inner(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<IngestResponse, ApiError> {
    let max_part_bytes = state.config.server.max_upload_bytes.as_u64() as usize;

    let mut fields: HashMap<String, String> = HashMap::new();
    let mut parts: HashMap<String, FilePart> = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidPayload(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field
            .content_type()
            .map(str::to_owned)
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidPayload(format!("part '{name}': {e}")))?;

        if data.len() > max_part_bytes {
            return Err(ApiError::PayloadTooLarge(data.len()));
        }

        if FILE_PART_NAMES.contains(&name.as_str()) {
            parts.insert(
                name.clone(),
                FilePart {
                    file_name: file_name.unwrap_or_else(|| name.clone()),
                    name,
                    content_type,
                    data,
                },
            );
        } else {
            fields.insert(name, String::from_utf8_lossy(&data).into_owned());
        }
    }

    let project_key = fields
        .get("project_key")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::InvalidPayload("project_key is required".into()))?;

    let project = state
        .store
        .get_project(project_key)?
        .ok_or_else(|| ApiError::UnknownProject(project_key.clone()))?;

    // Time-sortable report id
    let report_id = Uuid::now_v7().to_string();

    let mut record = ReportRecord::new(report_id.clone(), project.key.clone());
    populate_record(&mut record, &fields, &parts);
    if project.integration.is_none() {
        // Nothing left to do for this report once it is stored
        record.status = ReportStatus::Success;
    }

    for file in parts.values() {
        let key = attachment_key(&report_id, &file.file_name);
        state
            .storage
            .upload(&key, file.data.to_vec())
            .await
            .map_err(|e| ApiError::Internal(format!("Attachment upload failed: {e}")))?;
    }

    state.store.put_report(&record)?;
    state
        .store
        .persist()
        .map_err(|e| ApiError::Internal(format!("Failed to persist report: {e}")))?;
    state.metrics.report_accepted();

    // The report is durable from here on; forwarding only annotates it.
    let forwarding = match &project.integration {
        Some(tracker) => Some(
            forward_stored_report(state, tracker, &mut record, &parts).await,
        ),
        None => None,
    };

    Ok(IngestResponse {
        id: report_id,
        created_at: record.created_at,
        forwarding,
    })
}

/// Copy scalar form fields onto the record. Attachment flags come from the
/// parts actually received, not from client-claimed fields.
fn populate_record(
    record: &mut ReportRecord,
    fields: &HashMap<String, String>,
    parts: &HashMap<String, FilePart>,
) {
    let get = |name: &str| fields.get(name).cloned().unwrap_or_default();

    // Title may be empty; the capture client always sends the field as-is.
    record.title = get("title");
    record.description = get("description");
    if let Some(mode) = fields.get("capture_mode").filter(|v| !v.is_empty()) {
        record.capture_mode = mode.clone();
    }
    record.browser_name = get("browser_name");
    record.os_name = get("os_name");
    record.device_type = get("device_type");
    record.screen_resolution = get("screen_resolution");
    record.viewport = get("viewport");
    record.color_scheme = get("color_scheme");
    record.locale = get("locale");
    record.timezone = get("timezone");
    record.connection_type = get("connection_type");
    record.page_url = get("page_url");
    record.environment = get("environment");
    record.user_agent = get("user_agent");
    record.stopped_at = fields.get("stopped_at").filter(|v| !v.is_empty()).cloned();

    record.js_error_count = fields
        .get("js_error_count")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    record.has_screenshot = parts.contains_key("screenshot");
    record.has_video = parts.contains_key("video");
    record.has_console_logs = parts.contains_key("console_logs");
    record.has_network_logs = parts.contains_key("network_logs");
}

/// One bounded forwarding attempt. Writes the outcome back onto the stored
/// record and returns the response block.
async fn forward_stored_report(
    state: &AppState,
    tracker: &super::models::TrackerConfig,
    record: &mut ReportRecord,
    parts: &HashMap<String, FilePart>,
) -> ForwardingOutcome {
    let text_of = |name: &str| {
        parts
            .get(name)
            .map(|p| String::from_utf8_lossy(&p.data).into_owned())
    };

    let input = ForwardInput {
        record,
        console_text: text_of("console_logs"),
        network_text: text_of("network_logs"),
        screenshot: parts.get("screenshot").cloned(),
        video: parts.get("video").cloned(),
    };

    let timeout = Duration::from_secs(state.config.forwarding.timeout_secs);
    let outcome = forward::run(&state.http, tracker, input, timeout).await;

    let block = match outcome {
        Ok(success) => {
            record.status = ReportStatus::Success;
            record.external_issue_id = Some(success.issue_id.clone());
            record.external_issue_key = Some(success.issue_key.clone());
            record.external_issue_url = success.issue_url.clone();
            state.metrics.forward_succeeded();
            ForwardingOutcome {
                provider: Some(success.provider),
                key: Some(success.issue_key),
                url: success.issue_url,
                error: None,
            }
        }
        Err(e) => {
            record.status = ReportStatus::Error;
            record.error_message = Some(e.to_string());
            state.metrics.forward_failed();
            ForwardingOutcome {
                error: Some(e.to_string()),
                ..ForwardingOutcome::default()
            }
        }
    };

    // Write-back failures are logged, not surfaced: the report itself is
    // already stored and the client already has its id.
    if let Err(e) = state.store.put_report(record) {
        tracing::error!(report_id = %record.id, error = %e, "Failed to record forwarding outcome");
    } else if let Err(e) = state.store.persist() {
        tracing::error!(report_id = %record.id, error = %e, "Failed to persist forwarding outcome");
    }

    block
}

/// Report lookup endpoint (GET /api/reports/{report_id})
pub async fn get_report(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state
        .store
        .get_report(&report_id)?
        .ok_or_else(|| ApiError::NotFound(format!("report {report_id}")))?;

    Ok((StatusCode::OK, Json(record)))
}

/// Health check endpoint (GET /health)
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let mut components = HashMap::new();

    components.insert("api".to_string(), "healthy".to_string());
    components.insert(
        "ledger".to_string(),
        match state.store.stats() {
            Ok(_) => "healthy".to_string(),
            Err(_) => "unhealthy".to_string(),
        },
    );
    components.insert("storage".to_string(), "healthy".to_string());

    let all_healthy = components.values().all(|status| status == "healthy");
    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "unhealthy" }.to_string(),
        components,
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (status_code, Json(response))
}
