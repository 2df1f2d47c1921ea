//! End-to-end submission scenario for the cloud provider, driven entirely
//! through the public API with a recording transport.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{TimeZone, Utc};
use std::sync::{Arc, Mutex};

use quickbug::capture::{
    BugReportPayload, CaptureMode, ClientMetadata, ConnectionInfo, ConsoleEntry, EnvProbe,
    JsErrorEntry, NetworkEntry,
};
use quickbug::integrations::{
    CloudIntegration, CloudOptions, Integration, IngestTransport, Provider, ProviderError,
    ReportForm, TransportResponse,
};

/// Records every request and answers with a canned ingest reply.
struct SpyTransport {
    requests: Mutex<Vec<(String, ReportForm)>>,
    reply: &'static str,
}

impl SpyTransport {
    fn replying(reply: &'static str) -> Arc<Self> {
        Arc::new(Self {
            requests: Mutex::new(Vec::new()),
            reply,
        })
    }

    fn single_request(&self) -> (String, ReportForm) {
        let requests = self.requests.lock().unwrap();
        assert_eq!(requests.len(), 1, "expected exactly one ingest request");
        requests[0].clone()
    }
}

#[async_trait]
impl IngestTransport for SpyTransport {
    async fn send(
        &self,
        endpoint: &str,
        form: ReportForm,
    ) -> Result<TransportResponse, ProviderError> {
        self.requests
            .lock()
            .unwrap()
            .push((endpoint.to_string(), form));
        Ok(TransportResponse {
            status: 200,
            body: Bytes::from_static(self.reply.as_bytes()),
        })
    }
}

fn ts(seconds: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, seconds).unwrap()
}

/// A fully populated report, as a desktop Firefox session would produce it.
fn full_payload() -> BugReportPayload {
    let mut payload = BugReportPayload::bare("Checkout fails on save");
    payload.description = "Pressing save on the checkout page does nothing".to_string();
    payload.capture_mode = CaptureMode::Screenshot;
    payload.screenshot = Some(Bytes::from_static(b"\x89PNG\r\n"));
    payload.page_url = "https://shop.example.com/checkout".to_string();
    payload.user_agent =
        Some("Mozilla/5.0 (X11; Linux x86_64; rv:125.0) Gecko/20100101 Firefox/125.0".to_string());
    payload.metadata = ClientMetadata {
        color_scheme: "dark".to_string(),
        locale: "de-DE".to_string(),
        timezone: "Europe/Berlin".to_string(),
        connection: Some(ConnectionInfo {
            effective_type: "4g".to_string(),
            downlink_mbps: Some(10.0),
            rtt_ms: Some(50),
        }),
    };
    payload.console_logs.push(ConsoleEntry {
        level: "warn".to_string(),
        message: "deprecated API".to_string(),
        timestamp: ts(1),
    });
    payload.js_errors.push(JsErrorEntry {
        message: "TypeError: order is undefined".to_string(),
        stack: Some("at submit (checkout.js:42)".to_string()),
        source: Some("checkout.js".to_string()),
        line: Some(42),
        timestamp: ts(2),
    });
    payload.network_logs.push(NetworkEntry {
        method: "POST".to_string(),
        url: "https://shop.example.com/api/orders".to_string(),
        status: Some(500),
        duration_ms: Some(230),
        error: None,
        timestamp: ts(3),
    });
    payload
}

fn integration(transport: Arc<SpyTransport>, probe: Option<EnvProbe>) -> CloudIntegration {
    let mut options = CloudOptions::new("pk_live_checkout");
    options.transport = Some(transport);
    options.probe = probe;
    CloudIntegration::new(options).unwrap()
}

#[tokio::test]
async fn full_report_submission_round_trip() {
    let transport = SpyTransport::replying(
        r#"{"id":"0193e5a4-7c1b-7c3d-9b2a-6f1f00000000",
            "created_at":"2024-05-01T10:00:05Z",
            "forwarding":{"provider":"linear","key":"SHOP-9",
                          "url":"https://linear.app/acme/issue/SHOP-9"}}"#,
    );
    let probe = EnvProbe {
        screen: Some((2560, 1440)),
        viewport: Some((1280, 720)),
        hostname: Some("shop.example.com".to_string()),
        ..EnvProbe::default()
    };
    let integration = integration(transport.clone(), Some(probe));

    let result = integration
        .submit(&full_payload(), &|_| {})
        .await
        .unwrap();

    assert!(matches!(result.provider, Provider::Cloud));
    assert_eq!(result.issue_id, "0193e5a4-7c1b-7c3d-9b2a-6f1f00000000");
    assert_eq!(result.issue_key, "SHOP-9");
    assert_eq!(
        result.issue_url.as_deref(),
        Some("https://linear.app/acme/issue/SHOP-9")
    );
    assert!(result.warnings.is_empty());

    let (endpoint, form) = transport.single_request();
    assert_eq!(endpoint, "/api/ingest");

    // Scalar fields carry the payload plus derived metadata
    assert_eq!(form.field_value("project_key"), Some("pk_live_checkout"));
    assert_eq!(form.field_value("title"), Some("Checkout fails on save"));
    assert_eq!(form.field_value("provider"), Some("cloud"));
    assert_eq!(form.field_value("capture_mode"), Some("screenshot"));
    assert_eq!(form.field_value("browser_name"), Some("Firefox"));
    assert_eq!(form.field_value("os_name"), Some("Linux"));
    assert_eq!(form.field_value("device_type"), Some("desktop"));
    assert_eq!(form.field_value("screen_resolution"), Some("2560x1440"));
    assert_eq!(form.field_value("viewport"), Some("1280x720"));
    assert_eq!(form.field_value("environment"), Some("production"));
    assert_eq!(form.field_value("color_scheme"), Some("dark"));
    assert_eq!(form.field_value("locale"), Some("de-DE"));
    assert_eq!(form.field_value("timezone"), Some("Europe/Berlin"));
    assert_eq!(form.field_value("connection_type"), Some("4g"));
    assert_eq!(form.field_value("js_error_count"), Some("1"));
    assert_eq!(form.field_value("has_screenshot"), Some("true"));
    assert_eq!(form.field_value("has_video"), Some("false"));

    // One part per non-empty attachment, plus the metadata snapshot
    assert!(form.has_part("screenshot"));
    assert!(!form.has_part("video"));
    assert!(form.has_part("console_logs"));
    assert!(form.has_part("network_logs"));
    assert!(form.has_part("metadata"));

    let network = form
        .parts()
        .iter()
        .find(|p| p.name == "network_logs")
        .unwrap();
    let text = std::str::from_utf8(&network.data).unwrap();
    assert!(text.contains("POST https://shop.example.com/api/orders -> 500"));

    let metadata = form.parts().iter().find(|p| p.name == "metadata").unwrap();
    let snapshot: serde_json::Value = serde_json::from_slice(&metadata.data).unwrap();
    assert_eq!(
        snapshot.get("color_scheme").and_then(|v| v.as_str()),
        Some("dark")
    );
}

#[tokio::test]
async fn progress_is_observable_from_outside() {
    let transport = SpyTransport::replying(
        r#"{"id":"r-progress","created_at":"2024-05-01T10:00:00Z"}"#,
    );
    let integration = integration(transport, None);

    let seen: Mutex<Vec<String>> = Mutex::new(Vec::new());
    let progress = |message: &str| seen.lock().unwrap().push(message.to_string());

    let result = integration
        .submit(&BugReportPayload::bare("Minimal"), &progress)
        .await
        .unwrap();

    // No forwarding block: key falls back to the QB- prefix
    assert_eq!(result.issue_key, "QB-r-progre");
    assert_eq!(
        *seen.lock().unwrap(),
        vec!["Preparing report…", "Sending report…", "Report submitted."]
    );
}
