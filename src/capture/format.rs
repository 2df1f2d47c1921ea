//! Formatters that turn structured log entries into attachment text.
//!
//! All formatters are deterministic and order-preserving: attachment order
//! equals capture order. Callers are responsible for omitting the attachment
//! entirely when the input sequence is empty — no formatter is ever invoked
//! to produce an empty block.

use super::payload::{ConsoleEntry, JsErrorEntry, NetworkEntry};

const JS_ERRORS_HEADER: &str = "=== JavaScript Errors ===";
const CONSOLE_HEADER: &str = "=== Console Output ===";

/// Render console entries as one line per entry.
pub fn format_console_logs(entries: &[ConsoleEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            format!(
                "[{}] [{}] {}",
                e.timestamp.to_rfc3339(),
                e.level.to_uppercase(),
                e.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render JS errors with their stack traces and source locations.
pub fn format_js_errors(entries: &[JsErrorEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            let mut block = format!("[{}] {}", e.timestamp.to_rfc3339(), e.message);
            if let Some(source) = &e.source {
                match e.line {
                    Some(line) => block.push_str(&format!("\n  at {}:{}", source, line)),
                    None => block.push_str(&format!("\n  at {}", source)),
                }
            }
            if let Some(stack) = &e.stack {
                block.push('\n');
                block.push_str(stack);
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render network entries as one line per request.
pub fn format_network_logs(entries: &[NetworkEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            let outcome = match (e.status, &e.error) {
                (Some(status), _) => status.to_string(),
                (None, Some(err)) => format!("failed: {}", err),
                (None, None) => "pending".to_string(),
            };
            let duration = e
                .duration_ms
                .map(|ms| format!(" ({}ms)", ms))
                .unwrap_or_default();
            format!(
                "[{}] {} {} -> {}{}",
                e.timestamp.to_rfc3339(),
                e.method.to_uppercase(),
                e.url,
                outcome,
                duration
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Combined console-log attachment text: a JS-errors section followed by a
/// console-output section, each present iff its input is non-empty.
///
/// Returns `None` when both sequences are empty so the caller skips the
/// attachment altogether.
pub fn combined_console_attachment(
    js_errors: &[JsErrorEntry],
    console_logs: &[ConsoleEntry],
) -> Option<String> {
    if js_errors.is_empty() && console_logs.is_empty() {
        return None;
    }

    let mut sections = Vec::new();
    if !js_errors.is_empty() {
        sections.push(format!("{}\n{}", JS_ERRORS_HEADER, format_js_errors(js_errors)));
    }
    if !console_logs.is_empty() {
        sections.push(format!("{}\n{}", CONSOLE_HEADER, format_console_logs(console_logs)));
    }

    Some(sections.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(secs: u32) -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, secs).unwrap()
    }

    fn console_entry(msg: &str, secs: u32) -> ConsoleEntry {
        ConsoleEntry {
            level: "warn".to_string(),
            message: msg.to_string(),
            timestamp: ts(secs),
        }
    }

    fn js_error(msg: &str) -> JsErrorEntry {
        JsErrorEntry {
            message: msg.to_string(),
            stack: Some("at handleClick (app.js:42)".to_string()),
            source: Some("app.js".to_string()),
            line: Some(42),
            timestamp: ts(0),
        }
    }

    #[test]
    fn console_logs_preserve_capture_order() {
        let entries = vec![console_entry("first", 1), console_entry("second", 2)];
        let text = format_console_logs(&entries);
        let first = text.find("first").unwrap();
        let second = text.find("second").unwrap();
        assert!(first < second);
        assert!(text.contains("[WARN]"));
    }

    #[test]
    fn js_errors_include_location_and_stack() {
        let text = format_js_errors(&[js_error("x is undefined")]);
        assert!(text.contains("x is undefined"));
        assert!(text.contains("at app.js:42"));
        assert!(text.contains("handleClick"));
    }

    #[test]
    fn network_logs_show_status_or_failure() {
        let entries = vec![
            NetworkEntry {
                method: "get".to_string(),
                url: "https://api.example.com/items".to_string(),
                status: Some(500),
                duration_ms: Some(120),
                error: None,
                timestamp: ts(0),
            },
            NetworkEntry {
                method: "POST".to_string(),
                url: "https://api.example.com/save".to_string(),
                status: None,
                duration_ms: None,
                error: Some("net::ERR_CONNECTION_RESET".to_string()),
                timestamp: ts(1),
            },
        ];
        let text = format_network_logs(&entries);
        assert!(text.contains("GET https://api.example.com/items -> 500 (120ms)"));
        assert!(text.contains("POST https://api.example.com/save -> failed: net::ERR_CONNECTION_RESET"));
    }

    #[test]
    fn combined_attachment_empty_inputs_yield_none() {
        assert!(combined_console_attachment(&[], &[]).is_none());
    }

    #[test]
    fn combined_attachment_sections_track_inputs() {
        let errors = vec![js_error("boom")];
        let logs = vec![console_entry("hello", 0)];

        let both = combined_console_attachment(&errors, &logs).unwrap();
        assert!(both.contains("=== JavaScript Errors ==="));
        assert!(both.contains("=== Console Output ==="));
        // Errors section comes first.
        assert!(
            both.find("=== JavaScript Errors ===").unwrap()
                < both.find("=== Console Output ===").unwrap()
        );

        let errors_only = combined_console_attachment(&errors, &[]).unwrap();
        assert!(errors_only.contains("=== JavaScript Errors ==="));
        assert!(!errors_only.contains("=== Console Output ==="));

        let logs_only = combined_console_attachment(&[], &logs).unwrap();
        assert!(!logs_only.contains("=== JavaScript Errors ==="));
        assert!(logs_only.contains("=== Console Output ==="));
    }

    #[test]
    fn formatters_are_deterministic() {
        let logs = vec![console_entry("repeat", 3)];
        assert_eq!(format_console_logs(&logs), format_console_logs(&logs));
    }
}
