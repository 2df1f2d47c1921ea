//! Capture-side data model for bug reports.
//!
//! The capture UI (an external collaborator) assembles a [`BugReportPayload`]
//! from whatever it recorded — screenshot or video, console/network logs, JS
//! errors, a metadata snapshot — and hands it to an integration. Everything
//! in this module is pure data plus pure functions over it: formatters that
//! turn structured log entries into attachment text, and the environment
//! probe that derives browser/OS/device metadata without touching any
//! ambient global state.

pub mod format;
pub mod payload;
pub mod probe;

pub use format::{
    combined_console_attachment, format_console_logs, format_js_errors, format_network_logs,
};
pub use payload::{
    BugReportPayload, CaptureMode, ClientMetadata, ConnectionInfo, ConsoleEntry, JsErrorEntry,
    NetworkEntry,
};
pub use probe::{DerivedMetadata, EnvProbe};
