//! Environment probe and metadata derivation.
//!
//! The original capture client read `window`/`navigator`/`screen` directly.
//! Here that ambient context is an explicit [`EnvProbe`] value supplied by
//! the embedder, so server-side and test environments can pass a
//! deterministic substitute. Derivation never fails: missing context falls
//! back to `"unknown"` or an empty string.

use serde::{Deserialize, Serialize};

/// Snapshot of the runtime environment, supplied by the embedder.
#[derive(Debug, Clone, Default)]
pub struct EnvProbe {
    pub user_agent: Option<String>,
    pub screen: Option<(u32, u32)>,
    pub viewport: Option<(u32, u32)>,
    pub hostname: Option<String>,
    pub locale: Option<String>,
    pub timezone: Option<String>,
    pub color_scheme: Option<String>,
    pub connection_type: Option<String>,
}

/// Metadata derived from an [`EnvProbe`]. Pure function of its input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedMetadata {
    pub browser_name: String,
    pub os_name: String,
    pub device_type: String,
    pub screen_resolution: String,
    pub viewport: String,
    pub environment: String,
}

impl DerivedMetadata {
    pub fn collect(probe: &EnvProbe) -> Self {
        let ua = probe.user_agent.as_deref().unwrap_or("");
        Self {
            browser_name: parse_browser_name(ua).to_string(),
            os_name: parse_os_name(ua).to_string(),
            device_type: classify_device(probe.viewport).to_string(),
            screen_resolution: format_dimensions(probe.screen),
            viewport: format_dimensions(probe.viewport),
            environment: classify_environment(probe.hostname.as_deref()).to_string(),
        }
    }
}

/// Priority-ordered substring match; first hit wins. Intentionally
/// approximate, not a full UA parser.
pub fn parse_browser_name(ua: &str) -> &'static str {
    if ua.contains("Firefox/") {
        "Firefox"
    } else if ua.contains("Edg/") {
        "Edge"
    } else if ua.contains("OPR/") || ua.contains("Opera/") {
        "Opera"
    } else if ua.contains("Chrome/") {
        "Chrome"
    } else if ua.contains("Safari/") {
        "Safari"
    } else {
        "Unknown"
    }
}

pub fn parse_os_name(ua: &str) -> &'static str {
    if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("Mac OS") {
        "macOS"
    } else if ua.contains("Linux") {
        "Linux"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("iPhone") || ua.contains("iPad") {
        "iOS"
    } else {
        "Unknown"
    }
}

fn classify_device(viewport: Option<(u32, u32)>) -> &'static str {
    match viewport {
        Some((width, _)) if width < 768 => "mobile",
        Some((width, _)) if width < 1024 => "tablet",
        Some(_) => "desktop",
        None => "unknown",
    }
}

fn format_dimensions(dims: Option<(u32, u32)>) -> String {
    match dims {
        Some((w, h)) => format!("{}x{}", w, h),
        None => String::new(),
    }
}

fn classify_environment(hostname: Option<&str>) -> &'static str {
    match hostname {
        Some("localhost") | Some("127.0.0.1") => "development",
        Some(host) if host.contains("staging") || host.contains("preview") => "staging",
        Some(_) => "production",
        None => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHROME_LINUX: &str =
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/120.0.0.0 Safari/537.36";
    const EDGE_WINDOWS: &str =
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/120.0.0.0 Safari/537.36 Edg/120.0.0.0";
    const SAFARI_MAC: &str =
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 \
         (KHTML, like Gecko) Version/17.0 Safari/605.1.15";

    #[test]
    fn browser_priority_order() {
        assert_eq!(parse_browser_name(CHROME_LINUX), "Chrome");
        // Edge UAs also contain "Chrome/"; the Edg/ token must win.
        assert_eq!(parse_browser_name(EDGE_WINDOWS), "Edge");
        assert_eq!(parse_browser_name(SAFARI_MAC), "Safari");
        assert_eq!(parse_browser_name("curl/8.0"), "Unknown");
    }

    #[test]
    fn os_names() {
        assert_eq!(parse_os_name(CHROME_LINUX), "Linux");
        assert_eq!(parse_os_name(EDGE_WINDOWS), "Windows");
        assert_eq!(parse_os_name(SAFARI_MAC), "macOS");
        // Android UAs carry "Linux;" and the Linux check comes first
        assert_eq!(
            parse_os_name("Mozilla/5.0 (Linux; Android 14; Pixel 8)"),
            "Linux"
        );
        assert_eq!(parse_os_name(""), "Unknown");
    }

    #[test]
    fn device_classification_boundaries() {
        let at = |width| {
            DerivedMetadata::collect(&EnvProbe {
                viewport: Some((width, 800)),
                ..EnvProbe::default()
            })
            .device_type
        };
        assert_eq!(at(767), "mobile");
        assert_eq!(at(768), "tablet");
        assert_eq!(at(1023), "tablet");
        assert_eq!(at(1024), "desktop");
    }

    #[test]
    fn environment_classification() {
        let env = |host: Option<&str>| {
            DerivedMetadata::collect(&EnvProbe {
                hostname: host.map(String::from),
                ..EnvProbe::default()
            })
            .environment
        };
        assert_eq!(env(Some("localhost")), "development");
        assert_eq!(env(Some("127.0.0.1")), "development");
        assert_eq!(env(Some("staging.example.com")), "staging");
        assert_eq!(env(Some("preview-42.example.dev")), "staging");
        assert_eq!(env(Some("app.example.com")), "production");
        assert_eq!(env(None), "unknown");
    }

    #[test]
    fn collect_is_idempotent() {
        let probe = EnvProbe {
            user_agent: Some(CHROME_LINUX.to_string()),
            screen: Some((2560, 1440)),
            viewport: Some((1280, 900)),
            hostname: Some("app.example.com".to_string()),
            ..EnvProbe::default()
        };
        let first = DerivedMetadata::collect(&probe);
        let second = DerivedMetadata::collect(&probe);
        assert_eq!(first, second);
        assert_eq!(first.screen_resolution, "2560x1440");
        assert_eq!(first.viewport, "1280x900");
    }

    #[test]
    fn empty_probe_falls_back() {
        let derived = DerivedMetadata::collect(&EnvProbe::default());
        assert_eq!(derived.browser_name, "Unknown");
        assert_eq!(derived.os_name, "Unknown");
        assert_eq!(derived.device_type, "unknown");
        assert_eq!(derived.environment, "unknown");
        assert_eq!(derived.screen_resolution, "");
    }
}
