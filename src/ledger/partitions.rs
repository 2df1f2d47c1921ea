/// Key layout and encoding utilities for Fjall partitions
///
/// Partition structure:
/// - `reports`: report:{report_id} -> ReportRecord (JSON)
/// - `projects`: project:{project_key} -> ProjectRecord (JSON)

/// Encode a report key: report:{report_id}
pub fn encode_report_key(report_id: &str) -> Vec<u8> {
    format!("report:{}", report_id).into_bytes()
}

/// Decode a report key: report:{report_id} -> report_id
pub fn decode_report_key(key: &[u8]) -> Option<String> {
    let key_str = std::str::from_utf8(key).ok()?;
    key_str.strip_prefix("report:").map(String::from)
}

/// Encode a project key: project:{project_key}
pub fn encode_project_key(project_key: &str) -> Vec<u8> {
    format!("project:{}", project_key).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_key_encoding() {
        let report_id = "0193e5a4-7c1b";
        let key = encode_report_key(report_id);
        assert_eq!(key, b"report:0193e5a4-7c1b");

        let decoded = decode_report_key(&key).unwrap();
        assert_eq!(decoded, report_id);
    }

    #[test]
    fn test_project_key_encoding() {
        let key = encode_project_key("pk_live_abc");
        assert_eq!(key, b"project:pk_live_abc");
    }

    #[test]
    fn test_decode_rejects_foreign_prefix() {
        assert!(decode_report_key(b"project:pk_live_abc").is_none());
    }
}
