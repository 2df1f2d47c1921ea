//! Transport seam for the cloud integration.
//!
//! The ingest request is built as a [`ReportForm`] — a plain, inspectable
//! list of scalar fields and named file parts — and handed to an
//! [`IngestTransport`] for delivery. Production uses [`HttpTransport`]
//! (reqwest multipart POST); tests and embedders that need proxying or
//! injected auth substitute their own transport.

use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

use super::ProviderError;

/// One binary or text attachment part.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub name: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Multipart form assembled by the cloud integration.
#[derive(Debug, Clone, Default)]
pub struct ReportForm {
    fields: Vec<(String, String)>,
    parts: Vec<FilePart>,
}

impl ReportForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn part(
        &mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: Bytes,
    ) {
        self.parts.push(FilePart {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        });
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn parts(&self) -> &[FilePart] {
        &self.parts
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.iter().any(|p| p.name == name)
    }

    fn into_multipart(self) -> reqwest::multipart::Form {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.fields {
            form = form.text(name, value);
        }
        for part in self.parts {
            let data = part.data.to_vec();
            let file = match reqwest::multipart::Part::bytes(data.clone())
                .file_name(part.file_name.clone())
                .mime_str(&part.content_type)
            {
                Ok(typed) => typed,
                // Content types are fixed literals; an unparsable one just
                // loses the explicit mime, not the part.
                Err(_) => reqwest::multipart::Part::bytes(data).file_name(part.file_name),
            };
            form = form.part(part.name, file);
        }
        form
    }
}

/// Response as seen by the integration: status plus raw body.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Bytes,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Delivery mechanism for the ingest POST.
#[async_trait]
pub trait IngestTransport: Send + Sync {
    async fn send(
        &self,
        endpoint: &str,
        form: ReportForm,
    ) -> Result<TransportResponse, ProviderError>;
}

/// Default transport: one reqwest multipart POST with bounded timeouts.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IngestTransport for HttpTransport {
    async fn send(
        &self,
        endpoint: &str,
        form: ReportForm,
    ) -> Result<TransportResponse, ProviderError> {
        let response = self
            .client
            .post(endpoint)
            .multipart(form.into_multipart())
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_records_fields_and_parts() {
        let mut form = ReportForm::new();
        form.field("project_key", "pk_test");
        form.part(
            "screenshot",
            "bug-screenshot.png",
            "image/png",
            Bytes::from_static(b"\x89PNG"),
        );

        assert_eq!(form.field_value("project_key"), Some("pk_test"));
        assert!(form.has_part("screenshot"));
        assert!(!form.has_part("video"));
        assert_eq!(form.parts()[0].file_name, "bug-screenshot.png");
    }

    #[test]
    fn response_success_range() {
        let ok = TransportResponse { status: 201, body: Bytes::new() };
        let err = TransportResponse { status: 404, body: Bytes::new() };
        assert!(ok.is_success());
        assert!(!err.is_success());
    }
}
