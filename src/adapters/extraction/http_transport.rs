//! HTTP Extraction Transport - multipart POST to the extraction service.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpTransportConfig::new("http://localhost:8000")
//!     .with_endpoint_path("/api/extract")
//!     .with_timeout(Duration::from_secs(3600));
//!
//! let transport = HttpExtractionTransport::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ExtractionConfig;
use crate::domain::extraction::{ExtractionRequest, RequestPart};
use crate::ports::{ExtractionTransport, TransportError, TransportResponse};

/// Connection settings for the HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Service root (e.g. `http://localhost:8000`).
    pub base_url: String,
    /// Path of the extraction endpoint.
    pub endpoint_path: String,
    /// Client-level timeout; the gateway enforces its own limit as well.
    pub timeout: Duration,
    /// Optional bearer token.
    api_key: Option<Secret<String>>,
}

impl HttpTransportConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            endpoint_path: "/api/extract".to_string(),
            timeout: Duration::from_secs(3600),
            api_key: None,
        }
    }

    pub fn with_endpoint_path(mut self, path: impl Into<String>) -> Self {
        self.endpoint_path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

    /// Full endpoint URL, tolerant of stray slashes on either side.
    pub fn url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint_path.trim_start_matches('/')
        )
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|key| key.expose_secret().as_str())
    }
}

impl From<&ExtractionConfig> for HttpTransportConfig {
    fn from(config: &ExtractionConfig) -> Self {
        let base = Self::new(config.base_url.clone())
            .with_endpoint_path(config.endpoint_path.clone())
            .with_timeout(config.timeout());
        match config.api_key.as_deref() {
            Some(key) if !key.is_empty() => base.with_api_key(key),
            _ => base,
        }
    }
}

/// reqwest-backed transport.
pub struct HttpExtractionTransport {
    config: HttpTransportConfig,
    client: Client,
}

impl HttpExtractionTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::invalid_request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn from_config(config: &ExtractionConfig) -> Result<Self, TransportError> {
        Self::new(HttpTransportConfig::from(config))
    }

    /// Converts the request into a multipart form, preserving part order.
    fn build_form(request: ExtractionRequest) -> Result<Form, TransportError> {
        request
            .into_parts()
            .into_iter()
            .try_fold(Form::new(), |form, part| -> Result<Form, TransportError> {
                match part {
                    RequestPart::File {
                        field,
                        filename,
                        content_type,
                        bytes,
                    } => {
                        let part = Part::bytes(bytes)
                            .file_name(filename)
                            .mime_str(content_type)
                            .map_err(|e| TransportError::invalid_request(e.to_string()))?;
                        Ok(form.part(field, part))
                    }
                    RequestPart::Text { field, value } => Ok(form.text(field, value)),
                }
            })
    }

    fn map_error(&self, e: reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else if e.is_connect() {
            TransportError::network(format!("Connection failed: {}", e))
        } else {
            TransportError::network(e.to_string())
        }
    }
}

#[async_trait]
impl ExtractionTransport for HttpExtractionTransport {
    async fn send(&self, request: ExtractionRequest) -> Result<TransportResponse, TransportError> {
        let request_id = request.id();
        let url = self.config.url();
        let form = Self::build_form(request)?;

        let mut builder = self.client.post(&url).multipart(form);
        if let Some(key) = self.config.api_key() {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(%request_id, url = %url, error = %e, "Extraction request failed to send");
            self.map_error(e)
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.map_error(e))?;

        debug!(%request_id, status, bytes = body.len(), "Extraction response received");
        Ok(TransportResponse::new(status, body.to_vec()))
    }

    fn endpoint(&self) -> String {
        self.config.url()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extraction::FileBlob;

    #[test]
    fn url_joins_base_and_path() {
        let config = HttpTransportConfig::new("http://localhost:8000/").with_endpoint_path("/api/extract");
        assert_eq!(config.url(), "http://localhost:8000/api/extract");

        let config = HttpTransportConfig::new("https://x.example").with_endpoint_path("v2/extract");
        assert_eq!(config.url(), "https://x.example/v2/extract");
    }

    #[test]
    fn config_is_built_from_extraction_settings() {
        let settings = ExtractionConfig {
            base_url: "http://svc:9000".to_string(),
            endpoint_path: "/extract".to_string(),
            timeout_secs: 120,
            file_field: "file".to_string(),
            api_key: Some("secret-token".to_string()),
        };

        let config = HttpTransportConfig::from(&settings);

        assert_eq!(config.url(), "http://svc:9000/extract");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.api_key(), Some("secret-token"));
    }

    #[test]
    fn timeout_override_reaches_the_client() {
        let settings = ExtractionConfig {
            timeout_secs: 60,
            ..Default::default()
        };
        let effective = settings.with_timeout_override(Some(1800)).unwrap();

        assert_eq!(HttpTransportConfig::from(&effective).timeout, Duration::from_secs(1800));
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let config = HttpTransportConfig::new("http://localhost").with_api_key("sk-very-secret");
        assert!(!format!("{:?}", config).contains("sk-very-secret"));
    }

    #[test]
    fn form_accepts_every_part_kind() {
        let request = ExtractionRequest::new(
            vec![FileBlob::new("a.pdf", vec![1, 2, 3]), FileBlob::new("b.bin", vec![])],
            vec![(crate::domain::foundation::SectionName::SectionA, "{}".to_string())],
        );
        assert!(HttpExtractionTransport::build_form(request).is_ok());
    }

    #[tokio::test]
    async fn unreachable_service_is_a_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport = HttpExtractionTransport::new(
            HttpTransportConfig::new(format!("http://127.0.0.1:{}", port))
                .with_timeout(Duration::from_secs(5)),
        )
        .unwrap();

        let err = transport
            .send(ExtractionRequest::new(vec![FileBlob::new("a.pdf", vec![1])], Vec::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Network(_)));
    }
}
