//! Extraction service configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Longest wall-clock time a submission may run.
pub const MAX_TIMEOUT_SECS: u64 = 3600;

/// Extraction service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// Service root URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the extraction endpoint
    #[serde(default = "default_endpoint_path")]
    pub endpoint_path: String,

    /// Hard wall-clock timeout per submission, in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Multipart field name shared by uploaded documents
    #[serde(default = "default_file_field")]
    pub file_field: String,

    /// Bearer token for the service, if it requires one
    pub api_key: Option<String>,
}

impl ExtractionConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Copy of this configuration with the timeout replaced, if one is given.
    pub fn with_timeout_override(&self, timeout_secs: Option<u64>) -> Result<Self, ValidationError> {
        let mut config = self.clone();
        if let Some(secs) = timeout_secs {
            if secs == 0 || secs > MAX_TIMEOUT_SECS {
                return Err(ValidationError::InvalidTimeout);
            }
            config.timeout_secs = secs;
        }
        Ok(config)
    }

    /// Validate extraction configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.file_field.trim().is_empty() {
            return Err(ValidationError::MissingRequired("EXTRACTION__FILE_FIELD"));
        }
        Ok(())
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint_path: default_endpoint_path(),
            timeout_secs: default_timeout(),
            file_field: default_file_field(),
            api_key: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_endpoint_path() -> String {
    "/api/extract".to_string()
}

fn default_timeout() -> u64 {
    MAX_TIMEOUT_SECS
}

fn default_file_field() -> String {
    "file".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_config_defaults() {
        let config = ExtractionConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.endpoint_path, "/api/extract");
        assert_eq!(config.timeout(), Duration::from_secs(3600));
        assert_eq!(config.file_field, "file");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_bounds() {
        let config = ExtractionConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidTimeout)));

        let config = ExtractionConfig {
            timeout_secs: 3601,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidTimeout)));
    }

    #[test]
    fn test_timeout_override() {
        let config = ExtractionConfig {
            timeout_secs: 60,
            ..Default::default()
        };

        let longer = config.with_timeout_override(Some(1800)).unwrap();
        assert_eq!(longer.timeout(), Duration::from_secs(1800));
        assert_eq!(longer.base_url, config.base_url);

        assert_eq!(config.with_timeout_override(None).unwrap().timeout_secs, 60);
        assert!(matches!(
            config.with_timeout_override(Some(0)),
            Err(ValidationError::InvalidTimeout)
        ));
        assert!(matches!(
            config.with_timeout_override(Some(3601)),
            Err(ValidationError::InvalidTimeout)
        ));
    }

    #[test]
    fn test_base_url_needs_scheme() {
        let config = ExtractionConfig {
            base_url: "localhost:8000".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidBaseUrl)));
    }

    #[test]
    fn test_blank_file_field_rejected() {
        let config = ExtractionConfig {
            file_field: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
