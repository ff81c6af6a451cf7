//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `BRSR_INTAKE` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use brsr_intake::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Submitting to {}", config.extraction.base_url);
//! ```

mod error;
mod extraction;
mod logging;

pub use error::{ConfigError, ValidationError};
pub use extraction::{ExtractionConfig, MAX_TIMEOUT_SECS};
pub use logging::LoggingConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a working
/// configuration pointed at a local extraction service.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Extraction service connection
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Log filter and format
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `BRSR_INTAKE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `BRSR_INTAKE__EXTRACTION__BASE_URL=http://svc:8000` -> `extraction.base_url`
    /// - `BRSR_INTAKE__LOGGING__JSON=true` -> `logging.json = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("BRSR_INTAKE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.extraction.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;
    use std::time::Duration;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "BRSR_INTAKE__EXTRACTION__BASE_URL",
        "BRSR_INTAKE__EXTRACTION__ENDPOINT_PATH",
        "BRSR_INTAKE__EXTRACTION__TIMEOUT_SECS",
        "BRSR_INTAKE__EXTRACTION__FILE_FIELD",
        "BRSR_INTAKE__EXTRACTION__API_KEY",
        "BRSR_INTAKE__LOGGING__LEVEL",
        "BRSR_INTAKE__LOGGING__JSON",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_defaults_from_empty_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.extraction.base_url, "http://localhost:8000");
        assert_eq!(config.extraction.timeout_secs, 3600);
        assert!(config.extraction.api_key.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("BRSR_INTAKE__EXTRACTION__BASE_URL", "https://extract.example.com");
        env::set_var("BRSR_INTAKE__EXTRACTION__TIMEOUT_SECS", "900");
        env::set_var("BRSR_INTAKE__EXTRACTION__API_KEY", "token-123");
        env::set_var("BRSR_INTAKE__LOGGING__JSON", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.extraction.base_url, "https://extract.example.com");
        assert_eq!(config.extraction.timeout(), Duration::from_secs(900));
        assert_eq!(config.extraction.api_key.as_deref(), Some("token-123"));
        assert!(config.logging.json);
    }

    #[test]
    fn test_validate_rejects_out_of_range_timeout() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("BRSR_INTAKE__EXTRACTION__TIMEOUT_SECS", "7200");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(matches!(config.validate(), Err(ValidationError::InvalidTimeout)));
    }
}
