//! Extraction Transport Port - Interface for delivering a submission to the
//! extraction service.
//!
//! The transport moves bytes and nothing else: it sends one multipart
//! request and hands back the raw status and body. Classification, timeouts
//! and cancellation belong to the gateway in the application layer.
//!
//! # Cancellation
//!
//! Callers abort an in-flight send by dropping the future returned by
//! [`ExtractionTransport::send`]. Implementations must release the
//! underlying connection when that happens.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::extraction::ExtractionRequest;

/// Port for the remote extraction service.
#[async_trait]
pub trait ExtractionTransport: Send + Sync {
    /// Sends one request and returns the raw response.
    ///
    /// Any HTTP status counts as a response; only failures to complete the
    /// exchange are errors.
    async fn send(&self, request: ExtractionRequest) -> Result<TransportResponse, TransportError>;

    /// Endpoint description for logs.
    fn endpoint(&self) -> String;
}

/// Raw response from the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Convenience constructor for a JSON body.
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures to complete an exchange with the service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection refused, reset, DNS failure and similar.
    #[error("network error: {0}")]
    Network(String),

    /// No response within the wall-clock limit.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The caller cancelled the request.
    #[error("request cancelled")]
    Cancelled,

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    pub fn network(message: impl Into<String>) -> Self {
        TransportError::Network(message.into())
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        TransportError::InvalidRequest(message.into())
    }
}
