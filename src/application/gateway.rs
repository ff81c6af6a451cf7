//! ExtractionGateway - submits documents plus manual data to the extraction
//! service and classifies the outcome.
//!
//! A submission is a single attempt under a hard wall-clock limit. The
//! transport future, the timer and the cancellation signal are raced in one
//! `select!`; whichever finishes first wins and the others are dropped,
//! which aborts the in-flight request and releases the timer on every path.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{ExtractionConfig, MAX_TIMEOUT_SECS};
use crate::domain::extraction::{ExtractionRequest, ExtractionResult, FileBlob, DEFAULT_FILE_FIELD};
use crate::domain::foundation::SectionName;
use crate::ports::{ExtractionTransport, TransportError};

/// Orchestrates one extraction submission at a time.
pub struct ExtractionGateway {
    transport: Arc<dyn ExtractionTransport>,
    timeout: Duration,
    file_field: String,
}

impl ExtractionGateway {
    /// Creates a gateway with the standard one-hour limit.
    pub fn new(transport: Arc<dyn ExtractionTransport>) -> Self {
        Self {
            transport,
            timeout: Duration::from_secs(MAX_TIMEOUT_SECS),
            file_field: DEFAULT_FILE_FIELD.to_string(),
        }
    }

    pub fn from_config(transport: Arc<dyn ExtractionTransport>, config: &ExtractionConfig) -> Self {
        Self::new(transport)
            .with_timeout(config.timeout())
            .with_file_field(config.file_field.clone())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_file_field(mut self, field: impl Into<String>) -> Self {
        self.file_field = field.into();
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Submits without an external cancel signal.
    pub async fn submit<I>(&self, files: Vec<FileBlob>, payloads: I) -> ExtractionResult
    where
        I: IntoIterator<Item = (SectionName, String)>,
    {
        self.submit_with_cancel(files, payloads, CancellationToken::new())
            .await
    }

    /// Submits and resolves to exactly one result.
    ///
    /// - No files: `NoInput`, and the transport is never called.
    /// - Cancelled, timed out, or network failure: `Transport`.
    /// - Non-2xx: `Remote` with the service's detail and status.
    /// - 2xx: `Success` with the body untouched.
    ///
    /// Cancelling `cancel` more than once, or after completion, has no
    /// further effect.
    pub async fn submit_with_cancel<I>(
        &self,
        files: Vec<FileBlob>,
        payloads: I,
        cancel: CancellationToken,
    ) -> ExtractionResult
    where
        I: IntoIterator<Item = (SectionName, String)>,
    {
        if files.is_empty() {
            warn!("Extraction submit rejected: no files selected");
            return ExtractionResult::no_input();
        }

        let request = ExtractionRequest::new(files, payloads).with_file_field(self.file_field.clone());
        let request_id = request.id();
        info!(
            %request_id,
            files = request.files().len(),
            sections = request.manual_data().len(),
            bytes = request.upload_size(),
            endpoint = %self.transport.endpoint(),
            timeout_secs = self.timeout.as_secs(),
            "Submitting extraction request"
        );

        let started = Instant::now();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(TransportError::Cancelled),
            _ = sleep(self.timeout) => Err(TransportError::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }),
            response = self.transport.send(request) => response,
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let result = match outcome {
            Ok(response) => ExtractionResult::classify(response.status, &response.body),
            Err(e) => ExtractionResult::transport(e.to_string()),
        };

        match &result {
            ExtractionResult::Success(_) => {
                info!(%request_id, elapsed_ms, "Extraction request succeeded");
            }
            ExtractionResult::Failure(failure) => {
                warn!(
                    %request_id,
                    elapsed_ms,
                    kind = %failure.kind,
                    http_status = failure.http_status,
                    detail = %failure.detail,
                    "Extraction request failed"
                );
            }
        }

        result
    }
}
