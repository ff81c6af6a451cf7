//! ExtractionResult - the classified outcome of one submission.

use serde_json::Value;
use std::fmt;

use crate::domain::foundation::ErrorCode;

/// Detail used when an error body cannot be parsed.
pub const UNPARSABLE_ERROR_DETAIL: &str = "Backend request failed";

/// Detail used when an error body parses but carries no message.
pub const MISSING_ERROR_DETAIL: &str = "Unknown error from backend";

/// Detail used when a success status comes with a body that is not JSON.
pub const INVALID_SUCCESS_BODY_DETAIL: &str = "Invalid JSON in extraction response";

/// Body keys searched, in order, for a remote error message.
const DETAIL_KEYS: &[&str] = &["detail", "details", "error"];

/// Why a submission failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// No documents were selected; nothing was sent.
    NoInput,
    /// Network error, timeout, or cancellation.
    Transport,
    /// The service answered with an error status.
    Remote,
}

impl FailureKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            FailureKind::NoInput => ErrorCode::NoInput,
            FailureKind::Transport => ErrorCode::Transport,
            FailureKind::Remote => ErrorCode::Remote,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::NoInput => "no input",
            FailureKind::Transport => "transport",
            FailureKind::Remote => "remote",
        };
        write!(f, "{}", label)
    }
}

/// Successful response body, kept exactly as the service sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSuccess {
    body: Value,
}

impl ExtractionSuccess {
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    /// The `data` member, if present.
    pub fn data(&self) -> Option<&Value> {
        self.body.get("data")
    }

    /// The `stats` member, if present.
    pub fn stats(&self) -> Option<&Value> {
        self.body.get("stats")
    }

    /// The `message` member, if it is a string.
    pub fn message(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionFailure {
    pub kind: FailureKind,
    pub detail: String,
    pub http_status: Option<u16>,
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.http_status {
            Some(status) => write!(f, "{} failure (HTTP {}): {}", self.kind, status, self.detail),
            None => write!(f, "{} failure: {}", self.kind, self.detail),
        }
    }
}

/// Exactly one of success or failure; never mutated once built.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionResult {
    Success(ExtractionSuccess),
    Failure(ExtractionFailure),
}

impl ExtractionResult {
    pub fn succeeded(body: Value) -> Self {
        ExtractionResult::Success(ExtractionSuccess::new(body))
    }

    pub fn no_input() -> Self {
        Self::failed(FailureKind::NoInput, "No files selected for extraction", None)
    }

    pub fn transport(detail: impl Into<String>) -> Self {
        Self::failed(FailureKind::Transport, detail, None)
    }

    pub fn remote(detail: impl Into<String>, http_status: u16) -> Self {
        Self::failed(FailureKind::Remote, detail, Some(http_status))
    }

    fn failed(kind: FailureKind, detail: impl Into<String>, http_status: Option<u16>) -> Self {
        ExtractionResult::Failure(ExtractionFailure {
            kind,
            detail: detail.into(),
            http_status,
        })
    }

    /// Classifies a completed HTTP exchange.
    ///
    /// A 2xx body is parsed and passed through untouched. Any other status
    /// becomes a remote failure whose detail is read from the body, with
    /// fixed fallbacks when the body is not JSON or names no message.
    pub fn classify(status: u16, body: &[u8]) -> Self {
        if (200..300).contains(&status) {
            return match serde_json::from_slice::<Value>(body) {
                Ok(parsed) => Self::succeeded(parsed),
                Err(_) => Self::remote(INVALID_SUCCESS_BODY_DETAIL, status),
            };
        }

        let detail = match serde_json::from_slice::<Value>(body) {
            Ok(parsed) => error_detail(&parsed).unwrap_or_else(|| MISSING_ERROR_DETAIL.to_string()),
            Err(_) => UNPARSABLE_ERROR_DETAIL.to_string(),
        };
        Self::remote(detail, status)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExtractionResult::Success(_))
    }

    pub fn as_success(&self) -> Option<&ExtractionSuccess> {
        match self {
            ExtractionResult::Success(success) => Some(success),
            ExtractionResult::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&ExtractionFailure> {
        match self {
            ExtractionResult::Failure(failure) => Some(failure),
            ExtractionResult::Success(_) => None,
        }
    }

    /// Failure kind, or `None` on success.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.as_failure().map(|failure| failure.kind)
    }
}

/// First usable message under the conventional keys. Non-string details
/// (e.g. a list of validation errors) are rendered as compact JSON.
fn error_detail(body: &Value) -> Option<String> {
    DETAIL_KEYS.iter().find_map(|key| match body.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::String(_) | Value::Null => None,
        other => Some(other.to_string()),
    })
}
