//! Mock Extraction Transport for testing.
//!
//! Provides a scripted implementation of the ExtractionTransport port so
//! gateway behaviour can be tested without a running service.
//!
//! # Features
//!
//! - Pre-configured replies, consumed in order
//! - Simulated latency for timeout and cancellation testing
//! - Call tracking, including sends abandoned before completion
//!
//! # Example
//!
//! ```ignore
//! let transport = MockExtractionTransport::new()
//!     .with_json(500, json!({ "detail": "boom" }))
//!     .with_delay(Duration::from_millis(50));
//!
//! let gateway = ExtractionGateway::new(Arc::new(transport.clone()));
//! ```

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::extraction::ExtractionRequest;
use crate::ports::{ExtractionTransport, TransportError, TransportResponse};

/// A configured mock reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    Response(TransportResponse),
    Error(TransportError),
}

/// Scripted transport. Clones share state, so a test can keep one handle
/// for assertions while the gateway owns another.
#[derive(Debug, Clone)]
pub struct MockExtractionTransport {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<ExtractionRequest>>>,
    aborted: Arc<AtomicUsize>,
}

impl Default for MockExtractionTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExtractionTransport {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            aborted: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Queues a raw response.
    pub fn with_response(self, response: TransportResponse) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Response(response));
        self
    }

    /// Queues a response with a JSON body.
    pub fn with_json(self, status: u16, body: Value) -> Self {
        self.with_response(TransportResponse::json(status, &body))
    }

    /// Queues a transport failure.
    pub fn with_error(self, error: TransportError) -> Self {
        self.replies.lock().unwrap().push_back(MockReply::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of sends started.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Every request received, in order.
    pub fn get_calls(&self) -> Vec<ExtractionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<ExtractionRequest> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// Number of sends dropped before they produced a reply.
    pub fn aborted_count(&self) -> usize {
        self.aborted.load(Ordering::SeqCst)
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn next_reply(&self) -> MockReply {
        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            MockReply::Response(TransportResponse::json(
                200,
                &json!({ "success": true, "data": {} }),
            ))
        })
    }
}

/// Counts a send as aborted if its future is dropped before finishing.
struct InFlight {
    aborted: Arc<AtomicUsize>,
    finished: bool,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.finished {
            self.aborted.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl ExtractionTransport for MockExtractionTransport {
    async fn send(&self, request: ExtractionRequest) -> Result<TransportResponse, TransportError> {
        self.calls.lock().unwrap().push(request);
        let mut in_flight = InFlight {
            aborted: Arc::clone(&self.aborted),
            finished: false,
        };

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let reply = self.next_reply();
        in_flight.finished = true;
        match reply {
            MockReply::Response(response) => Ok(response),
            MockReply::Error(err) => Err(err),
        }
    }

    fn endpoint(&self) -> String {
        "mock://extraction".to_string()
    }
}
