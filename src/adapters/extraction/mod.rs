//! Extraction transport adapters.
//!
//! - `HttpExtractionTransport` - reqwest multipart client for the real service
//! - `MockExtractionTransport` - scripted transport for tests

mod http_transport;
mod mock_transport;

pub use http_transport::{HttpExtractionTransport, HttpTransportConfig};
pub use mock_transport::{MockExtractionTransport, MockReply};
