//! Adapters - implementations of the ports.

pub mod extraction;

pub use extraction::{HttpExtractionTransport, HttpTransportConfig, MockExtractionTransport, MockReply};
