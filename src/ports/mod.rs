//! Ports - interfaces the application layer depends on.
//!
//! - `ExtractionTransport` - delivers a submission to the extraction service

mod extraction_transport;

pub use extraction_transport::{ExtractionTransport, TransportError, TransportResponse};
