//! Application layer - orchestration between the domain and the ports.
//!
//! - `manual_data` - keeps per-section payloads in step with the stores
//! - `gateway` - submits documents and payloads, classifies the outcome

mod gateway;
mod manual_data;

pub use gateway::ExtractionGateway;
pub use manual_data::ManualDataChannel;
