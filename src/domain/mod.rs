//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (section names, field paths, errors)
//! - `record` - Section schemas, consolidated records, merge and derived-field rules
//! - `extraction` - Extraction requests and classified results

pub mod extraction;
pub mod foundation;
pub mod record;
