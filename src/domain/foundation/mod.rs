//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the disclosure intake domain.

mod errors;
mod field_path;
mod section_name;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use field_path::FieldPath;
pub use section_name::SectionName;
