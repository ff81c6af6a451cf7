//! Record module - consolidated manual data for each disclosure section.
//!
//! - `schema` - schema trees built from embedded default templates
//! - `value` - the shared, immutable `SectionRecord`
//! - `merger` - non-destructive overlay of partial data
//! - `derived` - totals recomputed after every mutation
//! - `store` - per-section state holder and change notification

mod derived;
mod merger;
mod schema;
mod store;
mod value;

pub use derived::{rules_for, DerivedFieldRules, DerivedRule, WeightedTerm};
pub use merger::ConsolidationMerger;
pub use schema::{ScalarKind, SchemaNode, SchemaViolation, SectionSchema, TemplateError};
pub use store::{RecordListener, SectionRecordStore, StoreError};
pub use value::{coerce_number, number_value, SectionRecord};
