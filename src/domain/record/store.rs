//! SectionRecordStore - owns one section's consolidated record.
//!
//! Every mutation runs the same pipeline: validate against the schema,
//! build the candidate tree, recompute derived fields, and notify the
//! listener if the record actually changed.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::derived::DerivedFieldRules;
use super::merger::ConsolidationMerger;
use super::schema::{SchemaNode, SchemaViolation, SectionSchema};
use super::value::{lookup_mut, SectionRecord};
use crate::domain::foundation::{DomainError, ErrorCode, FieldPath, SectionName};

/// Callback receiving every new record the store commits.
pub type RecordListener = Box<dyn FnMut(&SectionRecord) + Send>;

/// Errors returned by store mutations. The record is untouched on error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error(transparent)]
    SchemaViolation(#[from] SchemaViolation),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
}

impl StoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::SchemaViolation(_) => ErrorCode::SchemaViolation,
            StoreError::InvalidJson(_) => ErrorCode::InvalidJson,
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::SchemaViolation(violation) => {
                DomainError::schema_violation(violation.path.clone(), violation.reason.clone())
            }
            StoreError::InvalidJson(_) => DomainError::new(err.code(), err.to_string()),
        }
    }
}

/// Per-section state holder.
///
/// Mutations take `&mut self`, so edits are serialized by the borrow checker
/// and a listener (which only sees `&SectionRecord`) cannot call back in.
pub struct SectionRecordStore {
    schema: Arc<SectionSchema>,
    record: SectionRecord,
    listener: Option<RecordListener>,
}

impl SectionRecordStore {
    /// Builds the defaulted record and overlays `external` on it.
    ///
    /// Derived values in `external` are discarded and recomputed.
    pub fn initialize(schema: Arc<SectionSchema>, external: Option<&Value>) -> Self {
        let defaults = schema.defaults();
        let merged = match external {
            Some(external) => {
                ConsolidationMerger::merge(&schema, &defaults, &schema.strip_derived(external))
            }
            None => defaults,
        };
        let record = DerivedFieldRules::recompute(&schema, &merged);

        debug!(
            section = %schema.section(),
            external = external.is_some(),
            "Section record initialized"
        );

        Self {
            schema,
            record,
            listener: None,
        }
    }

    /// Store for a built-in section.
    pub fn for_section(section: SectionName, external: Option<&Value>) -> Self {
        Self::initialize(SectionSchema::for_section(section), external)
    }

    /// Registers the change listener, replacing any previous one.
    pub fn set_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&SectionRecord) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn section(&self) -> SectionName {
        self.schema.section()
    }

    pub fn schema(&self) -> &SectionSchema {
        &self.schema
    }

    pub fn record(&self) -> &SectionRecord {
        &self.record
    }

    /// Writes one leaf (or one whole sequence) and recomputes.
    ///
    /// # Errors
    ///
    /// `SchemaViolation` when the path is unknown, derived, addresses a
    /// missing entry, ends on an object, or `value` is an array or object
    /// aimed at a leaf. Scalars are converted to the leaf's kind and `null`
    /// resets the leaf to its default.
    pub fn set_field(&mut self, path: &FieldPath, value: Value) -> Result<&SectionRecord, StoreError> {
        if self.schema.is_derived(path) {
            return Err(SchemaViolation::new(path, "derived field cannot be set directly").into());
        }

        let node = self.schema.resolve(path)?;
        let mut root = self.record.as_value().clone();
        let slot = lookup_mut(&mut root, path)
            .ok_or_else(|| SchemaViolation::new(path, "no entry at this index"))?;

        *slot = match node {
            SchemaNode::Scalar { default, .. } if value.is_null() => default.clone(),
            SchemaNode::Scalar { kind, .. } => kind.coerce(&value).ok_or_else(|| {
                SchemaViolation::new(path, format!("expected a {} value, got {}", kind, json_kind(&value)))
            })?,
            SchemaNode::Sequence(_) if value.is_array() => {
                ConsolidationMerger::merge_node(node, slot, &value)
            }
            SchemaNode::Sequence(_) => {
                return Err(SchemaViolation::new(path, "a sequence can only be replaced by an array").into())
            }
            SchemaNode::Object(_) => {
                return Err(SchemaViolation::new(path, "not a leaf field").into())
            }
        };

        debug!(section = %self.section(), path = %path, "Field set");
        Ok(self.commit(root))
    }

    /// Overlays a full or partial record ("apply pasted JSON").
    ///
    /// Runs the merge pipeline rather than taking `full` verbatim, so
    /// missing fields keep their current value and derived values are
    /// recomputed.
    pub fn replace_record(&mut self, full: &Value) -> &SectionRecord {
        let incoming = self.schema.strip_derived(full);
        let merged = ConsolidationMerger::merge(&self.schema, &self.record, &incoming);
        if merged.shares_root_with(&self.record) {
            debug!(section = %self.section(), "Replace left record unchanged");
            return &self.record;
        }

        debug!(section = %self.section(), "Record replaced");
        self.commit(merged.into_value())
    }

    /// Parses `text` and applies it with [`Self::replace_record`].
    ///
    /// # Errors
    ///
    /// `InvalidJson` when `text` does not parse; the record is untouched.
    pub fn replace_record_json(&mut self, text: &str) -> Result<&SectionRecord, StoreError> {
        let parsed: Value =
            serde_json::from_str(text).map_err(|e| StoreError::InvalidJson(e.to_string()))?;
        Ok(self.replace_record(&parsed))
    }

    /// Appends a repeatable entry, completing it from the element defaults.
    pub fn append_entry(&mut self, path: &FieldPath, entry: &Value) -> Result<&SectionRecord, StoreError> {
        let element = self.sequence_element(path)?;
        let completed = ConsolidationMerger::entry(element, entry);

        let mut root = self.record.as_value().clone();
        let items = sequence_mut(&mut root, path)?;
        items.push(completed);
        let len = items.len();

        debug!(section = %self.section(), path = %path, len, "Entry appended");
        Ok(self.commit(root))
    }

    /// Removes the entry at `index`; later entries shift down.
    pub fn remove_entry(&mut self, path: &FieldPath, index: usize) -> Result<&SectionRecord, StoreError> {
        self.sequence_element(path)?;

        let mut root = self.record.as_value().clone();
        let items = sequence_mut(&mut root, path)?;
        if index >= items.len() {
            return Err(SchemaViolation::new(
                path,
                format!("entry index {} out of range (len {})", index, items.len()),
            )
            .into());
        }
        items.remove(index);

        debug!(section = %self.section(), path = %path, index, "Entry removed");
        Ok(self.commit(root))
    }

    fn sequence_element(&self, path: &FieldPath) -> Result<&SchemaNode, StoreError> {
        match self.schema.resolve(path)? {
            SchemaNode::Sequence(element) => Ok(element),
            _ => Err(SchemaViolation::new(path, "not a repeatable entry list").into()),
        }
    }

    /// Recomputes derived fields over `root`, stores and notifies if the
    /// result differs from the current record.
    fn commit(&mut self, root: Value) -> &SectionRecord {
        let candidate = SectionRecord::from_value(self.section(), root);
        let next = DerivedFieldRules::recompute(&self.schema, &candidate);
        if next == self.record {
            return &self.record;
        }

        self.record = next;
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.record);
        }
        &self.record
    }
}

impl fmt::Debug for SectionRecordStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionRecordStore")
            .field("section", &self.section())
            .field("record", &self.record)
            .field("has_listener", &self.listener.is_some())
            .finish()
    }
}

fn sequence_mut<'a>(root: &'a mut Value, path: &FieldPath) -> Result<&'a mut Vec<Value>, StoreError> {
    lookup_mut(root, path)
        .and_then(Value::as_array_mut)
        .ok_or_else(|| SchemaViolation::new(path, "no entry list at this path").into())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
