//! Consolidation Merger - overlays partial external data on a baseline record.

use serde_json::{Map, Value};

use super::schema::{SchemaNode, SectionSchema};
use super::value::SectionRecord;

/// Schema-driven deep merge.
///
/// Every leaf of the result comes from `incoming` when it supplies a
/// scalar there, converted to the leaf's kind (a cleared number reads 0),
/// and from the baseline otherwise. Keys the schema does not know are
/// dropped, `null` means "not supplied", and repeatable sequences are
/// replaced as a whole with each entry filled out from the element defaults.
pub struct ConsolidationMerger;

impl ConsolidationMerger {
    /// Overlays `incoming` on `baseline`.
    ///
    /// Returns the baseline itself (same shared tree) when the overlay
    /// changes nothing, so callers can skip redundant work.
    pub fn merge(schema: &SectionSchema, baseline: &SectionRecord, incoming: &Value) -> SectionRecord {
        let merged = Self::merge_node(schema.root(), baseline.as_value(), incoming);
        if &merged == baseline.as_value() {
            baseline.clone()
        } else {
            SectionRecord::from_value(baseline.section(), merged)
        }
    }

    /// Merges one subtree described by `node`.
    pub fn merge_node(node: &SchemaNode, base: &Value, incoming: &Value) -> Value {
        if incoming.is_null() {
            return Self::conform(node, base);
        }

        match node {
            SchemaNode::Scalar { kind, .. } => kind
                .coerce(incoming)
                .unwrap_or_else(|| Self::conform(node, base)),
            SchemaNode::Object(children) => {
                let Value::Object(patch) = incoming else {
                    return Self::conform(node, base);
                };
                let merged = children
                    .iter()
                    .map(|(key, child)| {
                        let base_child = base.get(key).unwrap_or(&Value::Null);
                        let value = match patch.get(key) {
                            Some(patch_child) => Self::merge_node(child, base_child, patch_child),
                            None => Self::conform(child, base_child),
                        };
                        (key.clone(), value)
                    })
                    .collect::<Map<String, Value>>();
                Value::Object(merged)
            }
            SchemaNode::Sequence(element) => match incoming {
                Value::Array(items) => Value::Array(
                    items
                        .iter()
                        .filter(|item| !item.is_null())
                        .map(|item| Self::entry(element, item))
                        .collect(),
                ),
                // A lone entry where a list is expected.
                Value::Object(_) => Value::Array(vec![Self::entry(element, incoming)]),
                _ => Self::conform(node, base),
            },
        }
    }

    /// A sequence entry merged over the element defaults.
    pub fn entry(element: &SchemaNode, incoming: &Value) -> Value {
        Self::merge_node(element, &element.default_value(), incoming)
    }

    /// `base` with every schema key present, falling back to defaults where
    /// it is missing or the wrong shape.
    fn conform(node: &SchemaNode, base: &Value) -> Value {
        match (node, base) {
            (SchemaNode::Scalar { kind, default }, value) => {
                kind.coerce(value).unwrap_or_else(|| default.clone())
            }
            (SchemaNode::Object(children), Value::Object(map)) => Value::Object(
                children
                    .iter()
                    .map(|(key, child)| {
                        let value = Self::conform(child, map.get(key).unwrap_or(&Value::Null));
                        (key.clone(), value)
                    })
                    .collect(),
            ),
            (SchemaNode::Sequence(element), Value::Array(items)) => Value::Array(
                items
                    .iter()
                    .map(|item| Self::conform(element, item))
                    .collect(),
            ),
            _ => node.default_value(),
        }
    }
}
