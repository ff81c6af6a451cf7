//! Section schemas built from embedded default templates.
//!
//! A template is the fully-defaulted record of a section, written as JSON:
//!
//! - `""` (or any string) declares a text leaf with that default
//! - a number declares a numeric leaf with that default
//! - `true`/`false` declares a boolean leaf
//! - an object declares a nested record
//! - an array holding exactly one element declares a repeatable sequence
//!   whose element schema is that element; the sequence defaults to empty
//!
//! Templates are compiled into the binary via `include_str!` and parsed once.

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::derived::{self, DerivedRule};
use super::value::{coerce_number, number_value, SectionRecord};
use crate::domain::foundation::{FieldPath, SectionName};

/// Kind of a scalar leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Text,
    Number,
    Boolean,
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Text => "text",
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
        }
    }

    /// Converts any scalar to this kind. `None` for null, arrays and objects.
    ///
    /// A number leaf reads text the way the derived rules do, so a cleared
    /// or non-numeric input becomes 0. Booleans become 1/0 there and
    /// `"true"`/`"false"` on text leaves. A boolean leaf is true for `true`,
    /// any non-zero number, and the strings "true", "yes" or "1".
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (_, Value::Null | Value::Array(_) | Value::Object(_)) => None,
            (ScalarKind::Text, Value::String(s)) => Some(Value::String(s.clone())),
            (ScalarKind::Text, Value::Number(n)) => Some(Value::String(n.to_string())),
            (ScalarKind::Text, Value::Bool(b)) => Some(Value::String(b.to_string())),
            (ScalarKind::Number, Value::Bool(b)) => Some(Value::from(u8::from(*b))),
            (ScalarKind::Number, v) => Some(number_value(coerce_number(Some(v)))),
            (ScalarKind::Boolean, Value::Bool(b)) => Some(Value::Bool(*b)),
            (ScalarKind::Boolean, Value::Number(n)) => {
                Some(Value::Bool(n.as_f64().map_or(false, |x| x != 0.0)))
            }
            (ScalarKind::Boolean, Value::String(s)) => {
                let s = s.trim();
                let truthy = ["true", "yes", "1"].iter().any(|t| s.eq_ignore_ascii_case(t));
                Some(Value::Bool(truthy))
            }
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One node of a section schema.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Scalar { kind: ScalarKind, default: Value },
    /// Keys in declaration order.
    Object(Vec<(String, SchemaNode)>),
    /// Repeatable entries; the box holds the element schema.
    Sequence(Box<SchemaNode>),
}

/// A write addressed a path the schema does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Schema violation at '{path}': {reason}")]
pub struct SchemaViolation {
    pub path: String,
    pub reason: String,
}

impl SchemaViolation {
    pub fn new(path: impl fmt::Display, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while building a schema from a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template value at '{path}' is null")]
    NullValue { path: String },

    #[error("Sequence template at '{path}' must hold exactly one element, found {found}")]
    SequenceArity { path: String, found: usize },

    #[error("Derived field rule references '{path}': {reason}")]
    InvalidDerivedPath { path: String, reason: String },

    #[error("Invalid template JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SchemaNode {
    /// Builds a schema tree from a default template.
    pub fn from_template(template: &Value) -> Result<Self, TemplateError> {
        Self::build(template, "$")
    }

    fn build(template: &Value, at: &str) -> Result<Self, TemplateError> {
        match template {
            Value::Null => Err(TemplateError::NullValue {
                path: at.to_string(),
            }),
            Value::String(_) => Ok(SchemaNode::Scalar {
                kind: ScalarKind::Text,
                default: template.clone(),
            }),
            Value::Number(_) => Ok(SchemaNode::Scalar {
                kind: ScalarKind::Number,
                default: template.clone(),
            }),
            Value::Bool(_) => Ok(SchemaNode::Scalar {
                kind: ScalarKind::Boolean,
                default: template.clone(),
            }),
            Value::Array(items) => match items.as_slice() {
                [element] => Ok(SchemaNode::Sequence(Box::new(Self::build(
                    element,
                    &format!("{}[]", at),
                )?))),
                _ => Err(TemplateError::SequenceArity {
                    path: at.to_string(),
                    found: items.len(),
                }),
            },
            Value::Object(map) => {
                let children = map
                    .iter()
                    .map(|(key, child)| {
                        Self::build(child, &format!("{}.{}", at, key)).map(|node| (key.clone(), node))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SchemaNode::Object(children))
            }
        }
    }

    /// The fully-defaulted value for this node.
    pub fn default_value(&self) -> Value {
        match self {
            SchemaNode::Scalar { default, .. } => default.clone(),
            SchemaNode::Object(children) => Value::Object(
                children
                    .iter()
                    .map(|(key, child)| (key.clone(), child.default_value()))
                    .collect::<Map<String, Value>>(),
            ),
            SchemaNode::Sequence(_) => Value::Array(Vec::new()),
        }
    }

    /// Child schema of an object node.
    pub fn child(&self, key: &str) -> Option<&SchemaNode> {
        match self {
            SchemaNode::Object(children) => children
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, node)| node),
            _ => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, SchemaNode::Scalar { .. })
    }

    /// Every scalar leaf reachable without entering a sequence.
    pub fn leaf_paths(&self) -> Vec<(FieldPath, ScalarKind)> {
        let mut out = Vec::new();
        self.collect_leaves(&mut Vec::new(), &mut out);
        out
    }

    fn collect_leaves(&self, prefix: &mut Vec<String>, out: &mut Vec<(FieldPath, ScalarKind)>) {
        match self {
            SchemaNode::Scalar { kind, .. } => {
                if let Ok(path) = FieldPath::new(prefix.iter().cloned()) {
                    out.push((path, *kind));
                }
            }
            SchemaNode::Object(children) => {
                for (key, child) in children {
                    prefix.push(key.clone());
                    child.collect_leaves(prefix, out);
                    prefix.pop();
                }
            }
            SchemaNode::Sequence(_) => {}
        }
    }
}

/// Schema of one disclosure section plus its derived-field rules.
#[derive(Debug, Clone)]
pub struct SectionSchema {
    section: SectionName,
    root: SchemaNode,
    defaults: Value,
    derived: Vec<DerivedRule>,
}

impl SectionSchema {
    /// Builds a schema from a template, checking every derived rule
    /// against it.
    pub fn from_template(
        section: SectionName,
        template: &Value,
        derived: Vec<DerivedRule>,
    ) -> Result<Self, TemplateError> {
        let root = SchemaNode::from_template(template)?;
        let defaults = root.default_value();
        let schema = Self {
            section,
            root,
            defaults,
            derived,
        };

        for rule in &schema.derived {
            for path in std::iter::once(rule.target()).chain(rule.inputs()) {
                match schema.resolve(path) {
                    Ok(SchemaNode::Scalar {
                        kind: ScalarKind::Number,
                        ..
                    }) => {}
                    Ok(_) => {
                        return Err(TemplateError::InvalidDerivedPath {
                            path: path.to_string(),
                            reason: "not a numeric leaf".to_string(),
                        })
                    }
                    Err(violation) => {
                        return Err(TemplateError::InvalidDerivedPath {
                            path: path.to_string(),
                            reason: violation.reason,
                        })
                    }
                }
            }
        }

        Ok(schema)
    }

    /// Shared schema for one of the built-in sections.
    pub fn for_section(section: SectionName) -> Arc<SectionSchema> {
        Arc::clone(&SCHEMAS[&section])
    }

    pub fn section(&self) -> SectionName {
        self.section
    }

    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    pub fn derived_rules(&self) -> &[DerivedRule] {
        &self.derived
    }

    /// The fully-defaulted record for this section.
    pub fn defaults(&self) -> SectionRecord {
        SectionRecord::from_value(self.section, self.defaults.clone())
    }

    /// True if `path` is computed by a derived rule.
    pub fn is_derived(&self, path: &FieldPath) -> bool {
        self.derived.iter().any(|rule| rule.target() == path)
    }

    /// Resolves `path` to its schema node.
    ///
    /// Index segments are only accepted directly below a sequence; whether
    /// the index exists depends on the record and is checked by the caller.
    pub fn resolve(&self, path: &FieldPath) -> Result<&SchemaNode, SchemaViolation> {
        let mut node = &self.root;
        for (depth, segment) in path.segments().iter().enumerate() {
            node = match node {
                SchemaNode::Object(_) => node.child(segment).ok_or_else(|| {
                    SchemaViolation::new(path, format!("unknown field '{}'", segment))
                })?,
                SchemaNode::Sequence(element) => {
                    segment.parse::<usize>().map_err(|_| {
                        SchemaViolation::new(
                            path,
                            format!("expected an entry index at segment {}, got '{}'", depth, segment),
                        )
                    })?;
                    element
                }
                SchemaNode::Scalar { kind, .. } => {
                    return Err(SchemaViolation::new(
                        path,
                        format!("cannot descend into {} leaf at segment {}", kind, depth),
                    ))
                }
            };
        }
        Ok(node)
    }

    /// Copy of `incoming` with every derived field removed, so derived
    /// values are never taken from outside.
    pub fn strip_derived(&self, incoming: &Value) -> Value {
        let mut stripped = incoming.clone();
        for rule in &self.derived {
            let target = rule.target();
            let parent = match target.parent() {
                Some(parent) => super::value::lookup_mut(&mut stripped, &parent),
                None => Some(&mut stripped),
            };
            if let Some(Value::Object(map)) = parent {
                map.remove(target.leaf());
            }
        }
        stripped
    }
}

static SCHEMAS: Lazy<BTreeMap<SectionName, Arc<SectionSchema>>> = Lazy::new(|| {
    SectionName::all()
        .iter()
        .map(|&section| (section, Arc::new(load_builtin(section))))
        .collect()
});

fn template_source(section: SectionName) -> &'static str {
    match section {
        SectionName::SectionA => include_str!("templates/section_a.json"),
        SectionName::SectionB => include_str!("templates/section_b.json"),
        SectionName::Principle1 => include_str!("templates/principle1.json"),
        SectionName::Principle2 => include_str!("templates/principle2.json"),
        SectionName::Principle3 => include_str!("templates/principle3.json"),
        SectionName::Principle4 => include_str!("templates/principle4.json"),
        SectionName::Principle5 => include_str!("templates/principle5.json"),
        SectionName::Principle6 => include_str!("templates/principle6.json"),
        SectionName::Principle7 => include_str!("templates/principle7.json"),
        SectionName::Principle8 => include_str!("templates/principle8.json"),
        SectionName::Principle9 => include_str!("templates/principle9.json"),
    }
}

fn load_builtin(section: SectionName) -> SectionSchema {
    let template: Value = serde_json::from_str(template_source(section))
        .unwrap_or_else(|e| panic!("Failed to parse template for {}: {}", section, e));
    SectionSchema::from_template(section, &template, derived::rules_for(section))
        .unwrap_or_else(|e| panic!("Invalid template for {}: {}", section, e))
}
