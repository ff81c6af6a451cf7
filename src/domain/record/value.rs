//! SectionRecord - an immutable, cheaply shared JSON tree for one section.

use serde::{Serialize, Serializer};
use serde_json::{Number, Value};
use std::sync::Arc;

use crate::domain::foundation::{FieldPath, SectionName};

/// Consolidated manual data for one disclosure section.
///
/// The tree is shared behind an `Arc`, so clones are cheap and an unchanged
/// merge can hand back the very same tree (see [`SectionRecord::shares_root_with`]).
/// Records are never mutated in place; every operation builds a new one.
#[derive(Debug, Clone)]
pub struct SectionRecord {
    section: SectionName,
    root: Arc<Value>,
}

impl SectionRecord {
    pub(crate) fn from_value(section: SectionName, root: Value) -> Self {
        Self {
            section,
            root: Arc::new(root),
        }
    }

    pub fn section(&self) -> SectionName {
        self.section
    }

    /// Borrow the whole record tree.
    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Consumes the record, cloning the tree only if it is still shared.
    pub fn into_value(self) -> Value {
        Arc::try_unwrap(self.root).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Value stored at `path`, if the path exists in this record.
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        lookup(&self.root, path)
    }

    /// Numeric reading of the leaf at `path` (see [`coerce_number`]).
    pub fn number_at(&self, path: &FieldPath) -> f64 {
        coerce_number(self.get(path))
    }

    /// True when both records point at the same underlying tree.
    pub fn shares_root_with(&self, other: &SectionRecord) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    /// Serializes the record to a compact JSON string.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&*self.root)
    }
}

impl PartialEq for SectionRecord {
    fn eq(&self, other: &Self) -> bool {
        self.section == other.section
            && (Arc::ptr_eq(&self.root, &other.root) || self.root == other.root)
    }
}

impl Serialize for SectionRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

/// Reads a value by path. Numeric segments index into arrays.
pub(crate) fn lookup<'a>(root: &'a Value, path: &FieldPath) -> Option<&'a Value> {
    path.segments().iter().try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Mutable variant of [`lookup`].
pub(crate) fn lookup_mut<'a>(root: &'a mut Value, path: &FieldPath) -> Option<&'a mut Value> {
    path.segments().iter().try_fold(root, |node, segment| match node {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    })
}

/// Reads a leaf as a number.
///
/// JSON numbers are used as-is, strings are parsed after trimming, and
/// anything else (absent, boolean, non-numeric text, non-finite) reads as 0.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|x| x.is_finite()).unwrap_or(0.0)
}

/// Builds a JSON number, keeping whole values as integers.
pub fn number_value(x: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if x.fract() == 0.0 && x.abs() < MAX_EXACT {
        return Value::from(x as i64);
    }
    Number::from_f64(x).map(Value::Number).unwrap_or_else(|| Value::from(0))
}
