//! FieldPath value object addressing one leaf or subtree of a section record.

use std::fmt;
use std::str::FromStr;

use super::errors::ValidationError;

/// Ordered sequence of keys from a record root to a leaf or subtree.
///
/// Numeric segments address repeatable entries by position, e.g.
/// `essential.q2_finesPenalties.monetary.0.amountInr`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Builds a path from segments, rejecting empty paths and empty keys.
    pub fn new<I, S>(segments: I) -> Result<Self, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(ValidationError::empty_field("path"));
        }
        if segments.iter().any(|s| s.trim().is_empty()) {
            return Err(ValidationError::invalid_format("path", "empty segment"));
        }
        Ok(Self { segments })
    }

    /// Parses a dotted path such as `employees.permanent.male`.
    pub fn parse(dotted: &str) -> Result<Self, ValidationError> {
        if dotted.trim().is_empty() {
            return Err(ValidationError::empty_field("path"));
        }
        Self::new(dotted.split('.'))
    }

    /// Builds a path from a dotted literal known to be well formed.
    pub(crate) fn from_literal(dotted: &str) -> Self {
        Self {
            segments: dotted.split('.').map(str::to_string).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Last segment (the leaf key).
    pub fn leaf(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Path of the containing subtree, or `None` for a top-level key.
    pub fn parent(&self) -> Option<FieldPath> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// Returns a new path with one more segment.
    pub fn child(&self, segment: impl Into<String>) -> FieldPath {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Returns true if `self` is `other` or lies inside it.
    pub fn starts_with(&self, other: &FieldPath) -> bool {
        self.segments.starts_with(&other.segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl FromStr for FieldPath {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_path() {
        let path = FieldPath::parse("employees.permanent.male").unwrap();
        assert_eq!(path.segments(), &["employees", "permanent", "male"]);
        assert_eq!(path.leaf(), "male");
        assert_eq!(path.to_string(), "employees.permanent.male");
    }

    #[test]
    fn rejects_empty_path_and_segments() {
        assert!(FieldPath::parse("").is_err());
        assert!(FieldPath::parse("employees..male").is_err());
        assert!(FieldPath::new(Vec::<String>::new()).is_err());
    }

    #[test]
    fn parent_and_child_navigate() {
        let path = FieldPath::parse("turnover.employees.total").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "turnover.employees");
        assert_eq!(parent.child("total"), path);
        assert!(path.starts_with(&parent));
        assert!(FieldPath::parse("contactName").unwrap().parent().is_none());
    }
}
