// ── Configuration tree paths ──
//
// A VyOS configuration path is an ordered list of opaque segments. Paths
// are only ever built by appending segments, never by joining a string and
// splitting it again, so a value can never silently spill into the next
// segment.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A value could not be used as a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("{field} must not be empty")]
    Empty { field: String },

    #[error("{field} must not contain whitespace (got {value:?})")]
    Whitespace { field: String, value: String },
}

impl PathError {
    /// Name of the request field that produced the bad segment.
    pub fn field(&self) -> &str {
        match self {
            Self::Empty { field } | Self::Whitespace { field, .. } => field,
        }
    }
}

/// Ordered, non-empty sequence of configuration segments.
///
/// Serializes as a JSON array of strings, which is exactly what the VyOS
/// API expects in the `path` field of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConfigPath(Vec<String>);

impl ConfigPath {
    /// Start a path at a fixed top-level keyword (`"interfaces"`, `"vrf"`, ...).
    pub fn root(keyword: &'static str) -> Self {
        Self(vec![keyword.to_owned()])
    }

    /// Append a fixed keyword segment.
    pub fn kw(mut self, keyword: &'static str) -> Self {
        debug_assert!(
            check_segment("keyword", keyword).is_ok(),
            "keyword segments are literals"
        );
        self.0.push(keyword.to_owned());
        self
    }

    /// Append a caller-supplied value, rejecting anything that would not
    /// survive as exactly one segment.
    ///
    /// `field` names the request field the value came from and is carried
    /// in the error.
    pub fn value(mut self, field: &str, value: &str) -> Result<Self, PathError> {
        check_segment(field, value)?;
        self.0.push(value.to_owned());
        Ok(self)
    }

    /// Append a numeric identifier (rule number, VLAN id, range index).
    pub fn number(mut self, id: u32) -> Self {
        self.0.push(id.to_string());
        self
    }

    /// Borrow a path that extends this one without consuming it.
    pub fn child(&self, keyword: &'static str) -> Self {
        self.clone().kw(keyword)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The final segment; the remote store names its response envelope after it.
    pub fn last(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

fn check_segment(field: &str, value: &str) -> Result<(), PathError> {
    if value.is_empty() {
        return Err(PathError::Empty {
            field: field.to_owned(),
        });
    }
    if value.chars().any(char::is_whitespace) {
        return Err(PathError::Whitespace {
            field: field.to_owned(),
            value: value.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn builds_segments_in_order() {
        let path = ConfigPath::root("vrf")
            .kw("name")
            .value("name", "MGMT")
            .unwrap()
            .kw("table")
            .value("table", "100")
            .unwrap();
        assert_eq!(path.segments(), ["vrf", "name", "MGMT", "table", "100"]);
        assert_eq!(path.to_string(), "vrf name MGMT table 100");
        assert_eq!(path.last(), "100");
    }

    #[test]
    fn whitespace_value_is_rejected_not_truncated() {
        let err = ConfigPath::root("vrf")
            .kw("name")
            .value("description", "management network")
            .unwrap_err();
        assert_eq!(err.field(), "description");
        assert!(matches!(err, PathError::Whitespace { .. }));
    }

    #[test]
    fn tabs_and_newlines_count_as_whitespace() {
        assert!(ConfigPath::root("x").value("v", "a\tb").is_err());
        assert!(ConfigPath::root("x").value("v", "a\nb").is_err());
    }

    #[test]
    fn empty_value_is_rejected() {
        let err = ConfigPath::root("x").value("name", "").unwrap_err();
        assert_eq!(err, PathError::Empty { field: "name".into() });
    }

    #[test]
    fn child_leaves_parent_untouched() {
        let base = ConfigPath::root("nat").kw("source").kw("rule").number(10);
        let desc = base.child("description");
        assert_eq!(base.len(), 4);
        assert_eq!(desc.segments(), ["nat", "source", "rule", "10", "description"]);
    }

    #[test]
    fn serializes_as_string_array() {
        let path = ConfigPath::root("interfaces").kw("ethernet");
        assert_eq!(
            serde_json::to_value(&path).unwrap(),
            serde_json::json!(["interfaces", "ethernet"])
        );
    }
}
