// ── Remote configuration tree ──
//
// VyOS returns configuration as loosely-typed JSON: a leaf with one value
// is a bare string, the same leaf with several values is an array, and
// valueless nodes (`disable`) come back as `{}`. `TreeNode` pins that down
// to three shapes so consumers can match exhaustively.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// One node of the remote configuration tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    /// A single leaf value.
    Scalar(String),
    /// A multi-valued leaf, in the order the device returned it.
    List(Vec<String>),
    /// A keyed subtree. Keys iterate in lexical order.
    Map(BTreeMap<String, TreeNode>),
}

impl TreeNode {
    /// Look up a direct child. Returns `None` for leaves.
    pub fn get(&self, key: &str) -> Option<&TreeNode> {
        match self {
            Self::Map(map) => map.get(key),
            Self::Scalar(_) | Self::List(_) => None,
        }
    }

    /// Walk a sequence of keys from this node.
    pub fn at(&self, keys: &[&str]) -> Option<&TreeNode> {
        keys.iter().try_fold(self, |node, key| node.get(key))
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::List(_) | Self::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, TreeNode>> {
        match self {
            Self::Map(map) => Some(map),
            Self::Scalar(_) | Self::List(_) => None,
        }
    }

    /// An empty map, the shape VyOS uses for valueless nodes.
    pub fn empty() -> Self {
        Self::Map(BTreeMap::new())
    }
}

/// Render a JSON leaf as text, or `None` for containers.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl From<Value> for TreeNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::List(items.iter().filter_map(scalar_text).collect()),
            Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(key, child)| (key, Self::from(child)))
                    .collect(),
            ),
            // A present-but-null child still marks its key as present.
            Value::Null => Self::empty(),
            leaf => Self::Scalar(scalar_text(&leaf).unwrap_or_default()),
        }
    }
}

impl<'de> Deserialize<'de> for TreeNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn string_becomes_scalar() {
        assert_eq!(
            TreeNode::from(json!("10.0.0.1/24")),
            TreeNode::Scalar("10.0.0.1/24".into())
        );
    }

    #[test]
    fn numbers_and_bools_render_as_text() {
        assert_eq!(TreeNode::from(json!(100)), TreeNode::Scalar("100".into()));
        assert_eq!(TreeNode::from(json!(true)), TreeNode::Scalar("true".into()));
    }

    #[test]
    fn array_keeps_only_scalars_in_order() {
        assert_eq!(
            TreeNode::from(json!(["b", {"x": "y"}, "a", null, 7])),
            TreeNode::List(vec!["b".into(), "a".into(), "7".into()])
        );
    }

    #[test]
    fn null_child_keeps_its_key() {
        let node = TreeNode::from(json!({"disable": null, "action": "accept"}));
        assert_eq!(node.get("disable"), Some(&TreeNode::empty()));
        assert_eq!(node.get("action").and_then(TreeNode::as_scalar), Some("accept"));
    }

    #[test]
    fn walks_nested_keys() {
        let node = TreeNode::from(json!({
            "source": {"group": {"address-group": "LAN"}}
        }));
        assert_eq!(
            node.at(&["source", "group", "address-group"])
                .and_then(TreeNode::as_scalar),
            Some("LAN")
        );
        assert_eq!(node.at(&["source", "missing"]), None);
        assert_eq!(node.at(&[]), Some(&node));
    }

    #[test]
    fn deserializes_directly_from_json_text() {
        let node: TreeNode = serde_json::from_str(r#"{"table": "100"}"#).unwrap();
        assert_eq!(node.get("table").and_then(TreeNode::as_scalar), Some("100"));
    }
}
