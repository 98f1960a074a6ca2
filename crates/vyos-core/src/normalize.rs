// ── Tree normalizer ──
//
// Pure functions that turn `TreeNode`s into resource-shaped values. Every
// helper folds the "absent" case into a concrete default (empty string,
// empty vec, `false`) so models never carry `Option` for data the device
// simply did not return.

use vyos_api::TreeNode;

/// All values of a possibly multi-valued leaf, in device order.
///
/// One value comes back as a bare scalar, several as a list; both normalize
/// to a vec. Absent or subtree-shaped nodes yield an empty vec.
pub fn scalar_list(node: Option<&TreeNode>) -> Vec<String> {
    match node {
        Some(TreeNode::Scalar(value)) => vec![value.clone()],
        Some(TreeNode::List(values)) => values.clone(),
        Some(TreeNode::Map(_)) | None => Vec::new(),
    }
}

/// A single-valued leaf. A multi-valued leaf yields its first value.
pub fn scalar(node: Option<&TreeNode>) -> String {
    match node {
        Some(TreeNode::Scalar(value)) => value.clone(),
        Some(TreeNode::List(values)) => values.first().cloned().unwrap_or_default(),
        Some(TreeNode::Map(_)) | None => String::new(),
    }
}

/// Shorthand for `scalar(container.at(keys))`.
pub fn field(container: &TreeNode, keys: &[&str]) -> String {
    scalar(container.at(keys))
}

/// `true` iff `key` is present under `container`, whatever its value.
pub fn presence_flag(container: &TreeNode, key: &str) -> bool {
    container.get(key).is_some()
}

/// Children of a keyed subtree, in key order. Leaves have no children.
pub fn keyed_children(node: Option<&TreeNode>) -> impl Iterator<Item = (&str, &TreeNode)> {
    node.and_then(TreeNode::as_map)
        .into_iter()
        .flatten()
        .map(|(key, child)| (key.as_str(), child))
}

/// Children keyed by a numeric identifier, sorted ascending by number.
///
/// Map order is lexical ("100" < "20"); rule evaluation order is numeric.
/// Keys that are not numbers are dropped.
pub fn numeric_children(node: Option<&TreeNode>) -> Vec<(u32, &TreeNode)> {
    let mut children: Vec<(u32, &TreeNode)> = keyed_children(node)
        .filter_map(|(key, child)| key.parse::<u32>().ok().map(|id| (id, child)))
        .collect();
    children.sort_by_key(|(id, _)| *id);
    children
}

/// Strip the optional single-key envelope the device wraps some replies in.
///
/// Fetching `vrf name` may answer `{"name": {...}}` rather than `{...}`.
/// The envelope is recognised only as a map whose sole key is `wrapper`
/// and whose value is itself a map.
pub fn unwrap_envelope<'a>(node: &'a TreeNode, wrapper: &str) -> &'a TreeNode {
    match node.as_map() {
        Some(map) if map.len() == 1 => match map.get(wrapper) {
            Some(inner @ TreeNode::Map(_)) => inner,
            _ => node,
        },
        _ => node,
    }
}
