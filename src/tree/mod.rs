pub mod aggregate;
pub mod arena;
pub mod input;

use std::path::Path;

use self::arena::{NodeId, NodeTree, TreeNode};
use self::input::{NodeSpec, ValueMode};
use crate::error::Result;

/// Build a NodeTree from hierarchical input, then aggregate internal values.
pub fn build_tree(spec: &NodeSpec, mode: ValueMode) -> NodeTree {
    let mut tree = NodeTree::new(&spec.name);
    fill_node(tree.get_mut(tree.root), spec, mode);

    // Iterative walk to avoid stack overflow on deep inputs
    let mut pending: Vec<(NodeId, &NodeSpec)> = vec![(tree.root, spec)];
    while let Some((parent, parent_spec)) = pending.pop() {
        let Some(children) = parent_spec.children.as_deref() else {
            continue;
        };
        for child_spec in children {
            let mut node = TreeNode::new(&child_spec.name, 0.0);
            fill_node(&mut node, child_spec, mode);
            let id = tree.add_child(parent, node);
            pending.push((id, child_spec));
        }
    }

    aggregate::aggregate_values(&mut tree);

    tracing::debug!(
        "Tree built: {} total nodes, {} leaves, root value {}",
        tree.len(),
        tree.leaves().len(),
        tree.get(tree.root).value
    );

    tree
}

/// Wrap a flat list of top-level nodes in a synthetic root and build it.
pub fn build_forest(items: &[NodeSpec], mode: ValueMode) -> NodeTree {
    let root = NodeSpec::branch("", items.to_vec());
    build_tree(&root, mode)
}

/// Parse JSON (a single root object, or an array of top-level nodes).
pub fn from_json_str(json: &str, mode: ValueMode) -> Result<NodeTree> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.is_array() {
        let items: Vec<NodeSpec> = serde_json::from_value(value)?;
        Ok(build_forest(&items, mode))
    } else {
        let spec: NodeSpec = serde_json::from_value(value)?;
        Ok(build_tree(&spec, mode))
    }
}

/// Read and parse a JSON tree file.
pub fn load_json(path: impl AsRef<Path>, mode: ValueMode) -> Result<NodeTree> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let tree = from_json_str(&json, mode)?;
    tracing::info!("Loaded {} nodes from {}", tree.len(), path.display());
    Ok(tree)
}

/// Assign new leaf values in place and re-aggregate.
/// Node ids and sibling order are unchanged, so a sticky layout keeps its rows.
pub fn revalue<F>(tree: &mut NodeTree, mut f: F)
where
    F: FnMut(NodeId, &TreeNode) -> f64,
{
    for id in tree.leaves() {
        let v = f(id, tree.get(id));
        tree.get_mut(id).value = v;
    }
    aggregate::aggregate_values(tree);
}

fn fill_node(node: &mut TreeNode, spec: &NodeSpec, mode: ValueMode) {
    node.value = if spec.has_children() {
        0.0
    } else {
        mode.weight(spec)
    };
    node.color = spec.color.clone();
    node.label = spec.label.clone();
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLARE: &str = r#"{
        "name": "flare",
        "children": [
            {"name": "analytics", "children": [
                {"name": "AgglomerativeCluster", "size": 3938},
                {"name": "CommunityStructure", "size": 3812}
            ]},
            {"name": "animate", "children": [
                {"name": "Easing", "size": 17010}
            ]},
            {"name": "empty", "children": []}
        ]
    }"#;

    #[test]
    fn builds_flare_shape_with_sizes() {
        let tree = from_json_str(FLARE, ValueMode::Size).unwrap();
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.get(tree.root).value, 3938.0 + 3812.0 + 17010.0);
        let analytics = tree.children(tree.root).next().unwrap();
        assert_eq!(tree.get(analytics).value, 7750.0);
        assert_eq!(tree.path(NodeId(5), "/"), "flare/analytics/AgglomerativeCluster");
    }

    #[test]
    fn count_mode_weighs_every_leaf_once() {
        let tree = from_json_str(FLARE, ValueMode::Count).unwrap();
        // "empty" has no children, so it counts as a leaf
        assert_eq!(tree.get(tree.root).value, 4.0);
    }

    #[test]
    fn array_input_becomes_forest() {
        let tree = from_json_str(r##"[{"value": 1, "color": "#1f77b4"}, {"value": 2}]"##, ValueMode::Value)
            .unwrap();
        assert_eq!(tree.children(tree.root).count(), 2);
        assert_eq!(tree.get(tree.root).value, 3.0);
        assert_eq!(tree.get(NodeId(1)).color.as_deref(), Some("#1f77b4"));
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(from_json_str("{\"children\": 5}", ValueMode::Value).is_err());
    }

    #[test]
    fn revalue_keeps_ids_and_reaggregates() {
        let mut tree = build_forest(
            &[NodeSpec::leaf("a", 1.0), NodeSpec::leaf("b", 2.0)],
            ValueMode::Value,
        );
        let before: Vec<_> = tree.children(tree.root).collect();
        revalue(&mut tree, |id, _| id.0 as f64 * 10.0);
        let after: Vec<_> = tree.children(tree.root).collect();
        assert_eq!(before, after);
        assert_eq!(tree.get(tree.root).value, 30.0);
    }
}
