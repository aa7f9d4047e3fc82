use serde::{Deserialize, Serialize};

use super::arena::{NodeId, NodeTree};

/// Order in which siblings are linked before a fresh layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Largest value first; ties keep input order.
    #[default]
    Descending,
    /// Smallest value first; ties keep input order.
    Ascending,
    /// Leave siblings in the order they were built.
    Input,
}

/// Compute aggregated values for all internal nodes (bottom-up).
/// After this, each internal node's `value` equals the sum of its children's values.
/// Leaf values that are NaN or negative are stored as 0.
pub fn aggregate_values(tree: &mut NodeTree) {
    // Children always have higher indices than their parents in the arena,
    // so a reverse sweep visits every child before its parent.
    let len = tree.nodes.len();
    for i in (0..len).rev() {
        let node = &tree.nodes[i];
        if node.first_child.is_none() {
            let v = node.value;
            if v.is_nan() || v < 0.0 {
                tracing::debug!("Clamping invalid value {} on leaf '{}'", v, node.name);
                tree.nodes[i].value = 0.0;
            }
            continue;
        }

        let mut total = 0.0;
        let mut child = node.first_child;
        while let Some(child_id) = child {
            total += tree.nodes[child_id.index()].value;
            child = tree.nodes[child_id.index()].next_sibling;
        }
        tree.nodes[i].value = total;
    }
}

/// Re-link the sibling list of every internal node according to `order`.
/// Nodes are not moved in the arena.
pub fn sort_children(tree: &mut NodeTree, order: SortOrder) {
    if order == SortOrder::Input {
        return;
    }

    let len = tree.nodes.len();
    let mut children: Vec<NodeId> = Vec::new();
    for i in 0..len {
        if tree.nodes[i].first_child.is_none() {
            continue;
        }

        children.clear();
        let mut child = tree.nodes[i].first_child;
        while let Some(child_id) = child {
            children.push(child_id);
            child = tree.nodes[child_id.index()].next_sibling;
        }

        // Stable sort keeps input order among equal values
        let nodes = &tree.nodes;
        match order {
            SortOrder::Descending => children.sort_by(|a, b| {
                nodes[b.index()].value.total_cmp(&nodes[a.index()].value)
            }),
            SortOrder::Ascending => children.sort_by(|a, b| {
                nodes[a.index()].value.total_cmp(&nodes[b.index()].value)
            }),
            SortOrder::Input => unreachable!("handled above"),
        }

        relink(tree, NodeId(i as u32), &children);
    }
}

fn relink(tree: &mut NodeTree, parent: NodeId, children: &[NodeId]) {
    let (Some(&first), Some(&last)) = (children.first(), children.last()) else {
        return;
    };
    tree.nodes[parent.index()].first_child = Some(first);
    tree.nodes[parent.index()].last_child = Some(last);
    for w in children.windows(2) {
        tree.nodes[w[0].index()].next_sibling = Some(w[1]);
    }
    tree.nodes[last.index()].next_sibling = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::arena::TreeNode;

    fn flat(values: &[f64]) -> NodeTree {
        let mut tree = NodeTree::new("root");
        for (i, &v) in values.iter().enumerate() {
            tree.add_child(tree.root, TreeNode::new(&format!("n{i}"), v));
        }
        tree
    }

    fn child_values(tree: &NodeTree) -> Vec<f64> {
        tree.children(tree.root).map(|id| tree.get(id).value).collect()
    }

    #[test]
    fn aggregate_sums_nested_children() {
        let mut tree = NodeTree::new("root");
        let a = tree.add_child(tree.root, TreeNode::new("a", 99.0));
        tree.add_child(a, TreeNode::new("a1", 2.0));
        tree.add_child(a, TreeNode::new("a2", 3.0));
        tree.add_child(tree.root, TreeNode::new("b", 5.0));

        aggregate_values(&mut tree);

        assert_eq!(tree.get(a).value, 5.0);
        assert_eq!(tree.get(tree.root).value, 10.0);
    }

    #[test]
    fn aggregate_clamps_invalid_leaves() {
        let mut tree = flat(&[f64::NAN, -4.0, 6.0]);
        aggregate_values(&mut tree);
        assert_eq!(child_values(&tree), vec![0.0, 0.0, 6.0]);
        assert_eq!(tree.get(tree.root).value, 6.0);
    }

    #[test]
    fn descending_sort_is_stable() {
        let mut tree = flat(&[1.0, 3.0, 2.0, 3.0]);
        sort_children(&mut tree, SortOrder::Descending);
        let ids: Vec<_> = tree.children(tree.root).collect();
        assert_eq!(ids, vec![NodeId(2), NodeId(4), NodeId(3), NodeId(1)]);
        assert_eq!(tree.get(tree.root).last_child, Some(NodeId(1)));
    }

    #[test]
    fn ascending_and_input_orders() {
        let mut tree = flat(&[1.0, 3.0, 2.0]);
        sort_children(&mut tree, SortOrder::Input);
        assert_eq!(child_values(&tree), vec![1.0, 3.0, 2.0]);
        sort_children(&mut tree, SortOrder::Ascending);
        assert_eq!(child_values(&tree), vec![1.0, 2.0, 3.0]);
    }
}
