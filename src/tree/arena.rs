use compact_str::CompactString;
use serde::Serialize;

/// Index into the arena `Vec<TreeNode>`. Uses u32 to save memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Rectangle origin and extents in the root's coordinate space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Cell {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Cell {
    pub const fn new(x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self { x, y, dx, dy }
    }

    pub fn area(&self) -> f64 {
        self.dx * self.dy
    }

    pub fn right(&self) -> f64 {
        self.x + self.dx
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.dy
    }

    /// Half-open containment: the right and bottom edges belong to the neighbour.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Orientation of a closed layout row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Axis {
    /// Row runs along the top edge; consumed height.
    Horizontal,
    /// Row runs along the left edge; consumed width.
    Vertical,
}

/// A single node in the weighted tree, stored in a flat arena.
/// Uses sibling-list representation: each node has `first_child` and `next_sibling`.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Display name (not full path)
    pub name: CompactString,
    /// Optional label shown by a renderer
    pub label: Option<CompactString>,
    /// Optional fill colour, e.g. "#1f77b4"
    pub color: Option<CompactString>,
    /// Weight. For leaves: input value. For internal nodes: aggregated sum of children.
    pub value: f64,
    /// Parent node index (None for root)
    pub parent: Option<NodeId>,
    /// First child node index (None for leaves)
    pub first_child: Option<NodeId>,
    /// Last child node index, kept so appends preserve input order
    pub last_child: Option<NodeId>,
    /// Next sibling node index (None if last child)
    pub next_sibling: Option<NodeId>,
    /// Depth in the tree (root = 0)
    pub depth: u16,
    /// Rectangle assigned by the last layout pass
    pub cell: Cell,
    /// Value scaled to the parent's available area
    pub area: f64,
    /// Set on the last node of each row the layout closed
    pub row_end: Option<Axis>,
}

impl TreeNode {
    /// A detached node with the given name and weight.
    pub fn new(name: &str, value: f64) -> Self {
        Self {
            name: CompactString::new(name),
            label: None,
            color: None,
            value,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            depth: 0,
            cell: Cell::default(),
            area: 0.0,
            row_end: None,
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(CompactString::new(color));
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.first_child.is_none()
    }
}

/// The weighted tree stored as a flat arena of nodes.
#[derive(Debug, Clone)]
pub struct NodeTree {
    /// All nodes in contiguous memory
    pub nodes: Vec<TreeNode>,
    /// Root node index
    pub root: NodeId,
    /// Whether row structure from a previous layout is recorded on the nodes
    pub stuck: bool,
}

impl NodeTree {
    /// Create a tree holding only a root node.
    pub fn new(root_name: &str) -> Self {
        NodeTree {
            nodes: vec![TreeNode::new(root_name, 0.0)],
            root: NodeId(0),
            stuck: false,
        }
    }

    /// Append a child node under the given parent. Returns the new node's ID.
    /// Children always receive a higher index than their parent.
    pub fn add_child(&mut self, parent: NodeId, mut node: TreeNode) -> NodeId {
        let new_id = NodeId(self.nodes.len() as u32);
        node.parent = Some(parent);
        node.depth = self.nodes[parent.index()].depth.saturating_add(1);
        node.next_sibling = None;

        match self.nodes[parent.index()].last_child {
            Some(last) => self.nodes[last.index()].next_sibling = Some(new_id),
            None => self.nodes[parent.index()].first_child = Some(new_id),
        }
        self.nodes[parent.index()].last_child = Some(new_id);

        self.nodes.push(node);
        new_id
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> &mut TreeNode {
        &mut self.nodes[id.index()]
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty (only root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.get(id).is_leaf()
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        ChildIter {
            tree: self,
            current: self.nodes[parent.index()].first_child,
        }
    }

    /// Pre-order traversal starting at `from` (inclusive).
    pub fn descendants(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            out.push(id);
            let start = stack.len();
            stack.extend(self.children(id));
            stack[start..].reverse();
        }
        out
    }

    /// Leaf ids in pre-order.
    pub fn leaves(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.is_leaf(id))
            .collect()
    }

    /// `(parent, child)` pairs in pre-order.
    pub fn links(&self) -> Vec<(NodeId, NodeId)> {
        self.descendants(self.root)
            .into_iter()
            .filter_map(|id| self.get(id).parent.map(|p| (p, id)))
            .collect()
    }

    /// Names from the root down to `id`, joined by `sep`.
    pub fn path(&self, id: NodeId, sep: &str) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);

        while let Some(id) = current {
            let node = self.get(id);
            parts.push(node.name.as_str());
            current = node.parent;
        }

        parts.reverse();
        parts.join(sep)
    }

    /// Forget row structure recorded by a previous layout.
    pub fn clear_rows(&mut self) {
        for node in &mut self.nodes {
            node.row_end = None;
        }
        self.stuck = false;
    }
}

/// Iterator over the children of a node.
pub struct ChildIter<'a> {
    tree: &'a NodeTree,
    current: Option<NodeId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.tree.nodes[id.index()].next_sibling;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> NodeTree {
        let mut tree = NodeTree::new("root");
        let a = tree.add_child(tree.root, TreeNode::new("a", 0.0));
        tree.add_child(a, TreeNode::new("a1", 1.0));
        tree.add_child(a, TreeNode::new("a2", 2.0));
        tree.add_child(tree.root, TreeNode::new("b", 3.0));
        tree
    }

    #[test]
    fn add_child_preserves_insertion_order() {
        let tree = sample();
        let names: Vec<_> = tree
            .children(tree.root)
            .map(|id| tree.get(id).name.to_string())
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(tree.get(NodeId(2)).depth, 2);
    }

    #[test]
    fn descendants_are_pre_order() {
        let tree = sample();
        let names: Vec<_> = tree
            .descendants(tree.root)
            .into_iter()
            .map(|id| tree.get(id).name.to_string())
            .collect();
        assert_eq!(names, ["root", "a", "a1", "a2", "b"]);
    }

    #[test]
    fn leaves_links_and_paths() {
        let tree = sample();
        assert_eq!(tree.leaves(), vec![NodeId(2), NodeId(3), NodeId(4)]);
        assert_eq!(tree.links().len(), tree.len() - 1);
        assert_eq!(tree.links()[0], (NodeId(0), NodeId(1)));
        assert_eq!(tree.path(NodeId(3), "/"), "root/a/a2");
    }

    #[test]
    fn depth_saturates_on_very_deep_chains() {
        let mut tree = NodeTree::new("root");
        let mut parent = tree.root;
        for _ in 0..=u16::MAX as usize {
            parent = tree.add_child(parent, TreeNode::new("n", 1.0));
        }
        assert_eq!(tree.get(parent).depth, u16::MAX);
    }

    #[test]
    fn cell_containment_is_half_open() {
        let cell = Cell::new(0.0, 0.0, 10.0, 5.0);
        assert!(cell.contains(0.0, 0.0));
        assert!(cell.contains(9.99, 4.99));
        assert!(!cell.contains(10.0, 2.0));
        assert!(!cell.contains(2.0, 5.0));
    }
}
