pub mod padding;
pub mod rounding;
pub mod squarify;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use self::padding::{pad, Padding, PaddingConfig, Sides};
pub use self::rounding::Rounding;
pub use self::squarify::Mode;

use self::squarify::{squarify_children, stickify_children, Pass};
use crate::error::{Result, TreemapError};
use crate::tree::aggregate::{self, SortOrder};
use crate::tree::arena::{Cell, NodeId, NodeTree};

/// A positioned rectangle in the treemap layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LayoutRect {
    pub node: NodeId,
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub depth: u16,
    pub value: f64,
    /// Area assigned before padding and rounding
    pub area: f64,
    pub is_leaf: bool,
}

impl LayoutRect {
    pub fn cell(&self) -> Cell {
        Cell::new(self.x, self.y, self.dx, self.dy)
    }
}

/// The full layout result (rects in pre-order + fast lookup).
#[derive(Debug, Clone, Default)]
pub struct Layout {
    /// Every node, root first
    pub rects: Vec<LayoutRect>,
    /// node → index into `rects`
    pub node_to_rect: HashMap<NodeId, usize>,
}

impl Layout {
    pub fn get(&self, node: NodeId) -> Option<&LayoutRect> {
        self.node_to_rect.get(&node).map(|&i| &self.rects[i])
    }

    pub fn leaves(&self) -> impl Iterator<Item = &LayoutRect> {
        self.rects.iter().filter(|r| r.is_leaf)
    }

    /// Everything except the root; useful when the root is a synthetic wrapper.
    pub fn without_root(&self) -> &[LayoutRect] {
        self.rects.get(1..).unwrap_or(&[])
    }

    /// Deepest non-empty rectangle containing the point.
    pub fn node_at(&self, x: f64, y: f64) -> Option<&LayoutRect> {
        self.rects
            .iter()
            .filter(|r| r.dx > 0.0 && r.dy > 0.0 && r.cell().contains(x, y))
            .max_by_key(|r| r.depth)
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }
}

/// Configuration for treemap layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    /// Inset applied to every parent before its children are placed
    pub padding: Option<PaddingConfig>,
    /// Round final edges to whole units
    pub round: bool,
    /// Reuse row structure from the previous layout of the same tree
    pub sticky: bool,
    pub mode: Mode,
    /// Target aspect ratio used by the squarify score (1.0 = square)
    pub ratio: f64,
    /// Sibling order for fresh (non-sticky) layouts
    pub sort: SortOrder,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 500.0,
            padding: None,
            round: false,
            sticky: false,
            mode: Mode::Squarify,
            ratio: 1.0,
            sort: SortOrder::Descending,
        }
    }
}

/// A configured treemap layout.
#[derive(Debug, Clone)]
pub struct Treemap {
    config: LayoutConfig,
    padding: Padding,
    rounding: Rounding,
}

impl Treemap {
    pub fn new(config: LayoutConfig) -> Result<Self> {
        let (w, h) = (config.width, config.height);
        if !(w.is_finite() && h.is_finite() && w >= 0.0 && h >= 0.0) {
            return Err(TreemapError::InvalidSize {
                width: w,
                height: h,
            });
        }
        if !(config.ratio.is_finite() && config.ratio > 0.0) {
            return Err(TreemapError::InvalidRatio(config.ratio));
        }
        let padding = config.padding.map(Padding::from).unwrap_or_default();
        padding.validate()?;
        let rounding = if config.round {
            Rounding::Nearest
        } else {
            Rounding::None
        };

        Ok(Self {
            config,
            padding,
            rounding,
        })
    }

    /// Replace the padding policy, e.g. with a per-node callback.
    pub fn with_padding(mut self, padding: Padding) -> Result<Self> {
        padding.validate()?;
        self.padding = padding;
        Ok(self)
    }

    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.config.round = !rounding.is_none();
        self.rounding = rounding;
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn set_size(&mut self, width: f64, height: f64) -> Result<()> {
        if !(width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0) {
            return Err(TreemapError::InvalidSize { width, height });
        }
        self.config.width = width;
        self.config.height = height;
        Ok(())
    }

    pub fn is_sticky(&self) -> bool {
        self.config.sticky
    }

    /// Forget the row structure of a previous layout, so the next call
    /// re-sorts and re-squarifies from scratch.
    pub fn reset(&self, tree: &mut NodeTree) {
        tree.clear_rows();
    }

    /// Lay out the whole tree, writing `cell` and `area` into every node.
    pub fn layout(&self, tree: &mut NodeTree) -> Layout {
        let sticky = self.config.sticky && tree.stuck;

        aggregate::aggregate_values(tree);
        if !sticky {
            aggregate::sort_children(tree, self.config.sort);
        }

        let root = tree.root;
        let root_value = tree.get(root).value;
        let (dx, dy) = if root_value > 0.0 {
            (self.config.width, self.config.height)
        } else {
            (0.0, 0.0)
        };
        {
            let node = tree.get_mut(root);
            node.cell = Cell::new(0.0, 0.0, dx, dy);
            node.area = dx * dy;
            node.row_end = None;
        }

        tracing::info!(
            "Laying out {} nodes (root value {}) in {:.0}x{:.0}, mode={:?}, sticky={}",
            tree.len(),
            root_value,
            dx,
            dy,
            self.config.mode,
            sticky
        );

        let pass = Pass {
            mode: self.config.mode,
            ratio: self.config.ratio,
            padding: &self.padding,
        };

        // Each node only needs its own cell to place its children
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if sticky {
                stickify_children(tree, id, &pass);
            } else {
                squarify_children(tree, id, &pass);
            }
            stack.extend(tree.children(id));
        }
        tree.stuck = true;

        if !self.rounding.is_none() {
            for node in &mut tree.nodes {
                node.cell = self.rounding.round_cell(node.cell);
            }
        }

        collect(tree)
    }
}

/// Compute a layout with a one-off configuration.
pub fn compute_layout(tree: &mut NodeTree, config: &LayoutConfig) -> Result<Layout> {
    Ok(Treemap::new(config.clone())?.layout(tree))
}

fn collect(tree: &NodeTree) -> Layout {
    let order = tree.descendants(tree.root);
    let mut rects = Vec::with_capacity(order.len());
    let mut node_to_rect = HashMap::with_capacity(order.len());

    for id in order {
        let node = tree.get(id);
        node_to_rect.insert(id, rects.len());
        rects.push(LayoutRect {
            node: id,
            x: node.cell.x,
            y: node.cell.y,
            dx: node.cell.dx,
            dy: node.cell.dy,
            depth: node.depth,
            value: node.value,
            area: node.area,
            is_leaf: node.is_leaf(),
        });
    }

    Layout {
        rects,
        node_to_rect,
    }
}
