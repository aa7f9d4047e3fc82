use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TreemapError};
use crate::tree::arena::{Cell, TreeNode};

/// Insets in CSS order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sides {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Sides {
    pub const fn uniform(p: f64) -> Self {
        Self {
            top: p,
            right: p,
            bottom: p,
            left: p,
        }
    }

    pub const fn from_array([top, right, bottom, left]: [f64; 4]) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.top, self.right, self.bottom, self.left]
    }

    fn validate(self) -> Result<()> {
        let sides = self.to_array();
        if sides.iter().all(|p| p.is_finite() && *p >= 0.0) {
            Ok(())
        } else {
            Err(TreemapError::InvalidPadding(sides))
        }
    }
}

/// Per-node inset callback. `None` means no padding for that node.
pub type PadFn = Arc<dyn Fn(&TreeNode) -> Option<Sides> + Send + Sync>;

/// Inset applied to a parent's rectangle before its children are placed.
#[derive(Clone, Default)]
pub enum Padding {
    #[default]
    None,
    Uniform(f64),
    Sides(Sides),
    PerNode(PadFn),
}

impl fmt::Debug for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Padding::None => f.write_str("None"),
            Padding::Uniform(p) => f.debug_tuple("Uniform").field(p).finish(),
            Padding::Sides(s) => f.debug_tuple("Sides").field(s).finish(),
            Padding::PerNode(_) => f.write_str("PerNode(..)"),
        }
    }
}

impl Padding {
    pub fn per_node<F>(f: F) -> Self
    where
        F: Fn(&TreeNode) -> Option<Sides> + Send + Sync + 'static,
    {
        Padding::PerNode(Arc::new(f))
    }

    /// Static insets are checked up front; callbacks are trusted.
    pub fn validate(&self) -> Result<()> {
        match self {
            Padding::None | Padding::PerNode(_) => Ok(()),
            Padding::Uniform(p) => Sides::uniform(*p).validate(),
            Padding::Sides(s) => s.validate(),
        }
    }

    pub fn sides_for(&self, node: &TreeNode) -> Option<Sides> {
        match self {
            Padding::None => None,
            Padding::Uniform(p) => Some(Sides::uniform(*p)),
            Padding::Sides(s) => Some(*s),
            Padding::PerNode(f) => f(node),
        }
    }

    /// The rectangle available to `node`'s children.
    pub fn inner(&self, node: &TreeNode) -> Cell {
        match self.sides_for(node) {
            Some(sides) => pad(node.cell, sides),
            None => node.cell,
        }
    }
}

/// Shrink `cell` by `sides`. An extent that would go negative collapses to 0
/// at the centre of where the inverted span would have been.
pub fn pad(cell: Cell, sides: Sides) -> Cell {
    let mut x = cell.x + sides.left;
    let mut y = cell.y + sides.top;
    let mut dx = cell.dx - sides.right - sides.left;
    let mut dy = cell.dy - sides.top - sides.bottom;
    if dx < 0.0 {
        x += dx / 2.0;
        dx = 0.0;
    }
    if dy < 0.0 {
        y += dy / 2.0;
        dy = 0.0;
    }
    Cell { x, y, dx, dy }
}

/// Serializable padding: a single number or `[top, right, bottom, left]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaddingConfig {
    Uniform(f64),
    Sides([f64; 4]),
}

impl From<PaddingConfig> for Padding {
    fn from(config: PaddingConfig) -> Self {
        match config {
            PaddingConfig::Uniform(p) => Padding::Uniform(p),
            PaddingConfig::Sides(s) => Padding::Sides(Sides::from_array(s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asymmetric_padding_shrinks_each_side() {
        let cell = Cell::new(10.0, 20.0, 100.0, 50.0);
        let inner = pad(cell, Sides::from_array([1.0, 2.0, 3.0, 4.0]));
        assert_eq!(inner, Cell::new(14.0, 21.0, 94.0, 46.0));
    }

    #[test]
    fn inverted_padding_collapses_to_centre() {
        let cell = Cell::new(0.0, 0.0, 10.0, 4.0);
        let inner = pad(cell, Sides::uniform(6.0));
        assert_eq!(inner.dx, 0.0);
        assert_eq!(inner.dy, 0.0);
        // x = 6 + (10 - 12) / 2, y = 6 + (4 - 12) / 2
        assert_eq!(inner.x, 5.0);
        assert_eq!(inner.y, 2.0);
    }

    #[test]
    fn per_node_padding_can_opt_out() {
        let padding = Padding::per_node(|node| (node.depth > 0).then(|| Sides::uniform(2.0)));
        let mut node = TreeNode::new("n", 1.0);
        node.cell = Cell::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(padding.inner(&node), node.cell);
        node.depth = 1;
        assert_eq!(padding.inner(&node), Cell::new(2.0, 2.0, 6.0, 6.0));
    }

    #[test]
    fn negative_padding_is_rejected() {
        assert!(Padding::Uniform(-1.0).validate().is_err());
        assert!(Padding::Sides(Sides::from_array([0.0, f64::NAN, 0.0, 0.0]))
            .validate()
            .is_err());
        assert!(Padding::Uniform(3.0).validate().is_ok());
    }

    #[test]
    fn padding_config_accepts_number_or_array() {
        let uniform: PaddingConfig = serde_json::from_str("4").unwrap();
        assert_eq!(uniform, PaddingConfig::Uniform(4.0));
        let sides: PaddingConfig = serde_json::from_str("[1, 2, 3, 4]").unwrap();
        assert_eq!(sides, PaddingConfig::Sides([1.0, 2.0, 3.0, 4.0]));
    }
}
