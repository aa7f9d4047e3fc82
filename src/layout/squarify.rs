use serde::{Deserialize, Serialize};

use super::padding::Padding;
use crate::tree::arena::{Axis, Cell, NodeId, NodeTree};

/// Row strategy for subdividing a parent rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Greedy rows that keep the worst aspect ratio as low as possible.
    #[default]
    Squarify,
    /// One row along the width.
    Slice,
    /// One row along the height.
    Dice,
    /// Slice at even depths, dice at odd depths.
    SliceDice,
}

impl std::str::FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "squarify" => Ok(Mode::Squarify),
            "slice" => Ok(Mode::Slice),
            "dice" => Ok(Mode::Dice),
            "slice-dice" | "slicedice" => Ok(Mode::SliceDice),
            other => Err(format!(
                "unknown layout mode '{other}' (expected squarify, slice, dice or slice-dice)"
            )),
        }
    }
}

/// Per-pass settings shared by every node.
pub(crate) struct Pass<'a> {
    pub mode: Mode,
    pub ratio: f64,
    pub padding: &'a Padding,
}

/// Children waiting to be placed together, with their scaled area sum.
#[derive(Debug, Default)]
struct Row {
    items: Vec<(NodeId, f64)>,
    area: f64,
}

impl Row {
    fn push(&mut self, id: NodeId, area: f64) {
        self.items.push((id, area));
        self.area += area;
    }

    fn pop(&mut self) {
        if let Some((_, area)) = self.items.pop() {
            self.area -= area;
        }
    }

    fn clear(&mut self) {
        self.items.clear();
        self.area = 0.0;
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Assign every child `value * k` as its area; NaN and non-positive results become 0.
fn scale_children(tree: &mut NodeTree, children: &[NodeId], k: f64) {
    let k = if k < 0.0 { 0.0 } else { k };
    for &id in children {
        let node = tree.get_mut(id);
        let area = node.value * k;
        node.area = if area.is_nan() || area <= 0.0 { 0.0 } else { area };
    }
}

/// Rectangle for `id`'s children after padding, with children areas scaled to it.
fn prepare(tree: &mut NodeTree, id: NodeId, children: &[NodeId], pass: &Pass<'_>) -> Cell {
    let node = tree.get(id);
    let rect = pass.padding.inner(node);
    let k = rect.area() / node.value;
    scale_children(tree, children, k);
    rect
}

/// Lay out `id`'s children with the squarify heuristic (or the configured
/// slice/dice mode). Children are consumed in sibling order, which the
/// caller has sorted by descending value.
pub(crate) fn squarify_children(tree: &mut NodeTree, id: NodeId, pass: &Pass<'_>) {
    let children: Vec<NodeId> = tree.children(id).collect();
    if children.is_empty() {
        return;
    }
    for &child in &children {
        tree.get_mut(child).row_end = None;
    }

    let mut rect = prepare(tree, id, &children, pass);
    let mut u = match pass.mode {
        Mode::Squarify => rect.dx.min(rect.dy),
        Mode::Slice => rect.dx,
        Mode::Dice => rect.dy,
        Mode::SliceDice if tree.get(id).depth % 2 == 1 => rect.dy,
        Mode::SliceDice => rect.dx,
    };

    let mut row = Row::default();
    let mut best = f64::INFINITY;
    let mut next = 0;
    while next < children.len() {
        let child = children[next];
        row.push(child, tree.get(child).area);

        if pass.mode != Mode::Squarify {
            next += 1;
            continue;
        }

        let score = worst_aspect_ratio(&row, u, pass.ratio);
        if row.len() == 1 || score <= best {
            best = score;
            next += 1;
        } else {
            row.pop();
            position(tree, &row, axis_for(u, &rect), &mut rect, false);
            u = rect.dx.min(rect.dy);
            row.clear();
            best = f64::INFINITY;
        }
    }

    if !row.is_empty() {
        position(tree, &row, axis_for(u, &rect), &mut rect, true);
    }
}

/// Re-lay out `id`'s children reusing the rows recorded by a previous pass.
/// Sibling order is left alone, so each node keeps its neighbourhood.
pub(crate) fn stickify_children(tree: &mut NodeTree, id: NodeId, pass: &Pass<'_>) {
    let children: Vec<NodeId> = tree.children(id).collect();
    if children.is_empty() {
        return;
    }

    let mut rect = prepare(tree, id, &children, pass);
    let mut row = Row::default();
    for (i, &child) in children.iter().enumerate() {
        row.push(child, tree.get(child).area);
        if let Some(axis) = tree.get(child).row_end {
            position(tree, &row, axis, &mut rect, i + 1 == children.len());
            row.clear();
        }
    }

    // Nodes appended since the last pass have no row yet
    if !row.is_empty() {
        tracing::debug!(
            "Sticky layout: {} trailing children of {:?} without a recorded row",
            row.len(),
            id
        );
        let u = rect.dx.min(rect.dy);
        position(tree, &row, axis_for(u, &rect), &mut rect, true);
    }
}

fn axis_for(u: f64, rect: &Cell) -> Axis {
    if u == rect.dx {
        Axis::Horizontal
    } else {
        Axis::Vertical
    }
}

/// Place a closed row along the top (horizontal) or left (vertical) edge of
/// `rect`, then shrink `rect` by the row's thickness. The last item absorbs
/// any leftover length. `flush` makes the row consume the whole remainder.
fn position(tree: &mut NodeTree, row: &Row, axis: Axis, rect: &mut Cell, flush: bool) {
    let Some(&(last, _)) = row.items.last() else {
        return;
    };

    let u = match axis {
        Axis::Horizontal => rect.dx,
        Axis::Vertical => rect.dy,
    };
    let mut v = if u != 0.0 { row.area / u } else { 0.0 };

    match axis {
        Axis::Horizontal => {
            if flush || v > rect.dy {
                v = rect.dy;
            }
            let end = rect.x + rect.dx;
            let mut x = rect.x;
            for &(id, area) in &row.items {
                let length = if v != 0.0 { area / v } else { 0.0 };
                let dx = (end - x).min(length);
                if !dx.is_finite() {
                    tracing::warn!("Squarify: invalid length {} for {:?}, collapsing", dx, id);
                }
                let node = tree.get_mut(id);
                node.cell = Cell::new(x, rect.y, dx.max(0.0), v);
                node.row_end = None;
                x += node.cell.dx;
            }
            let node = tree.get_mut(last);
            node.cell.dx += end - x;
            node.row_end = Some(Axis::Horizontal);
            rect.y += v;
            rect.dy -= v;
        }
        Axis::Vertical => {
            if flush || v > rect.dx {
                v = rect.dx;
            }
            let end = rect.y + rect.dy;
            let mut y = rect.y;
            for &(id, area) in &row.items {
                let length = if v != 0.0 { area / v } else { 0.0 };
                let dy = (end - y).min(length);
                if !dy.is_finite() {
                    tracing::warn!("Squarify: invalid length {} for {:?}, collapsing", dy, id);
                }
                let node = tree.get_mut(id);
                node.cell = Cell::new(rect.x, y, v, dy.max(0.0));
                node.row_end = None;
                y += node.cell.dy;
            }
            let node = tree.get_mut(last);
            node.cell.dy += end - y;
            node.row_end = Some(Axis::Vertical);
            rect.x += v;
            rect.dx -= v;
        }
    }
}

/// Worst aspect ratio of `row` laid along a strip of width `side`:
/// `max(side² · max · ratio / sum², sum² / (side² · min · ratio))`.
/// Zero areas are ignored; an all-zero row scores infinity.
fn worst_aspect_ratio(row: &Row, side: f64, ratio: f64) -> f64 {
    let mut max_r: f64 = 0.0;
    let mut min_r = f64::INFINITY;
    for &(_, r) in &row.items {
        if r == 0.0 {
            continue;
        }
        max_r = max_r.max(r);
        min_r = min_r.min(r);
    }
    let sum_sq = row.area * row.area;
    if sum_sq == 0.0 {
        return f64::INFINITY;
    }
    let side_sq = side * side;
    let a = side_sq * max_r * ratio / sum_sq;
    let b = sum_sq / (side_sq * min_r * ratio);
    a.max(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::arena::TreeNode;

    fn flat(values: &[f64], w: f64, h: f64) -> NodeTree {
        let mut tree = NodeTree::new("root");
        for (i, &v) in values.iter().enumerate() {
            tree.add_child(tree.root, TreeNode::new(&format!("n{i}"), v));
        }
        let root = tree.root;
        tree.get_mut(root).value = values.iter().sum();
        tree.get_mut(root).cell = Cell::new(0.0, 0.0, w, h);
        tree
    }

    fn pass(mode: Mode) -> Pass<'static> {
        static NONE: Padding = Padding::None;
        Pass {
            mode,
            ratio: 1.0,
            padding: &NONE,
        }
    }

    fn cells(tree: &NodeTree) -> Vec<Cell> {
        tree.children(tree.root).map(|id| tree.get(id).cell).collect()
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn single_item_fills_viewport_without_axis_swap() {
        let mut tree = flat(&[5.0], 1920.0, 1080.0);
        let root = tree.root;
        squarify_children(&mut tree, root, &pass(Mode::Squarify));
        assert_eq!(cells(&tree), vec![Cell::new(0.0, 0.0, 1920.0, 1080.0)]);
    }

    #[test]
    fn classic_six_by_four_example() {
        // Bruls et al.: areas 6,6,4,3,2,2,1 in a 6x4 rectangle.
        let mut tree = flat(&[6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0], 6.0, 4.0);
        let root = tree.root;
        squarify_children(&mut tree, root, &pass(Mode::Squarify));
        let c = cells(&tree);

        // First row: the two 6s stacked along the left edge, 3 wide.
        assert_close(c[0].dx, 3.0);
        assert_close(c[0].dy, 2.0);
        assert_close(c[1].y, 2.0);
        assert_eq!(tree.get(NodeId(2)).row_end, Some(Axis::Vertical));

        // Second row: 4 and 3 along the top of the remaining 3x4.
        assert_close(c[2].x, 3.0);
        assert_close(c[2].dy, 7.0 / 3.0);
        assert_close(c[3].x + c[3].dx, 6.0);

        let total: f64 = c.iter().map(Cell::area).sum();
        assert_close(total, 24.0);
    }

    #[test]
    fn layout_preserves_area_for_simple_case() {
        let values = [400.0, 300.0, 200.0, 100.0];
        let mut tree = flat(&values, 50.0, 20.0);
        let root = tree.root;
        squarify_children(&mut tree, root, &pass(Mode::Squarify));
        for (cell, v) in cells(&tree).iter().zip(values) {
            assert!((cell.area() - v).abs() < 1e-6);
        }
    }

    #[test]
    fn slice_and_dice_use_a_single_row() {
        let mut tree = flat(&[1.0, 1.0, 2.0], 40.0, 10.0);
        let root = tree.root;
        squarify_children(&mut tree, root, &pass(Mode::Slice));
        let c = cells(&tree);
        assert!(c.iter().all(|cell| cell.y == 0.0 && cell.dy == 10.0));
        assert_close(c[2].dx, 20.0);

        squarify_children(&mut tree, root, &pass(Mode::Dice));
        let c = cells(&tree);
        assert!(c.iter().all(|cell| cell.x == 0.0 && cell.dx == 40.0));
        assert_close(c[0].dy, 2.5);
    }

    #[test]
    fn zero_values_get_empty_cells() {
        let mut tree = flat(&[0.0, 3.0, 0.0], 10.0, 10.0);
        let root = tree.root;
        squarify_children(&mut tree, root, &pass(Mode::Squarify));
        let total: f64 = cells(&tree).iter().map(Cell::area).sum();
        assert_close(total, 100.0);
        assert_close(tree.get(NodeId(1)).cell.area(), 0.0);
    }

    #[test]
    fn sticky_pass_replays_rows() {
        let mut tree = flat(&[6.0, 6.0, 4.0, 3.0, 2.0, 2.0, 1.0], 6.0, 4.0);
        let root = tree.root;
        squarify_children(&mut tree, root, &pass(Mode::Squarify));
        let rows: Vec<_> = tree.children(root).map(|id| tree.get(id).row_end).collect();

        // Shrink the largest; a fresh pass would reorder, sticky must not.
        tree.get_mut(NodeId(1)).value = 1.0;
        tree.get_mut(root).value = 19.0;
        stickify_children(&mut tree, root, &pass(Mode::Squarify));

        let after: Vec<_> = tree.children(root).map(|id| tree.get(id).row_end).collect();
        assert_eq!(rows, after);
        let c = cells(&tree);
        assert_close(c[0].x, 0.0);
        assert_close(c[0].y, 0.0);
        assert_close(c.iter().map(Cell::area).sum::<f64>(), 24.0);
        assert_close(c[0].area(), 24.0 / 19.0);
    }

    #[test]
    fn worst_ratio_matches_closed_form() {
        let mut row = Row::default();
        row.push(NodeId(1), 6.0);
        assert_close(worst_aspect_ratio(&row, 4.0, 1.0), 16.0 * 6.0 / 36.0);
        row.push(NodeId(2), 6.0);
        assert_close(worst_aspect_ratio(&row, 4.0, 1.0), 144.0 / 96.0);
        row.clear();
        row.push(NodeId(3), 0.0);
        assert_eq!(worst_aspect_ratio(&row, 4.0, 1.0), f64::INFINITY);
    }
}
