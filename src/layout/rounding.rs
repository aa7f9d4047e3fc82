use crate::tree::arena::Cell;

/// Rounding applied once to final coordinates, never at intermediate splits.
#[derive(Debug, Clone, Copy, Default)]
pub enum Rounding {
    #[default]
    None,
    /// Round to the nearest integer (half away from zero).
    Nearest,
    Floor,
    Custom(fn(f64) -> f64),
}

impl Rounding {
    pub fn is_none(&self) -> bool {
        matches!(self, Rounding::None)
    }

    pub fn apply(&self, v: f64) -> f64 {
        match self {
            Rounding::None => v,
            Rounding::Nearest => v.round(),
            Rounding::Floor => v.floor(),
            Rounding::Custom(f) => f(v),
        }
    }

    /// Round edges rather than extents, so rectangles sharing an edge keep sharing it.
    pub fn round_cell(&self, cell: Cell) -> Cell {
        if self.is_none() {
            return cell;
        }
        let x = self.apply(cell.x);
        let y = self.apply(cell.y);
        let right = self.apply(cell.right());
        let bottom = self.apply(cell.bottom());
        Cell {
            x,
            y,
            dx: (right - x).max(0.0),
            dy: (bottom - y).max(0.0),
        }
    }
}
