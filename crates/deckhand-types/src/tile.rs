//! Integer tile coordinates.
//!
//! A [`TilePos`] names one cell of a container's tile grid. Ordering is
//! lexicographic on `(x, y)`, which is the enumeration order grids use and
//! therefore the tie-break order for path search.

use serde::{Deserialize, Serialize};

/// Offsets of the four orthogonal neighbours, in enumeration order.
const ORTHOGONAL: [(i32, i32); 4] = [(-1, 0), (0, -1), (0, 1), (1, 0)];

/// Offsets of the four diagonal neighbours, in enumeration order.
const DIAGONAL: [(i32, i32); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// A cell coordinate on a tile grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TilePos {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl TilePos {
    /// Create a tile position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset this position, saturating at the `i32` bounds.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    /// The four orthogonal neighbours (left, down, up, right).
    pub fn neighbors4(self) -> [Self; 4] {
        ORTHOGONAL.map(|(dx, dy)| self.offset(dx, dy))
    }

    /// The four diagonal neighbours.
    pub fn diagonals(self) -> [Self; 4] {
        DIAGONAL.map(|(dx, dy)| self.offset(dx, dy))
    }

    /// All eight surrounding cells, orthogonal first.
    pub fn neighbors8(self) -> [Self; 8] {
        let [a, b, c, d] = self.neighbors4();
        let [e, f, g, h] = self.diagonals();
        [a, b, c, d, e, f, g, h]
    }

    /// Whether `other` shares an edge with this cell.
    pub const fn is_adjacent4(self, other: Self) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        matches!((dx, dy), (1, 0) | (0, 1))
    }

    /// Euclidean distance between cell centres.
    #[allow(clippy::cast_precision_loss)]
    pub fn distance(self, other: Self) -> f32 {
        let dx = self.x.abs_diff(other.x) as f32;
        let dy = self.y.abs_diff(other.y) as f32;
        dx.hypot(dy)
    }

    /// Linear interpolation between two cell centres, `t` in `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn lerp(self, other: Self, t: f32) -> (f32, f32) {
        let (ax, ay) = (self.x as f32, self.y as f32);
        let (bx, by) = (other.x as f32, other.y as f32);
        (ax + (bx - ax) * t, ay + (by - ay) * t)
    }
}

impl core::fmt::Display for TilePos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for TilePos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}
