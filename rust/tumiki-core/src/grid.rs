//! Grid geometry for the stage world.
//!
//! Stages are small rectangular grids addressed with 1-based coordinates:
//! `(1, 1)` is the top-left cell and `y` grows downward, so moving "up"
//! decreases `y`. Movement never fails at an edge; out-of-bounds positions
//! are clamped back inside instead.

use serde::{Deserialize, Serialize};

/// Default stage width in cells.
pub const DEFAULT_GRID_WIDTH: i32 = 8;
/// Default stage height in cells.
pub const DEFAULT_GRID_HEIGHT: i32 = 5;

/// A cell position on the stage grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Create a position from raw coordinates.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by a delta without any bounds handling.
    #[inline]
    pub fn offset(&self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }

    /// Sum of per-axis absolute differences.
    #[inline]
    pub fn manhattan_distance(&self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Rectangular stage bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub width: i32,
    pub height: i32,
}

impl Grid {
    /// Create a grid with the given dimensions.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Clamp a position into `[1, width] x [1, height]`, each axis
    /// independently.
    pub fn clamp(&self, pos: Position) -> Position {
        Position {
            x: pos.x.max(1).min(self.width),
            y: pos.y.max(1).min(self.height),
        }
    }

    /// Whether the position lies inside the grid.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 1 && pos.x <= self.width && pos.y >= 1 && pos.y <= self.height
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_WIDTH, DEFAULT_GRID_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_inside_positions_unchanged() {
        let grid = Grid::default();
        let pos = Position::new(3, 4);
        assert_eq!(grid.clamp(pos), pos);
    }

    #[test]
    fn clamp_pulls_each_axis_back_independently() {
        let grid = Grid::new(8, 5);
        assert_eq!(grid.clamp(Position::new(0, 3)), Position::new(1, 3));
        assert_eq!(grid.clamp(Position::new(9, 3)), Position::new(8, 3));
        assert_eq!(grid.clamp(Position::new(4, 0)), Position::new(4, 1));
        assert_eq!(grid.clamp(Position::new(4, 9)), Position::new(4, 5));
        assert_eq!(grid.clamp(Position::new(-2, 11)), Position::new(1, 5));
    }

    #[test]
    fn contains_matches_clamp_fixpoint() {
        let grid = Grid::new(8, 5);
        assert!(grid.contains(Position::new(1, 1)));
        assert!(grid.contains(Position::new(8, 5)));
        assert!(!grid.contains(Position::new(0, 1)));
        assert!(!grid.contains(Position::new(8, 6)));
    }

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = Position::new(1, 1);
        let b = Position::new(4, 3);
        assert_eq!(a.manhattan_distance(b), 5);
        assert_eq!(b.manhattan_distance(a), 5);
        assert_eq!(a.manhattan_distance(a), 0);
    }
}
