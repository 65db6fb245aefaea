//! Grid coordinates, directions, and bounds.

use serde::{Deserialize, Serialize};

/// A cell on the factory floor. 0-indexed, x grows right and y grows down.
///
/// Signed so that a candidate position one step off the left or top edge is
/// representable before the boundary check discards it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell in `dir`. May lie outside any grid; `None` when
    /// the coordinate itself would overflow.
    pub fn step(self, dir: Direction) -> Option<Self> {
        let (dx, dy) = dir.offset();
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }

    /// Row-major ordering key (y first, then x).
    pub fn row_major(self) -> (i32, i32) {
        (self.y, self.x)
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the four cardinal movement directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// `(dx, dy)` for one step in this direction.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Up => (0, -1),
        }
    }
}

/// Width and height of a level's grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when `0 <= x < width` and `0 <= y < height`.
    pub fn contains(self, pos: GridPos) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as i64) < self.width as i64
            && (pos.y as i64) < self.height as i64
    }

    /// Number of cells.
    pub fn area(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_follows_screen_axes() {
        let p = GridPos::new(2, 2);
        assert_eq!(p.step(Direction::Right), Some(GridPos::new(3, 2)));
        assert_eq!(p.step(Direction::Left), Some(GridPos::new(1, 2)));
        assert_eq!(p.step(Direction::Down), Some(GridPos::new(2, 3)));
        assert_eq!(p.step(Direction::Up), Some(GridPos::new(2, 1)));
        assert_eq!(GridPos::new(0, 0).step(Direction::Left), Some(GridPos::new(-1, 0)));
    }

    #[test]
    fn step_past_coordinate_range_is_none() {
        assert_eq!(GridPos::new(i32::MAX, 0).step(Direction::Right), None);
        assert_eq!(GridPos::new(0, i32::MAX).step(Direction::Down), None);
        assert_eq!(GridPos::new(i32::MIN, 0).step(Direction::Left), None);
        assert_eq!(
            GridPos::new(i32::MAX, 0).step(Direction::Left),
            Some(GridPos::new(i32::MAX - 1, 0))
        );
    }

    #[test]
    fn contains_is_half_open() {
        let size = GridSize::new(3, 2);
        assert!(size.contains(GridPos::new(0, 0)));
        assert!(size.contains(GridPos::new(2, 1)));
        assert!(!size.contains(GridPos::new(3, 0)));
        assert!(!size.contains(GridPos::new(0, 2)));
        assert!(!size.contains(GridPos::new(-1, 0)));
        assert!(!size.contains(GridPos::new(0, -1)));
    }

    #[test]
    fn row_major_sorts_by_row_then_column() {
        let mut cells = vec![
            GridPos::new(1, 1),
            GridPos::new(0, 1),
            GridPos::new(5, 0),
        ];
        cells.sort_by_key(|p| p.row_major());
        assert_eq!(
            cells,
            vec![GridPos::new(5, 0), GridPos::new(0, 1), GridPos::new(1, 1)]
        );
    }

    #[test]
    fn area() {
        assert_eq!(GridSize::new(12, 12).area(), 144);
    }
}
