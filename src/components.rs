use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Heading of a moving entity. `None` means standing still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    #[default]
    None,
}

impl Direction {
    /// The four headings an entity can actually travel along.
    pub const CARDINALS: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Grid delta `(dcol, drow)`; rows grow downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::None => (0, 0),
        }
    }

    pub fn vector(self) -> Vec2 {
        let (dx, dy) = self.delta();
        Vec2::new(dx as f32, dy as f32)
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::None => Direction::None,
        }
    }

    pub fn is_none(self) -> bool {
        self == Direction::None
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    /// True when both headings travel along the same axis (or either is `None`).
    pub fn shares_axis(self, other: Direction) -> bool {
        self.is_none() || other.is_none() || self.is_vertical() == other.is_vertical()
    }
}

/// A grid coordinate. Signed so that stepping off the border yields a cell
/// the grid can reject instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}

impl Cell {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn step(self, dir: Direction) -> Cell {
        let (dx, dy) = dir.delta();
        Cell {
            col: self.col + dx,
            row: self.row + dy,
        }
    }

    /// Euclidean distance in cells.
    pub fn distance(self, other: Cell) -> f32 {
        let dx = (self.col - other.col) as f32;
        let dy = (self.row - other.row) as f32;
        dx.hypot(dy)
    }
}
