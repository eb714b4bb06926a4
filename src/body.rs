//! Sub-tile movement against wall rectangles.

use glam::Vec2;

use crate::components::{Cell, Direction};
use crate::level::Grid;

/// Axis-aligned box in pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_center(center: Vec2, size: f32) -> Rect {
        let half = Vec2::splat(size / 2.0);
        Rect {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Strict overlap: boxes that only share an edge do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    pub fn within(&self, bounds: &Rect) -> bool {
        self.min.x >= bounds.min.x
            && self.min.y >= bounds.min.y
            && self.max.x <= bounds.max.x
            && self.max.y <= bounds.max.y
    }
}

pub fn cell_center(cell: Cell, tile: f32) -> Vec2 {
    Vec2::new(
        (cell.col as f32 + 0.5) * tile,
        (cell.row as f32 + 0.5) * tile,
    )
}

pub fn cell_at(point: Vec2, tile: f32) -> Cell {
    Cell::new(
        (point.x / tile).floor() as i32,
        (point.y / tile).floor() as i32,
    )
}

/// Wall rectangles of one grid, plus the arena bounds.
#[derive(Debug, Clone)]
pub struct WallMap {
    tile: f32,
    bounds: Rect,
    walls: Vec<Rect>,
}

impl WallMap {
    pub fn new(grid: &Grid, tile: f32) -> WallMap {
        let walls = grid
            .walls()
            .map(|cell| Rect::from_center(cell_center(cell, tile), tile))
            .collect();
        let bounds = Rect {
            min: Vec2::ZERO,
            max: Vec2::new(grid.cols() as f32 * tile, grid.rows() as f32 * tile),
        };
        WallMap {
            tile,
            bounds,
            walls,
        }
    }

    pub fn tile(&self) -> f32 {
        self.tile
    }

    pub fn blocks(&self, rect: &Rect) -> bool {
        !rect.within(&self.bounds) || self.walls.iter().any(|wall| wall.overlaps(rect))
    }
}

/// A square body moving in pixel space.
#[derive(Debug, Clone)]
pub struct Body {
    pub center: Vec2,
    pub size: f32,
    pub speed: f32,
    pub direction: Direction,
}

impl Body {
    pub fn new(center: Vec2, size: f32, speed: f32) -> Body {
        Body {
            center,
            size,
            speed,
            direction: Direction::None,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center, self.size)
    }

    /// The bounding box after one step along `dir`.
    pub fn lookahead(&self, dir: Direction) -> Rect {
        Rect::from_center(self.center + dir.vector() * self.speed, self.size)
    }

    pub fn can_move(&self, dir: Direction, walls: &WallMap) -> bool {
        dir.is_none() || !walls.blocks(&self.lookahead(dir))
    }

    pub fn cell(&self, tile: f32) -> Cell {
        cell_at(self.center, tile)
    }

    /// Close enough to the current cell's center that the next step would
    /// overshoot it.
    pub fn is_aligned(&self, tile: f32) -> bool {
        let target = cell_center(self.cell(tile), tile);
        self.center.distance(target) < self.speed
    }

    /// Centers the axis perpendicular to `dir` on the current cell.
    pub fn snap_across(&mut self, dir: Direction, tile: f32) {
        let target = cell_center(self.cell(tile), tile);
        match dir {
            Direction::Up | Direction::Down => self.center.x = target.x,
            Direction::Left | Direction::Right => self.center.y = target.y,
            Direction::None => {}
        }
    }

    pub fn snap_to_cell(&mut self, tile: f32) {
        self.center = cell_center(self.cell(tile), tile);
    }

    pub fn advance(&mut self) {
        self.center += self.direction.vector() * self.speed;
    }

    pub fn place(&mut self, center: Vec2) {
        self.center = center;
        self.direction = Direction::None;
    }
}
