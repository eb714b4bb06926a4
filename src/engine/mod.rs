//! The two movement engines behind one interface.
//!
//! [`TileArena`] steps whole cells on a tick cadence; [`PixelArena`] moves
//! bounding boxes a few pixels per tick. Both run the same tick order: player,
//! ghosts, food, catch.

mod pixel;
mod tile;

pub use pixel::PixelArena;
pub use tile::TileArena;

use glam::Vec2;
use rand::Rng;

use crate::collision::TickReport;
use crate::components::{Cell, Direction};
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::ghost::GhostMode;
use crate::level::{Grid, LevelLayout};

/// One playable level in a specific movement model.
pub trait Arena {
    /// Builds actors, food and tuning for `level` (1-based).
    fn load(layout: &LevelLayout, config: &GameConfig, level: u32) -> Result<Self, ConfigError>
    where
        Self: Sized;

    fn request_direction(&mut self, dir: Direction);

    /// Runs one tick of movement and pickup/catch detection. Scoring is left
    /// to the caller.
    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickReport;

    /// Puts every actor back on its spawn after a lost life. Food stays eaten.
    fn reset_actors(&mut self);

    fn food_remaining(&self) -> usize;

    fn initial_food(&self) -> usize;

    fn grid(&self) -> &Grid;

    fn snapshot(&self) -> ArenaSnapshot;
}

/// Where an actor is, for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActorView {
    pub cell: Cell,
    /// Center in cell units, `(col + 0.5, row + 0.5)` when centered.
    pub position: Vec2,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GhostView {
    pub actor: ActorView,
    pub mode: GhostMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArenaSnapshot {
    pub player: ActorView,
    pub ghosts: Vec<GhostView>,
    pub food: Vec<Cell>,
}

impl ActorView {
    fn centered(cell: Cell, direction: Direction) -> ActorView {
        ActorView {
            cell,
            position: Vec2::new(cell.col as f32 + 0.5, cell.row as f32 + 0.5),
            direction,
        }
    }
}
