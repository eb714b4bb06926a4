//! Tick-gated tile stepping.

use crate::components::{Cell, Direction};
use crate::error::ConfigError;
use crate::level::Grid;

/// How often an entity gets to take a one-cell step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// One step every `n` ticks, `n >= 1`.
    Every(u32),
    Never,
}

impl Cadence {
    /// Converts a speed in tiles per second into a step interval at the given
    /// tick rate. Halves round to even, so 10 ticks/s at 4 tiles/s steps every
    /// second tick.
    pub fn from_speed(
        actor: &'static str,
        tick_rate: u32,
        tiles_per_second: f32,
    ) -> Result<Cadence, ConfigError> {
        if !tiles_per_second.is_finite() || tiles_per_second < 0.0 {
            return Err(ConfigError::NegativeSpeed {
                actor,
                speed: tiles_per_second,
            });
        }
        if tiles_per_second == 0.0 {
            return Ok(Cadence::Never);
        }
        let interval = (tick_rate as f32 / tiles_per_second).round_ties_even();
        Ok(Cadence::Every((interval as u32).max(1)))
    }
}

/// Position and heading of an entity that lives on whole cells.
#[derive(Debug, Clone)]
pub struct GridMover {
    pub cell: Cell,
    pub direction: Direction,
    cadence: Cadence,
    counter: u32,
}

impl GridMover {
    pub fn new(cell: Cell, cadence: Cadence) -> Self {
        Self {
            cell,
            direction: Direction::None,
            cadence,
            counter: 0,
        }
    }

    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// Counts one tick. Returns true on the tick a step is due.
    pub fn tick_cadence(&mut self) -> bool {
        match self.cadence {
            Cadence::Never => false,
            Cadence::Every(interval) => {
                self.counter += 1;
                if self.counter >= interval {
                    self.counter = 0;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn can_step(&self, grid: &Grid, dir: Direction) -> bool {
        !dir.is_none() && grid.is_open(self.cell.step(dir))
    }

    /// Moves one cell along `direction` if the target is open.
    pub fn step(&mut self, grid: &Grid) -> bool {
        if self.can_step(grid, self.direction) {
            self.cell = self.cell.step(self.direction);
            true
        } else {
            false
        }
    }

    /// Hard reset used on spawn and after a lost life.
    pub fn place(&mut self, cell: Cell) {
        self.cell = cell;
        self.direction = Direction::None;
        self.counter = 0;
    }
}
