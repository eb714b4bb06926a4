//! Greedy one-step pursuit for ghosts.
//!
//! A ghost alternates between scattering to a home corner and chasing the
//! player's cell. At every decision point it takes the legal step that lands
//! closest (Euclidean) to its target, never reversing unless that is the only
//! way out.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::{Cell, Direction};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GhostMode {
    Scatter,
    Chase,
}

/// Scatter/chase durations in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSchedule {
    pub scatter_ticks: u32,
    pub chase_ticks: u32,
}

#[derive(Debug, Clone)]
pub struct ModeTimer {
    schedule: ModeSchedule,
    mode: GhostMode,
    elapsed: u32,
}

impl ModeTimer {
    pub fn new(schedule: ModeSchedule) -> Self {
        Self {
            schedule,
            mode: GhostMode::Scatter,
            elapsed: 0,
        }
    }

    pub fn mode(&self) -> GhostMode {
        self.mode
    }

    /// Counts one tick; returns the new mode when it flips.
    pub fn tick(&mut self) -> Option<GhostMode> {
        self.elapsed += 1;
        let limit = match self.mode {
            GhostMode::Scatter => self.schedule.scatter_ticks,
            GhostMode::Chase => self.schedule.chase_ticks,
        };
        if self.elapsed < limit {
            return None;
        }
        self.mode = match self.mode {
            GhostMode::Scatter => GhostMode::Chase,
            GhostMode::Chase => GhostMode::Scatter,
        };
        self.elapsed = 0;
        Some(self.mode)
    }

    pub fn reset(&mut self) {
        self.mode = GhostMode::Scatter;
        self.elapsed = 0;
    }
}

/// Inner corner used as the scatter target of ghost `index`.
pub fn scatter_corner(index: usize, cols: usize, rows: usize) -> Cell {
    let right = cols.saturating_sub(2) as i32;
    let bottom = rows.saturating_sub(2) as i32;
    match index % 4 {
        0 => Cell::new(1, 1),
        1 => Cell::new(right, 1),
        2 => Cell::new(right, bottom),
        _ => Cell::new(1, bottom),
    }
}

/// Picks the next heading with a shuffled candidate order.
pub fn choose_direction<R: Rng + ?Sized>(
    from: Cell,
    current: Direction,
    target: Cell,
    is_legal: impl Fn(Direction) -> bool,
    rng: &mut R,
) -> Direction {
    let mut order = Direction::CARDINALS;
    order.shuffle(rng);
    choose_direction_in_order(from, current, target, order, is_legal)
}

/// Deterministic core of [`choose_direction`]: ties go to the earlier entry
/// of `order`.
pub fn choose_direction_in_order(
    from: Cell,
    current: Direction,
    target: Cell,
    order: [Direction; 4],
    is_legal: impl Fn(Direction) -> bool,
) -> Direction {
    let reverse = current.opposite();
    let mut best = Direction::None;
    let mut best_distance = f32::INFINITY;
    for dir in order {
        if dir == reverse || !is_legal(dir) {
            continue;
        }
        let distance = from.step(dir).distance(target);
        if distance < best_distance {
            best_distance = distance;
            best = dir;
        }
    }
    if !best.is_none() {
        return best;
    }
    if !reverse.is_none() && is_legal(reverse) {
        return reverse;
    }
    Direction::None
}
