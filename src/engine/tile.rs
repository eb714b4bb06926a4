use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use super::{ActorView, Arena, ArenaSnapshot, GhostView};
use crate::collision::{consume_food, first_catch, TickReport};
use crate::components::{Cell, Direction};
use crate::config::{GameConfig, SpawnWindow};
use crate::error::ConfigError;
use crate::ghost::{choose_direction, scatter_corner, GhostMode, ModeSchedule, ModeTimer};
use crate::level::{Grid, LevelLayout};
use crate::movement::{Cadence, GridMover};
use crate::player::DirectionBuffer;

#[derive(Debug, Clone)]
struct TileGhost {
    mover: GridMover,
    timer: ModeTimer,
    home: Cell,
}

/// Counts down to the next extra ghost. The first interval is drawn on the
/// first tick, since loading has no RNG.
#[derive(Debug, Clone)]
struct Spawner {
    window: SpawnWindow,
    remaining: Option<u32>,
}

/// Whole-cell movement: every actor occupies exactly one cell and steps when
/// its cadence fires.
#[derive(Debug, Clone)]
pub struct TileArena {
    grid: Grid,
    player_spawn: Cell,
    ghost_spawns: Vec<Cell>,
    player: GridMover,
    buffer: DirectionBuffer,
    ghosts: Vec<TileGhost>,
    ghost_cadence: Cadence,
    schedule: ModeSchedule,
    max_ghosts: usize,
    spawner: Option<Spawner>,
    food: Vec<Cell>,
    initial_food: usize,
}

impl TileArena {
    pub fn player_cell(&self) -> Cell {
        self.player.cell
    }

    pub fn player_direction(&self) -> Direction {
        self.player.direction
    }

    pub fn ghost_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.ghosts.iter().map(|ghost| ghost.mover.cell)
    }

    pub fn ghost_directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.ghosts.iter().map(|ghost| ghost.mover.direction)
    }

    pub fn food(&self) -> &[Cell] {
        &self.food
    }

    fn new_ghost(&self, home: Cell) -> TileGhost {
        TileGhost {
            mover: GridMover::new(home, self.ghost_cadence),
            timer: ModeTimer::new(self.schedule),
            home,
        }
    }

    fn move_player(&mut self) {
        let grid = &self.grid;
        let at = self.player.cell;
        self.buffer
            .apply(&mut self.player.direction, |dir| grid.is_open(at.step(dir)));

        if self.player.tick_cadence() {
            self.player.step(grid);
        }
        // Running into a wall stops the player outright.
        if !self.player.can_step(grid, self.player.direction) {
            self.player.direction = Direction::None;
        }
    }

    fn move_ghosts<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let grid = &self.grid;
        let player = self.player.cell;
        for (index, ghost) in self.ghosts.iter_mut().enumerate() {
            if let Some(mode) = ghost.timer.tick() {
                debug!(ghost = index, ?mode, "ghost mode switch");
            }
            if !ghost.mover.tick_cadence() {
                continue;
            }
            let target = match ghost.timer.mode() {
                GhostMode::Chase => player,
                GhostMode::Scatter => scatter_corner(index, grid.cols(), grid.rows()),
            };
            let from = ghost.mover.cell;
            ghost.mover.direction = choose_direction(
                from,
                ghost.mover.direction,
                target,
                |dir| grid.is_open(from.step(dir)),
                rng,
            );
            ghost.mover.step(grid);
        }
    }

    fn tick_spawner<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let Some(spawner) = self.spawner.as_mut() else {
            return;
        };
        let window = spawner.window;
        let draw = |rng: &mut R| rng.gen_range(window.min_ticks..=window.max_ticks);
        let remaining = spawner.remaining.get_or_insert_with(|| draw(rng));
        *remaining = remaining.saturating_sub(1);
        if *remaining > 0 {
            return;
        }
        spawner.remaining = Some(draw(rng));

        if self.ghosts.len() >= self.max_ghosts {
            return;
        }
        let Some(&home) = self.ghost_spawns.choose(rng) else {
            return;
        };
        if self.ghosts.iter().any(|ghost| ghost.mover.cell == home) {
            return;
        }
        let ghost = self.new_ghost(home);
        self.ghosts.push(ghost);
        debug!(ghosts = self.ghosts.len(), ?home, "ghost spawned");
    }
}

impl Arena for TileArena {
    fn load(layout: &LevelLayout, config: &GameConfig, level: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        let tuning = config.level_tuning(level);
        let tick_rate = config.rules.tick_rate;
        let player_cadence = Cadence::from_speed("player", tick_rate, tuning.player_speed)?;
        let ghost_cadence = Cadence::from_speed("ghost", tick_rate, tuning.ghost_speed)?;

        let mut arena = TileArena {
            grid: layout.grid.clone(),
            player_spawn: layout.player_spawn,
            ghost_spawns: layout.ghost_spawns.clone(),
            player: GridMover::new(layout.player_spawn, player_cadence),
            buffer: DirectionBuffer::default(),
            ghosts: Vec::new(),
            ghost_cadence,
            schedule: config.mode_schedule(),
            max_ghosts: config.ghosts.max as usize,
            spawner: config.ghosts.spawn_window.map(|window| Spawner {
                window,
                remaining: None,
            }),
            food: layout.food.clone(),
            initial_food: layout.food.len(),
        };
        if !arena.ghost_spawns.is_empty() {
            for index in 0..tuning.ghost_count {
                let home = arena.ghost_spawns[index % arena.ghost_spawns.len()];
                let ghost = arena.new_ghost(home);
                arena.ghosts.push(ghost);
            }
        }
        Ok(arena)
    }

    fn request_direction(&mut self, dir: Direction) {
        self.buffer.request(dir);
    }

    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickReport {
        self.move_player();
        self.move_ghosts(rng);
        self.tick_spawner(rng);

        let player = self.player.cell;
        let food_eaten = consume_food(&mut self.food, |cell| *cell == player);
        let caught = first_catch(self.ghosts.iter().map(|ghost| &ghost.mover.cell), |cell| {
            *cell == player
        })
        .is_some();
        TickReport { food_eaten, caught }
    }

    fn reset_actors(&mut self) {
        self.player.place(self.player_spawn);
        self.buffer.clear();
        for ghost in &mut self.ghosts {
            ghost.mover.place(ghost.home);
            ghost.timer.reset();
        }
    }

    fn food_remaining(&self) -> usize {
        self.food.len()
    }

    fn initial_food(&self) -> usize {
        self.initial_food
    }

    fn grid(&self) -> &Grid {
        &self.grid
    }

    fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot {
            player: ActorView::centered(self.player.cell, self.player.direction),
            ghosts: self
                .ghosts
                .iter()
                .map(|ghost| GhostView {
                    actor: ActorView::centered(ghost.mover.cell, ghost.mover.direction),
                    mode: ghost.timer.mode(),
                })
                .collect(),
            food: self.food.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn layout(rows: &[&str]) -> LevelLayout {
        LevelLayout::parse(rows).unwrap()
    }

    fn quiet_config() -> GameConfig {
        let mut config = GameConfig::tile();
        config.ghosts.spawn_window = None;
        config
    }

    #[test]
    fn test_player_steps_on_cadence() {
        // 5 tiles/s at 10 ticks/s: one cell every second tick.
        let level = layout(&["WWWWWWW", "WPFFFFW", "WWWWWWW"]);
        let mut arena = TileArena::load(&level, &quiet_config(), 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        arena.request_direction(Direction::Right);

        let report = arena.advance(&mut rng);
        assert_eq!(arena.player_cell(), Cell::new(1, 1));
        assert_eq!(report.food_eaten, 0);

        let report = arena.advance(&mut rng);
        assert_eq!(arena.player_cell(), Cell::new(2, 1));
        assert_eq!(report.food_eaten, 1);
        assert_eq!(arena.food_remaining(), 3);
    }

    #[test]
    fn test_blocked_turn_waits_for_junction() {
        let level = layout(&[
            "WWWWWW", //
            "WPSSSW",
            "WWWSWW",
            "WWWSWW",
            "WWWWWW",
        ]);
        let mut arena = TileArena::load(&level, &quiet_config(), 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        arena.request_direction(Direction::Right);
        arena.advance(&mut rng);
        arena.request_direction(Direction::Down);

        for _ in 0..3 {
            arena.advance(&mut rng);
        }
        // The turn fires once the player stands over the side corridor.
        assert_eq!(arena.player_cell(), Cell::new(3, 1));
        arena.advance(&mut rng);
        assert_eq!(arena.player_direction(), Direction::Down);
        for _ in 0..4 {
            arena.advance(&mut rng);
        }
        assert_eq!(arena.player_cell(), Cell::new(3, 3));
        // Dead end: the player stops.
        assert_eq!(arena.player_direction(), Direction::None);
    }

    #[test]
    fn test_ghost_count_scales_with_level() {
        let level = layout(&["WWWWWWW", "WPSGSGW", "WWWWWWW"]);
        let config = quiet_config();
        let first = TileArena::load(&level, &config, 1).unwrap();
        assert_eq!(
            first.ghost_cells().collect::<Vec<_>>(),
            [Cell::new(3, 1), Cell::new(5, 1)]
        );
        let fifth = TileArena::load(&level, &config, 5).unwrap();
        assert_eq!(fifth.ghost_cells().count(), 4);
    }

    #[test]
    fn test_spawner_respects_limit() {
        let level = layout(&["WWWWWWWWW", "WPSSSSSGW", "WWWWWWWWW"]);
        let mut config = GameConfig::tile();
        config.ghosts.initial = 1;
        config.ghosts.max = 2;
        config.ghosts.speed = 0.0;
        config.ghosts.speed_per_level = 0.0;
        config.ghosts.spawn_window = Some(SpawnWindow {
            min_ticks: 1,
            max_ticks: 1,
        });
        let mut arena = TileArena::load(&level, &config, 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        // The only spawn cell is occupied by the stationary first ghost.
        for _ in 0..10 {
            arena.advance(&mut rng);
        }
        assert_eq!(arena.ghost_cells().count(), 1);
    }

    #[test]
    fn test_reset_actors_keeps_food() {
        let level = layout(&["WWWWWWW", "WPFFFGW", "WWWWWWW"]);
        let mut arena = TileArena::load(&level, &quiet_config(), 1).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        arena.request_direction(Direction::Right);
        for _ in 0..2 {
            arena.advance(&mut rng);
        }
        let left = arena.food_remaining();
        arena.reset_actors();
        assert_eq!(arena.player_cell(), Cell::new(1, 1));
        assert_eq!(arena.player_direction(), Direction::None);
        assert!(arena.ghost_cells().all(|cell| cell == Cell::new(5, 1)));
        assert_eq!(arena.food_remaining(), left);
    }
}
