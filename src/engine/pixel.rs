use rand::Rng;
use tracing::debug;

use super::{ActorView, Arena, ArenaSnapshot, GhostView};
use crate::body::{cell_center, Body, Rect, WallMap};
use crate::collision::{consume_food, first_catch, TickReport};
use crate::components::{Cell, Direction};
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::ghost::{choose_direction, scatter_corner, GhostMode, ModeTimer};
use crate::level::{Grid, LevelLayout};
use crate::player::DirectionBuffer;

#[derive(Debug, Clone)]
struct PixelGhost {
    body: Body,
    timer: ModeTimer,
    home: Cell,
    /// Cell of the last decision, so a ghost picks a heading once per cell.
    decided_at: Option<Cell>,
}

/// Continuous movement: bodies glide a few pixels per tick and collide by
/// bounding box.
#[derive(Debug, Clone)]
pub struct PixelArena {
    grid: Grid,
    walls: WallMap,
    tile: f32,
    food_size: f32,
    player_spawn: Cell,
    player: Body,
    buffer: DirectionBuffer,
    ghosts: Vec<PixelGhost>,
    food: Vec<Cell>,
    initial_food: usize,
}

impl PixelArena {
    pub fn player_body(&self) -> &Body {
        &self.player
    }

    pub fn ghost_bodies(&self) -> impl Iterator<Item = &Body> + '_ {
        self.ghosts.iter().map(|ghost| &ghost.body)
    }

    pub fn walls(&self) -> &WallMap {
        &self.walls
    }

    fn move_player(&mut self) {
        let tile = self.tile;
        let grid = &self.grid;
        let walls = &self.walls;
        let player = &self.player;
        let aligned = player.is_aligned(tile);
        let current = player.direction;
        let cell = player.cell(tile);

        // Turns across the current axis wait until the body sits on a cell.
        // Starting or turning never heads into a walled neighbor.
        let mut heading = current;
        let turned = self.buffer.apply(&mut heading, |dir| {
            let across = !dir.shares_axis(current);
            if across && !aligned {
                return false;
            }
            if (across || current.is_none()) && !grid.is_open(cell.step(dir)) {
                return false;
            }
            let mut probe = player.clone();
            probe.snap_across(dir, tile);
            probe.can_move(dir, walls)
        });
        if turned {
            self.player.snap_across(heading, tile);
            self.player.direction = heading;
        }

        if self.player.can_move(self.player.direction, &self.walls) {
            self.player.advance();
        } else {
            self.player.direction = Direction::None;
        }
    }

    fn move_ghosts<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let tile = self.tile;
        let grid = &self.grid;
        let walls = &self.walls;
        let (cols, rows) = (grid.cols(), grid.rows());
        let player = self.player.cell(tile);

        for (index, ghost) in self.ghosts.iter_mut().enumerate() {
            if let Some(mode) = ghost.timer.tick() {
                debug!(ghost = index, ?mode, "ghost mode switch");
            }

            let cell = ghost.body.cell(tile);
            if ghost.body.is_aligned(tile) && ghost.decided_at != Some(cell) {
                ghost.body.snap_to_cell(tile);
                let target = match ghost.timer.mode() {
                    GhostMode::Chase => player,
                    GhostMode::Scatter => scatter_corner(index, cols, rows),
                };
                let heading = choose_direction(
                    cell,
                    ghost.body.direction,
                    target,
                    |dir| grid.is_open(cell.step(dir)),
                    rng,
                );
                ghost.body.direction = heading;
                ghost.decided_at = (!heading.is_none()).then_some(cell);
            }

            if ghost.body.can_move(ghost.body.direction, walls) {
                ghost.body.advance();
            } else {
                ghost.body.snap_to_cell(tile);
                ghost.body.direction = Direction::None;
                ghost.decided_at = None;
            }
        }
    }
}

impl Arena for PixelArena {
    fn load(layout: &LevelLayout, config: &GameConfig, level: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        let tuning = config.level_tuning(level);
        let pixel = &config.pixel;
        let tile = pixel.tile_size;
        let schedule = config.mode_schedule();

        let ghosts = if layout.ghost_spawns.is_empty() {
            Vec::new()
        } else {
            (0..tuning.ghost_count)
                .map(|index| {
                    let home = layout.ghost_spawns[index % layout.ghost_spawns.len()];
                    PixelGhost {
                        body: Body::new(
                            cell_center(home, tile),
                            pixel.ghost_size * tile,
                            tuning.ghost_speed,
                        ),
                        timer: ModeTimer::new(schedule),
                        home,
                        decided_at: None,
                    }
                })
                .collect()
        };

        Ok(PixelArena {
            grid: layout.grid.clone(),
            walls: WallMap::new(&layout.grid, tile),
            tile,
            food_size: pixel.food_size,
            player_spawn: layout.player_spawn,
            player: Body::new(
                cell_center(layout.player_spawn, tile),
                pixel.player_size * tile,
                tuning.player_speed,
            ),
            buffer: DirectionBuffer::default(),
            ghosts,
            food: layout.food.clone(),
            initial_food: layout.food.len(),
        })
    }

    fn request_direction(&mut self, dir: Direction) {
        self.buffer.request(dir);
    }

    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> TickReport {
        self.move_player();
        self.move_ghosts(rng);

        let player = self.player.rect();
        let (tile, food_size) = (self.tile, self.food_size);
        let food_eaten = consume_food(&mut self.food, |cell| {
            Rect::from_center(cell_center(*cell, tile), food_size).overlaps(&player)
        });

        let ghost_rects: Vec<Rect> = self.ghosts.iter().map(|ghost| ghost.body.rect()).collect();
        let caught = first_catch(&ghost_rects, |rect| rect.overlaps(&player)).is_some();
        TickReport { food_eaten, caught }
    }

    fn reset_actors(&mut self) {
        self.player.place(cell_center(self.player_spawn, self.tile));
        self.buffer.clear();
        for ghost in &mut self.ghosts {
            ghost.body.place(cell_center(ghost.home, self.tile));
            ghost.timer.reset();
            ghost.decided_at = None;
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
        let view = |body: &Body| ActorView {
            cell: body.cell(self.tile),
            position: body.center / self.tile,
            direction: body.direction,
        };
        ArenaSnapshot {
            player: view(&self.player),
            ghosts: self
                .ghosts
                .iter()
                .map(|ghost| GhostView {
                    actor: view(&ghost.body),
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
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn arena(rows: &[&str]) -> PixelArena {
        let layout = LevelLayout::parse(rows).unwrap();
        PixelArena::load(&layout, &GameConfig::pixel(), 1).unwrap()
    }

    #[test]
    fn test_turn_deferred_until_aligned() {
        let mut arena = arena(&[
            "WWWWWWW", //
            "WPSSSSW",
            "WWWSWWW",
            "WWWSWWW",
            "WWWWWWW",
        ]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        arena.request_direction(Direction::Right);
        arena.advance(&mut rng);
        arena.request_direction(Direction::Down);

        // 3 px per tick from x = 45 reaches the junction center x = 105 after
        // 20 ticks; at x = 102 the turn is still deferred.
        for _ in 1..20 {
            arena.advance(&mut rng);
        }
        assert_eq!(arena.player_body().direction, Direction::Right);
        assert_eq!(arena.player_body().center, Vec2::new(105.0, 45.0));

        arena.advance(&mut rng);
        assert_eq!(arena.player_body().direction, Direction::Down);
        assert_eq!(arena.player_body().center, Vec2::new(105.0, 48.0));

        for _ in 0..25 {
            arena.advance(&mut rng);
        }
        assert_eq!(arena.player_body().direction, Direction::None);
        assert_eq!(arena.player_body().cell(30.0), Cell::new(3, 3));
    }

    #[test]
    fn test_food_eaten_on_box_overlap() {
        let mut arena = arena(&["WWWWWW", "WPFSSW", "WWWWWW"]);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        arena.request_direction(Direction::Right);
        for _ in 0..5 {
            // Edges touch at x = 60 but do not overlap yet.
            assert_eq!(arena.advance(&mut rng).food_eaten, 0);
        }
        assert_eq!(arena.advance(&mut rng).food_eaten, 1);
        assert_eq!(arena.food_remaining(), 0);
        assert_eq!(arena.initial_food(), 1);
    }

    #[test]
    fn test_ghost_closes_in_along_corridor() {
        let mut arena = arena(&["WWWWWWWW", "WPSSSSGW", "WWWWWWWW"]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let first_catch = (1..=100).find(|_| arena.advance(&mut rng).caught);
        // Ghosts start at x = 195 and need x < 67.5 to touch the player box.
        assert_eq!(first_catch, Some(64));
    }

    #[test]
    fn test_blocked_body_stops() {
        let mut arena = arena(&["WWWWW", "WPSSW", "WWWWW"]);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        arena.request_direction(Direction::Up);
        arena.advance(&mut rng);
        assert_eq!(arena.player_body().direction, Direction::None);
        assert_eq!(arena.player_body().center, Vec2::new(45.0, 45.0));
    }
}
