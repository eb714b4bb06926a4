//! Snake on an open square field.
//!
//! Shares the grid and direction primitives with the maze games but has its
//! own rules: the field edge is the only wall, the body is the obstacle and
//! the game speeds up as the snake grows.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::components::{Cell, Direction};
use crate::config::{GameConfig, SnakeConfig};
use crate::error::ConfigError;
use crate::level::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnakeEvent {
    Moved,
    Ate { score: u32 },
    /// The run ended. `new_high_score` is set when the final score beat the
    /// previous best, so the caller knows to persist it.
    GameOver { score: u32, new_high_score: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    /// Head first.
    segments: VecDeque<Cell>,
    /// Direction of the last completed move.
    heading: Direction,
    /// Direction the next move will take.
    direction: Direction,
    grow_pending: bool,
}

impl Snake {
    fn new(head: Cell, length: usize) -> Snake {
        let segments = (0..length as i32)
            .map(|offset| Cell::new(head.col - offset, head.row))
            .collect();
        Snake {
            segments,
            heading: Direction::Right,
            direction: Direction::Right,
            grow_pending: false,
        }
    }

    pub fn head(&self) -> Cell {
        // Never empty: built with at least one segment and only ever grows.
        self.segments[0]
    }

    pub fn segments(&self) -> impl Iterator<Item = Cell> + '_ {
        self.segments.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn occupies(&self, cell: Cell) -> bool {
        self.segments.contains(&cell)
    }

    /// Whether the head may move into `cell`. The tail only counts when it
    /// stays put this move.
    fn blocked_by_body(&self, cell: Cell) -> bool {
        let keep = if self.grow_pending {
            self.segments.len()
        } else {
            self.segments.len() - 1
        };
        self.segments.iter().take(keep).any(|segment| *segment == cell)
    }

    fn advance(&mut self, head: Cell) {
        self.segments.push_front(head);
        if self.grow_pending {
            self.grow_pending = false;
        } else {
            self.segments.pop_back();
        }
        self.heading = self.direction;
    }
}

pub struct SnakeGame<R> {
    config: SnakeConfig,
    field: Grid,
    snake: Snake,
    food: Option<Cell>,
    score: u32,
    high_score: u32,
    over: bool,
    rng: R,
}

impl<R: Rng> SnakeGame<R> {
    pub fn new(config: &GameConfig, high_score: u32, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let snake_config = config.snake.clone();
        let size = snake_config.grid_size as usize;
        let mut game = SnakeGame {
            snake: Snake::new(start_cell(size), snake_config.initial_length as usize),
            field: Grid::open_field(size, size),
            config: snake_config,
            food: None,
            score: 0,
            high_score,
            over: false,
            rng,
        };
        game.spawn_food();
        Ok(game)
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn field(&self) -> &Grid {
        &self.field
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// Steers the snake. `None` and a reversal of the last move are ignored.
    pub fn turn(&mut self, dir: Direction) {
        if dir.is_none() || dir == self.snake.heading.opposite() {
            return;
        }
        self.snake.direction = dir;
    }

    pub fn ticks_per_second(&self) -> u32 {
        let step = (self.snake.len() as u32) / self.config.speed_step_every.max(1);
        self.config.base_speed + step
    }

    /// Moves the snake one cell. Returns `None` once the game is over.
    pub fn tick(&mut self) -> Option<SnakeEvent> {
        if self.over {
            return None;
        }

        let head = self.snake.head().step(self.snake.direction);
        if !self.field.is_open(head) || self.snake.blocked_by_body(head) {
            self.over = true;
            let new_high_score = self.score > self.high_score;
            if new_high_score {
                self.high_score = self.score;
            }
            info!(score = self.score, length = self.snake.len(), new_high_score, "snake game over");
            return Some(SnakeEvent::GameOver {
                score: self.score,
                new_high_score,
            });
        }

        self.snake.advance(head);
        if self.food == Some(head) {
            self.score = self.score.saturating_add(self.config.food_reward);
            self.snake.grow_pending = true;
            self.spawn_food();
            return Some(SnakeEvent::Ate { score: self.score });
        }
        Some(SnakeEvent::Moved)
    }

    /// New run on the same field. The high score carries over.
    pub fn restart(&mut self) {
        let size = self.config.grid_size as usize;
        self.snake = Snake::new(start_cell(size), self.config.initial_length as usize);
        self.score = 0;
        self.over = false;
        self.spawn_food();
    }

    fn spawn_food(&mut self) {
        let free: Vec<Cell> = self
            .field
            .cells()
            .map(|(cell, _)| cell)
            .filter(|cell| !self.snake.occupies(*cell))
            .collect();
        self.food = free.choose(&mut self.rng).copied();
    }
}

fn start_cell(size: usize) -> Cell {
    let middle = (size / 2) as i32;
    Cell::new(middle, middle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn game(grid_size: u32) -> SnakeGame<ChaCha8Rng> {
        let mut config = GameConfig::tile();
        config.snake.grid_size = grid_size;
        SnakeGame::new(&config, 0, ChaCha8Rng::seed_from_u64(5)).unwrap()
    }

    #[test]
    fn test_starts_centered_heading_right() {
        let game = game(20);
        assert_eq!(
            game.snake().segments().collect::<Vec<_>>(),
            [Cell::new(10, 10), Cell::new(9, 10), Cell::new(8, 10)]
        );
        let food = game.food().unwrap();
        assert!(!game.snake().occupies(food));
        assert_eq!(game.ticks_per_second(), 10);
    }

    #[test]
    fn test_reversal_ignored() {
        let mut game = game(20);
        game.turn(Direction::Left);
        assert_eq!(game.snake().direction(), Direction::Right);
        game.turn(Direction::None);
        assert_eq!(game.snake().direction(), Direction::Right);

        // Two quick turns cannot fold the snake back onto its neck.
        game.turn(Direction::Up);
        game.turn(Direction::Left);
        assert_eq!(game.snake().direction(), Direction::Up);
        game.food = None;
        assert_eq!(game.tick(), Some(SnakeEvent::Moved));
        assert_eq!(game.snake().head(), Cell::new(10, 9));
    }

    #[test]
    fn test_wall_ends_game() {
        let mut game = game(6);
        game.food = Some(Cell::new(0, 0));
        assert_eq!(game.tick(), Some(SnakeEvent::Moved));
        assert_eq!(game.tick(), Some(SnakeEvent::Moved));
        assert_eq!(
            game.tick(),
            Some(SnakeEvent::GameOver {
                score: 0,
                new_high_score: false
            })
        );
        assert!(game.is_over());
        assert_eq!(game.tick(), None);
    }

    #[test]
    fn test_eating_grows_next_move() {
        let mut game = game(20);
        game.food = Some(Cell::new(11, 10));
        assert_eq!(game.tick(), Some(SnakeEvent::Ate { score: 10 }));
        assert_eq!(game.snake().len(), 3);
        game.food = None;
        assert_eq!(game.tick(), Some(SnakeEvent::Moved));
        assert_eq!(game.snake().len(), 4);
        assert_eq!(game.snake().head(), Cell::new(12, 10));
    }

    #[test]
    fn test_tail_cell_is_free_unless_growing() {
        let mut game = game(20);
        game.food = None;
        // A 4-segment ring: the head chases its own tail.
        game.snake.segments = VecDeque::from([
            Cell::new(5, 5),
            Cell::new(5, 6),
            Cell::new(6, 6),
            Cell::new(6, 5),
        ]);
        game.snake.heading = Direction::Up;
        game.turn(Direction::Right);
        assert_eq!(game.tick(), Some(SnakeEvent::Moved));
        assert_eq!(game.snake().head(), Cell::new(6, 5));

        game.snake.segments = VecDeque::from([
            Cell::new(5, 5),
            Cell::new(5, 6),
            Cell::new(6, 6),
            Cell::new(6, 5),
        ]);
        game.snake.grow_pending = true;
        assert!(matches!(game.tick(), Some(SnakeEvent::GameOver { .. })));
    }

    #[test]
    fn test_high_score_reported_only_when_beaten() {
        let mut game = game(6);
        game.high_score = 5;
        game.food = Some(Cell::new(4, 3));
        assert_eq!(game.tick(), Some(SnakeEvent::Ate { score: 10 }));
        game.food = None;
        game.tick();
        assert_eq!(
            game.tick(),
            Some(SnakeEvent::GameOver {
                score: 10,
                new_high_score: true
            })
        );
        assert_eq!(game.high_score(), 10);

        game.restart();
        assert_eq!(game.score(), 0);
        assert!(!game.is_over());
        assert_eq!(game.high_score(), 10);
        assert_eq!(game.snake().len(), 3);
    }
}
