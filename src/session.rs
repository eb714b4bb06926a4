//! Menu, play, life loss, level completion and game over.
//!
//! A [`Session`] owns the active [`Arena`] along with score and lives. It only
//! leaves `LevelComplete`, `GameOver` and `Won` on an explicit command; nothing
//! times out on its own.

use rand::Rng;
use tracing::{debug, info};

use crate::collision::{resolve, Scoreboard, Verdict};
use crate::components::Direction;
use crate::config::GameConfig;
use crate::engine::{Arena, ArenaSnapshot};
use crate::error::ConfigError;
use crate::level::{Grid, LevelLayout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Menu,
    Playing,
    /// The board is frozen for `resume_in` more ticks after a lost life.
    LifeLost { resume_in: u32 },
    LevelComplete,
    GameOver,
    /// Every layout cleared with `win_after_last_level` set.
    Won,
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Start,
    /// Advance to the next level from `LevelComplete`.
    Continue,
    /// Full reset from `GameOver` or `Won`.
    Restart,
    Quit,
}

/// Read-only view handed to renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub arena: ArenaSnapshot,
}

pub struct Session<A, R> {
    config: GameConfig,
    levels: Vec<LevelLayout>,
    arena: A,
    state: SessionState,
    scoreboard: Scoreboard,
    level: u32,
    rng: R,
}

impl<A: Arena, R: Rng> Session<A, R> {
    /// Validates the config and loads level 1. The session waits in `Menu`.
    pub fn new(config: GameConfig, levels: Vec<LevelLayout>, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let first = levels.first().ok_or(ConfigError::NoLevels)?;
        let arena = A::load(first, &config, 1)?;
        info!(level = 1, food = arena.initial_food(), "level loaded");
        Ok(Session {
            scoreboard: Scoreboard::new(config.rules.starting_lives),
            config,
            levels,
            arena,
            state: SessionState::Menu,
            level: 1,
            rng,
        })
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn scoreboard(&self) -> Scoreboard {
        self.scoreboard
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn arena(&self) -> &A {
        &self.arena
    }

    pub fn grid(&self) -> &Grid {
        self.arena.grid()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Applies a session command. Returns whether it changed anything;
    /// commands that do not fit the current state are ignored.
    pub fn command(&mut self, command: SessionCommand) -> Result<bool, ConfigError> {
        match (command, self.state) {
            (SessionCommand::Quit, SessionState::Exited) => Ok(false),
            (SessionCommand::Quit, _) => {
                info!(score = self.scoreboard.score, level = self.level, "session exited");
                self.state = SessionState::Exited;
                Ok(true)
            }
            (SessionCommand::Start, SessionState::Menu) => {
                self.state = SessionState::Playing;
                Ok(true)
            }
            (SessionCommand::Continue, SessionState::LevelComplete) => {
                if self.config.rules.win_after_last_level
                    && self.level as usize >= self.levels.len()
                {
                    info!(score = self.scoreboard.score, level = self.level, "all levels cleared");
                    self.state = SessionState::Won;
                    return Ok(true);
                }
                self.load_level(self.level + 1)?;
                self.state = SessionState::Playing;
                Ok(true)
            }
            (SessionCommand::Restart, SessionState::GameOver | SessionState::Won) => {
                self.scoreboard = Scoreboard::new(self.config.rules.starting_lives);
                self.load_level(1)?;
                self.state = SessionState::Playing;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Buffers a turn for the player. Requests made during the pause after a
    /// lost life wait for play to resume; other states ignore them.
    pub fn request_direction(&mut self, dir: Direction) {
        if matches!(
            self.state,
            SessionState::Playing | SessionState::LifeLost { .. }
        ) {
            self.arena.request_direction(dir);
        }
    }

    /// Advances one tick. Returns the resolver verdict when the board was
    /// simulated, `None` when the session is paused or waiting for input.
    pub fn tick(&mut self) -> Option<Verdict> {
        match self.state {
            SessionState::Playing => {}
            SessionState::LifeLost { resume_in } => {
                self.state = match resume_in {
                    0 | 1 => SessionState::Playing,
                    _ => SessionState::LifeLost {
                        resume_in: resume_in - 1,
                    },
                };
                return None;
            }
            _ => return None,
        }

        let report = self.arena.advance(&mut self.rng);
        let verdict = resolve(
            report,
            &mut self.scoreboard,
            self.config.rules.food_reward,
            self.arena.food_remaining(),
            self.arena.initial_food(),
        );
        match verdict {
            Verdict::Continue => {}
            Verdict::LifeLost { lives_left } => {
                debug!(lives_left, "life lost");
                self.arena.reset_actors();
                let delay = self.config.rules.respawn_delay_ticks;
                self.state = if delay > 0 {
                    SessionState::LifeLost { resume_in: delay }
                } else {
                    SessionState::Playing
                };
            }
            Verdict::GameOver => {
                info!(score = self.scoreboard.score, level = self.level, "game over");
                self.state = SessionState::GameOver;
            }
            Verdict::LevelComplete => {
                info!(score = self.scoreboard.score, level = self.level, "level complete");
                self.state = SessionState::LevelComplete;
            }
        }
        Some(verdict)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            score: self.scoreboard.score,
            lives: self.scoreboard.lives,
            level: self.level,
            arena: self.arena.snapshot(),
        }
    }

    /// Levels past the last layout wrap around unless the game is won there;
    /// difficulty keeps scaling with the level number.
    fn load_level(&mut self, level: u32) -> Result<(), ConfigError> {
        let index = (level as usize - 1) % self.levels.len();
        self.arena = A::load(&self.levels[index], &self.config, level)?;
        self.level = level;
        info!(level, layout = index, food = self.arena.initial_food(), "level loaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TileArena;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn session(rows: &[&str], config: GameConfig) -> Session<TileArena, ChaCha8Rng> {
        let layout = LevelLayout::parse(rows).unwrap();
        Session::new(config, vec![layout], ChaCha8Rng::seed_from_u64(9)).unwrap()
    }

    #[test]
    fn test_commands_follow_state() {
        let mut session = session(&["WWWWW", "WPFFW", "WWWWW"], GameConfig::tile());
        assert_eq!(session.state(), SessionState::Menu);
        assert_eq!(session.tick(), None);
        assert!(!session.command(SessionCommand::Continue).unwrap());
        assert!(!session.command(SessionCommand::Restart).unwrap());
        assert!(session.command(SessionCommand::Start).unwrap());
        assert_eq!(session.state(), SessionState::Playing);
        assert!(!session.command(SessionCommand::Start).unwrap());
        assert!(session.command(SessionCommand::Quit).unwrap());
        assert_eq!(session.state(), SessionState::Exited);
        assert!(!session.command(SessionCommand::Quit).unwrap());
    }

    #[test]
    fn test_no_levels_is_an_error() {
        let result: Result<Session<TileArena, _>, _> =
            Session::new(GameConfig::tile(), Vec::new(), ChaCha8Rng::seed_from_u64(0));
        assert!(matches!(result, Err(ConfigError::NoLevels)));
    }

    #[test]
    fn test_clearing_food_completes_and_continue_advances() {
        let mut session = session(&["WWWWW", "WPFSW", "WWWWW"], GameConfig::tile());
        session.command(SessionCommand::Start).unwrap();
        session.request_direction(Direction::Right);
        let verdicts: Vec<_> = (0..2).filter_map(|_| session.tick()).collect();
        assert_eq!(verdicts.last(), Some(&Verdict::LevelComplete));
        assert_eq!(session.state(), SessionState::LevelComplete);
        assert_eq!(session.scoreboard().score, 10);

        // Frozen until told to continue.
        assert_eq!(session.tick(), None);
        assert!(session.command(SessionCommand::Continue).unwrap());
        assert_eq!(session.level(), 2);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.scoreboard().score, 10);
        assert_eq!(session.arena().food_remaining(), 1);
    }

    #[test]
    fn test_respawn_delay_freezes_board() {
        let mut config = GameConfig::tile();
        config.rules.respawn_delay_ticks = 3;
        config.ghosts.spawn_window = None;
        // Ghost parked on the player's spawn catches on the first tick.
        let layout = LevelLayout {
            ghost_spawns: vec![crate::components::Cell::new(1, 1)],
            ..LevelLayout::parse(&["WWWWW", "WPFFW", "WWWWW"]).unwrap()
        };
        let mut session: Session<TileArena, _> =
            Session::new(config, vec![layout], ChaCha8Rng::seed_from_u64(1)).unwrap();
        session.command(SessionCommand::Start).unwrap();

        assert_eq!(session.tick(), Some(Verdict::LifeLost { lives_left: 2 }));
        assert_eq!(session.state(), SessionState::LifeLost { resume_in: 3 });
        session.request_direction(Direction::Right);
        assert_eq!(session.tick(), None);
        assert_eq!(session.tick(), None);
        assert_eq!(session.tick(), None);
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.scoreboard().lives, 2);
    }

    /// Corridor with the player at (1,1) and two parked ghosts on (2,1).
    fn ambush_session(config: GameConfig) -> Session<TileArena, ChaCha8Rng> {
        let layout = LevelLayout {
            ghost_spawns: vec![crate::components::Cell::new(2, 1)],
            ..LevelLayout::parse(&["WWWWWW", "WPSFFW", "WWWWWW"]).unwrap()
        };
        let mut session = Session::new(config, vec![layout], ChaCha8Rng::seed_from_u64(6)).unwrap();
        session.command(SessionCommand::Start).unwrap();
        session
    }

    #[test]
    fn test_turn_requested_during_pause_is_kept() {
        let mut config = GameConfig::tile();
        config.rules.respawn_delay_ticks = 3;
        config.ghosts.speed = 0.0;
        config.ghosts.speed_per_level = 0.0;
        config.ghosts.spawn_window = None;
        let mut session = ambush_session(config);

        session.request_direction(Direction::Right);
        session.tick();
        assert_eq!(session.tick(), Some(Verdict::LifeLost { lives_left: 2 }));
        assert_eq!(session.arena().player_direction(), Direction::None);

        session.request_direction(Direction::Right);
        for _ in 0..3 {
            assert_eq!(session.tick(), None);
        }
        assert_eq!(session.tick(), Some(Verdict::Continue));
        assert_eq!(session.arena().player_direction(), Direction::Right);
    }

    #[test]
    fn test_last_layout_wins_when_enabled() {
        let rows = ["WWWWW", "WPFSW", "WWWWW"];
        let levels = vec![
            LevelLayout::parse(&rows).unwrap(),
            LevelLayout::parse(&rows).unwrap(),
        ];
        let mut config = GameConfig::tile();
        config.rules.win_after_last_level = true;
        let mut session: Session<TileArena, _> =
            Session::new(config, levels, ChaCha8Rng::seed_from_u64(10)).unwrap();
        session.command(SessionCommand::Start).unwrap();

        for level in 1..=2 {
            session.request_direction(Direction::Right);
            let verdicts: Vec<_> = (0..2).filter_map(|_| session.tick()).collect();
            assert_eq!(verdicts.last(), Some(&Verdict::LevelComplete));
            assert_eq!(session.level(), level);
            assert!(session.command(SessionCommand::Continue).unwrap());
        }
        assert_eq!(session.state(), SessionState::Won);
        assert_eq!(session.level(), 2);
        assert_eq!(session.scoreboard().score, 20);

        assert_eq!(session.tick(), None);
        assert!(!session.command(SessionCommand::Continue).unwrap());
        assert!(!session.command(SessionCommand::Start).unwrap());
        assert!(session.command(SessionCommand::Restart).unwrap());
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.level(), 1);
        assert_eq!(session.scoreboard().score, 0);
    }

    #[test]
    fn test_levels_wrap_when_winning_is_off() {
        let mut session = session(&["WWWWW", "WPFSW", "WWWWW"], GameConfig::tile());
        session.command(SessionCommand::Start).unwrap();
        session.request_direction(Direction::Right);
        (0..2).for_each(|_| {
            session.tick();
        });
        assert_eq!(session.state(), SessionState::LevelComplete);
        assert!(session.command(SessionCommand::Continue).unwrap());
        assert_eq!(session.state(), SessionState::Playing);
        assert_eq!(session.level(), 2);
    }
}
