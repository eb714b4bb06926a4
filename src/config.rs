//! Game tuning, loadable from TOML.
//!
//! Every section falls back to the tile-engine preset for missing keys, so a
//! config file only needs to name what it changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::ghost::ModeSchedule;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rules: Rules,
    pub player: PlayerTuning,
    pub ghosts: GhostTuning,
    pub pixel: PixelTuning,
    pub snake: SnakeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    /// Core ticks per second.
    pub tick_rate: u32,
    pub starting_lives: u32,
    pub food_reward: u32,
    pub scatter_seconds: f32,
    pub chase_seconds: f32,
    /// Ticks the board stays frozen after a lost life.
    pub respawn_delay_ticks: u32,
    /// Clearing the last layout wins the game instead of wrapping around.
    pub win_after_last_level: bool,
}

/// Speeds are tiles/second on the tile engine and pixels/tick on the pixel
/// engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub speed: f32,
    pub speed_per_level: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostTuning {
    pub speed: f32,
    pub speed_per_level: f32,
    /// Ghosts on level 1.
    pub initial: u32,
    pub per_level: u32,
    pub max: u32,
    /// Extra ghosts trickle in on this timer (tile engine only). Absent from
    /// both the file and the preset means no extra ghosts.
    #[serde(default)]
    pub spawn_window: Option<SpawnWindow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnWindow {
    pub min_ticks: u32,
    pub max_ticks: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelTuning {
    /// Tile edge in pixels.
    pub tile_size: f32,
    /// Body edges as a fraction of the tile.
    pub player_size: f32,
    pub ghost_size: f32,
    /// Food edge in pixels.
    pub food_size: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    pub grid_size: u32,
    pub initial_length: u32,
    pub food_reward: u32,
    /// Ticks per second at the starting length.
    pub base_speed: u32,
    /// One extra tick per second for every this many segments.
    pub speed_step_every: u32,
}

/// Per-level values derived from [`GameConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelTuning {
    pub level: u32,
    pub player_speed: f32,
    pub ghost_speed: f32,
    pub ghost_count: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::tile()
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            tick_rate: 10,
            starting_lives: 3,
            food_reward: 10,
            scatter_seconds: 7.0,
            chase_seconds: 20.0,
            respawn_delay_ticks: 0,
            win_after_last_level: false,
        }
    }
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            speed: 5.0,
            speed_per_level: 1.0,
        }
    }
}

impl Default for GhostTuning {
    fn default() -> Self {
        Self {
            speed: 4.0,
            speed_per_level: 0.5,
            initial: 2,
            per_level: 1,
            max: 4,
            spawn_window: Some(SpawnWindow {
                min_ticks: 50,
                max_ticks: 150,
            }),
        }
    }
}

impl Default for PixelTuning {
    fn default() -> Self {
        Self {
            tile_size: 30.0,
            player_size: 0.8,
            ghost_size: 0.7,
            food_size: 6.0,
        }
    }
}

impl Default for SnakeConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            initial_length: 3,
            food_reward: 10,
            base_speed: 10,
            speed_step_every: 5,
        }
    }
}

impl GameConfig {
    /// Tile-stepping preset: 10 ticks/s, whole-cell moves.
    pub fn tile() -> Self {
        Self {
            rules: Rules::default(),
            player: PlayerTuning::default(),
            ghosts: GhostTuning::default(),
            pixel: PixelTuning::default(),
            snake: SnakeConfig::default(),
        }
    }

    /// Pixel-movement preset: 60 ticks/s, speeds in pixels per tick.
    pub fn pixel() -> Self {
        Self {
            rules: Rules {
                tick_rate: 60,
                respawn_delay_ticks: 60,
                win_after_last_level: true,
                ..Rules::default()
            },
            player: PlayerTuning {
                speed: 3.0,
                speed_per_level: 0.6,
            },
            ghosts: GhostTuning {
                speed: 2.0,
                speed_per_level: 0.2,
                initial: 2,
                per_level: 1,
                max: 5,
                spawn_window: None,
            },
            pixel: PixelTuning::default(),
            snake: SnakeConfig::default(),
        }
    }

    /// Parses a config file over the tile preset.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Self::from_toml_str_over(text, &Self::tile())
    }

    /// Parses a config file over `preset`: keys the file names replace the
    /// preset's, everything else keeps the preset value.
    pub fn from_toml_str_over(text: &str, preset: &GameConfig) -> Result<Self, ConfigError> {
        let overrides: toml::Table = toml::from_str(text)?;
        let mut merged = toml::Value::try_from(preset)?;
        if let toml::Value::Table(base) = &mut merged {
            merge_tables(base, overrides);
        }
        let config = GameConfig::deserialize(merged)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_over(path, &Self::tile())
    }

    pub fn load_over(path: impl AsRef<Path>, preset: &GameConfig) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str_over(&text, preset)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rules = &self.rules;
        if rules.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if rules.starting_lives == 0 {
            return Err(ConfigError::ZeroLives);
        }
        check_duration("rules.scatter_seconds", rules.scatter_seconds)?;
        check_duration("rules.chase_seconds", rules.chase_seconds)?;

        check_speed("player", self.player.speed)?;
        check_speed("player", self.player.speed_per_level)?;
        check_speed("ghost", self.ghosts.speed)?;
        check_speed("ghost", self.ghosts.speed_per_level)?;
        if let Some(window) = self.ghosts.spawn_window {
            if window.min_ticks > window.max_ticks {
                return Err(ConfigError::InvalidSpawnWindow {
                    min_ticks: window.min_ticks,
                    max_ticks: window.max_ticks,
                });
            }
        }

        let pixel = &self.pixel;
        check_size("pixel.tile_size", pixel.tile_size)?;
        check_size("pixel.player_size", pixel.player_size)?;
        check_size("pixel.ghost_size", pixel.ghost_size)?;
        check_size("pixel.food_size", pixel.food_size)?;
        if pixel.player_size > 1.0 || pixel.ghost_size > 1.0 {
            return Err(ConfigError::OutOfRange {
                field: "pixel body size",
                value: pixel.player_size.max(pixel.ghost_size),
            });
        }

        let snake = &self.snake;
        check_size("snake.grid_size", snake.grid_size as f32)?;
        check_size("snake.base_speed", snake.base_speed as f32)?;
        check_size("snake.speed_step_every", snake.speed_step_every as f32)?;
        if snake.initial_length == 0 || snake.initial_length > snake.grid_size / 2 + 1 {
            return Err(ConfigError::OutOfRange {
                field: "snake.initial_length",
                value: snake.initial_length as f32,
            });
        }
        Ok(())
    }

    pub fn mode_schedule(&self) -> ModeSchedule {
        let rate = self.rules.tick_rate as f32;
        ModeSchedule {
            scatter_ticks: (self.rules.scatter_seconds * rate).round() as u32,
            chase_ticks: (self.rules.chase_seconds * rate).round() as u32,
        }
    }

    /// Difficulty for a 1-based level number.
    pub fn level_tuning(&self, level: u32) -> LevelTuning {
        let steps = level.saturating_sub(1);
        let ghosts = &self.ghosts;
        let ghost_count = ghosts
            .initial
            .saturating_add(ghosts.per_level.saturating_mul(steps))
            .min(ghosts.max);
        LevelTuning {
            level,
            player_speed: self.player.speed + self.player.speed_per_level * steps as f32,
            ghost_speed: ghosts.speed + ghosts.speed_per_level * steps as f32,
            ghost_count: ghost_count as usize,
        }
    }
}

fn merge_tables(base: &mut toml::Table, overrides: toml::Table) {
    for (key, value) in overrides {
        match value {
            toml::Value::Table(section) => {
                if let Some(toml::Value::Table(existing)) = base.get_mut(&key) {
                    merge_tables(existing, section);
                } else {
                    base.insert(key, toml::Value::Table(section));
                }
            }
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn check_speed(actor: &'static str, speed: f32) -> Result<(), ConfigError> {
    if speed.is_finite() && speed >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeSpeed { actor, speed })
    }
}

fn check_size(what: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveSize { what, value })
    }
}

fn check_duration(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange { field, value })
    }
}
