//! Movement and collision core for small grid arcade games.
//!
//! Two maze chase engines share one session state machine: [`engine::TileArena`]
//! steps whole cells on a tick cadence and [`engine::PixelArena`] glides
//! bounding boxes through the maze. [`snake::SnakeGame`] reuses the grid and
//! direction primitives for a snake variant.

pub mod body;
pub mod collision;
pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod ghost;
pub mod highscore;
pub mod level;
pub mod movement;
pub mod player;
pub mod session;
pub mod snake;
