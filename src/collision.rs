//! Post-move resolution of food pickups and ghost catches.

use serde::{Deserialize, Serialize};

/// What the movement phase of one tick produced, before scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub food_eaten: u32,
    pub caught: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub score: u32,
    pub lives: u32,
}

impl Scoreboard {
    pub fn new(lives: u32) -> Self {
        Self { score: 0, lives }
    }
}

/// Result of applying one tick's report to the scoreboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    LifeLost { lives_left: u32 },
    GameOver,
    LevelComplete,
}

/// Removes every item `touches` accepts and returns how many went. Each item
/// is removed at most once.
pub fn consume_food<T>(food: &mut Vec<T>, touches: impl Fn(&T) -> bool) -> u32 {
    let before = food.len();
    food.retain(|item| !touches(item));
    (before - food.len()) as u32
}

/// Index of the first ghost touching the player. Later ghosts are not looked at.
pub fn first_catch<'a, T: 'a>(
    ghosts: impl IntoIterator<Item = &'a T>,
    touches: impl Fn(&T) -> bool,
) -> Option<usize> {
    ghosts.into_iter().position(|ghost| touches(ghost))
}

/// Applies score and life effects. At most one life is lost per tick; losing
/// the last one wins over clearing the board.
pub fn resolve(
    report: TickReport,
    scoreboard: &mut Scoreboard,
    reward: u32,
    food_left: usize,
    initial_food: usize,
) -> Verdict {
    scoreboard.score = scoreboard
        .score
        .saturating_add(report.food_eaten.saturating_mul(reward));

    if report.caught {
        scoreboard.lives = scoreboard.lives.saturating_sub(1);
        if scoreboard.lives == 0 {
            return Verdict::GameOver;
        }
    }

    if report.food_eaten > 0 && food_left == 0 && initial_food > 0 {
        return Verdict::LevelComplete;
    }

    if report.caught {
        return Verdict::LifeLost {
            lives_left: scoreboard.lives,
        };
    }
    Verdict::Continue
}
