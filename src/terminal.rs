//! Crossterm front end: key mapping, frame building and a diffing renderer.

use std::io::{self, Stdout, Write};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{ExecutableCommand, QueueableCommand};
use rand::Rng;
use tracing::info;
use unicode_width::UnicodeWidthStr;

use maze_chase::components::{Cell, Direction};
use maze_chase::engine::Arena;
use maze_chase::ghost::GhostMode;
use maze_chase::highscore::HighScoreFile;
use maze_chase::level::{Grid, Tile};
use maze_chase::session::{Session, SessionCommand, SessionSnapshot, SessionState};
use maze_chase::snake::{SnakeEvent, SnakeGame};

const CELL_W: usize = 2;
const RENDER_FPS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Turn(Direction),
    Start,
    Continue,
    Restart,
    Quit,
}

pub fn action_for(code: KeyCode) -> Option<Action> {
    let action = match code {
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Action::Turn(Direction::Up),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Action::Turn(Direction::Down),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Action::Turn(Direction::Left),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Action::Turn(Direction::Right),
        KeyCode::Enter => Action::Start,
        KeyCode::Char(' ') => Action::Continue,
        KeyCode::Char('r') => Action::Restart,
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        _ => return None,
    };
    Some(action)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Player,
    Chaser,
    Scatterer,
    Wall,
    Empty,
    Food,
    SnakeHead,
    SnakeBody,
    Apple,
}

impl Glyph {
    fn style(self) -> (&'static str, Color) {
        match self {
            Glyph::Player => ("😃", Color::Yellow),
            Glyph::Chaser => ("👻", Color::Red),
            Glyph::Scatterer => ("👻", Color::Cyan),
            Glyph::Wall => ("██", Color::Blue),
            Glyph::Empty => ("  ", Color::Reset),
            Glyph::Food => ("· ", Color::White),
            Glyph::SnakeHead => ("██", Color::Green),
            Glyph::SnakeBody => ("▓▓", Color::DarkGreen),
            Glyph::Apple => ("🍎", Color::Red),
        }
    }
}

/// One screen worth of glyphs plus the status line above it.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    glyphs: Vec<Glyph>,
    status: String,
}

impl Frame {
    fn new(width: usize, height: usize, status: String) -> Self {
        Self {
            width,
            height,
            glyphs: vec![Glyph::Empty; width * height],
            status,
        }
    }

    fn set(&mut self, x: i32, y: i32, glyph: Glyph) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        self.glyphs[y as usize * self.width + x as usize] = glyph;
    }

    #[cfg(test)]
    pub fn glyph(&self, x: usize, y: usize) -> Glyph {
        self.glyphs[y * self.width + x]
    }

    #[cfg(test)]
    pub fn status(&self) -> &str {
        &self.status
    }
}

pub fn session_frame(snapshot: &SessionSnapshot, grid: &Grid) -> Frame {
    let hint = match snapshot.state {
        SessionState::Menu => "Enter to start",
        SessionState::Playing => "q to quit",
        SessionState::LifeLost { .. } => "caught!",
        SessionState::LevelComplete => "level clear, Space for next",
        SessionState::GameOver => "GAME OVER, r to restart",
        SessionState::Won => "YOU WON! ALL LEVELS CLEARED, r to restart",
        SessionState::Exited => "bye",
    };
    let status = format!(
        "Score: {}  Lives: {}  Level: {}  Food: {}  {}",
        snapshot.score,
        snapshot.lives,
        snapshot.level,
        snapshot.arena.food.len(),
        hint
    );
    let mut frame = Frame::new(grid.cols(), grid.rows(), status);
    for (cell, tile) in grid.cells() {
        if tile == Tile::Wall {
            frame.set(cell.col, cell.row, Glyph::Wall);
        }
    }
    for food in &snapshot.arena.food {
        frame.set(food.col, food.row, Glyph::Food);
    }
    for ghost in &snapshot.arena.ghosts {
        let glyph = match ghost.mode {
            GhostMode::Chase => Glyph::Chaser,
            GhostMode::Scatter => Glyph::Scatterer,
        };
        frame.set(ghost.actor.cell.col, ghost.actor.cell.row, glyph);
    }
    let player = snapshot.arena.player.cell;
    frame.set(player.col, player.row, Glyph::Player);
    frame
}

/// The snake field has no walls of its own; the frame draws a border around it.
pub fn snake_frame<R: Rng>(game: &SnakeGame<R>) -> Frame {
    let field = game.field();
    let hint = if game.is_over() {
        "GAME OVER, r to restart"
    } else {
        "q to quit"
    };
    let status = format!(
        "Score: {}  Best: {}  Length: {}  {}",
        game.score(),
        game.high_score(),
        game.snake().len(),
        hint
    );
    let (width, height) = (field.cols() + 2, field.rows() + 2);
    let mut frame = Frame::new(width, height, status);
    for x in 0..width as i32 {
        frame.set(x, 0, Glyph::Wall);
        frame.set(x, height as i32 - 1, Glyph::Wall);
    }
    for y in 0..height as i32 {
        frame.set(0, y, Glyph::Wall);
        frame.set(width as i32 - 1, y, Glyph::Wall);
    }
    let shifted = |cell: Cell| (cell.col + 1, cell.row + 1);
    if let Some(food) = game.food() {
        let (x, y) = shifted(food);
        frame.set(x, y, Glyph::Apple);
    }
    for (index, segment) in game.snake().segments().enumerate() {
        let (x, y) = shifted(segment);
        let glyph = if index == 0 {
            Glyph::SnakeHead
        } else {
            Glyph::SnakeBody
        };
        frame.set(x, y, glyph);
    }
    frame
}

/// Redraws only the glyphs that changed since the last frame.
struct Renderer {
    last: Vec<Glyph>,
    last_status: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    fn new() -> Self {
        Self {
            last: Vec::new(),
            last_status: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    fn draw(&mut self, stdout: &mut Stdout, frame: &Frame) -> io::Result<()> {
        let needed_h = (frame.height + 2) as u16;
        let needed_w = (frame.width * CELL_W) as u16;

        stdout.queue(MoveTo(0, 0))?;

        let (term_w, term_h) = terminal::size()?;
        if term_w < needed_w || term_h < needed_h {
            stdout.queue(Clear(ClearType::All))?;
            let msg = format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            );
            stdout.queue(Print(msg))?;
            stdout.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.last.len() != frame.glyphs.len() {
            self.last = vec![Glyph::Empty; frame.glyphs.len()];
            stdout.queue(Clear(ClearType::All))?;
            self.needs_full = true;
        }

        if self.needs_full || frame.status != self.last_status {
            stdout.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            stdout.queue(SetForegroundColor(Color::White))?;
            stdout.queue(Clear(ClearType::CurrentLine))?;
            stdout.queue(Print(&frame.status))?;
            stdout.queue(ResetColor)?;
            self.last_status.clone_from(&frame.status);
        }

        for y in 0..frame.height {
            for x in 0..frame.width {
                let idx = y * frame.width + x;
                let glyph = frame.glyphs[idx];
                if self.needs_full || glyph != self.last[idx] {
                    self.last[idx] = glyph;
                    self.draw_glyph(stdout, x, y, glyph)?;
                }
            }
        }
        self.needs_full = false;

        stdout.flush()
    }

    fn draw_glyph(&self, stdout: &mut Stdout, x: usize, y: usize, glyph: Glyph) -> io::Result<()> {
        let (text, color) = glyph.style();
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        stdout.queue(MoveTo(x_pos, y_pos))?;
        stdout.queue(SetForegroundColor(color))?;
        stdout.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        if w < CELL_W {
            for _ in 0..(CELL_W - w) {
                stdout.queue(Print(' '))?;
            }
        }
        stdout.queue(ResetColor)?;
        Ok(())
    }
}

/// Runs `play` on the alternate screen in raw mode and restores the terminal
/// afterwards, even when `play` fails.
pub fn with_terminal<T>(play: impl FnOnce(&mut Stdout) -> Result<T>) -> Result<T> {
    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = play(&mut stdout);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

/// Drains pending key presses without blocking.
fn pending_actions() -> io::Result<Vec<Action>> {
    let mut actions = Vec::new();
    while event::poll(Duration::from_millis(0))? {
        if let Event::Key(key) = event::read()? {
            if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                actions.extend(action_for(key.code));
            }
        }
    }
    Ok(actions)
}

fn sleep_rest_of_frame(frame_start: Instant) {
    let frame_time = Duration::from_micros(1_000_000 / RENDER_FPS);
    let elapsed = frame_start.elapsed();
    if elapsed < frame_time {
        thread::sleep(frame_time - elapsed);
    }
}

pub fn play_session<A: Arena, R: Rng>(
    stdout: &mut Stdout,
    session: &mut Session<A, R>,
) -> Result<()> {
    let tick_time = Duration::from_micros(1_000_000 / u64::from(session.config().rules.tick_rate));
    let mut renderer = Renderer::new();
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        for action in pending_actions()? {
            match action {
                Action::Turn(dir) => session.request_direction(dir),
                Action::Start => {
                    session.command(SessionCommand::Start)?;
                }
                Action::Continue => {
                    session.command(SessionCommand::Continue)?;
                }
                Action::Restart => {
                    if !session.command(SessionCommand::Restart)? {
                        session.command(SessionCommand::Continue)?;
                    }
                }
                Action::Quit => {
                    session.command(SessionCommand::Quit)?;
                }
            }
        }
        if session.state() == SessionState::Exited {
            return Ok(());
        }

        if last_tick.elapsed() >= tick_time {
            last_tick = Instant::now();
            session.tick();
        }
        renderer.draw(stdout, &session_frame(&session.snapshot(), session.grid()))?;
        sleep_rest_of_frame(frame_start);
    }
}

pub fn play_snake<R: Rng>(
    stdout: &mut Stdout,
    game: &mut SnakeGame<R>,
    scores: &HighScoreFile,
) -> Result<()> {
    let mut renderer = Renderer::new();
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();
        for action in pending_actions()? {
            match action {
                Action::Turn(dir) => game.turn(dir),
                Action::Restart if game.is_over() => game.restart(),
                Action::Quit => return Ok(()),
                _ => {}
            }
        }

        let tick_time = Duration::from_micros(1_000_000 / u64::from(game.ticks_per_second()));
        if last_tick.elapsed() >= tick_time {
            last_tick = Instant::now();
            if let Some(SnakeEvent::GameOver {
                score,
                new_high_score: true,
            }) = game.tick()
            {
                if scores.record(score) {
                    info!(score, path = %scores.path().display(), "new high score saved");
                }
            }
        }
        renderer.draw(stdout, &snake_frame(game))?;
        sleep_rest_of_frame(frame_start);
    }
}
