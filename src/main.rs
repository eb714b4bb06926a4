mod terminal;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use maze_chase::config::GameConfig;
use maze_chase::engine::{Arena, PixelArena, TileArena};
use maze_chase::highscore::HighScoreFile;
use maze_chase::level::{maps, LevelLayout};
use maze_chase::session::Session;
use maze_chase::snake::SnakeGame;

/// Maze chase and snake in the terminal
#[derive(Parser)]
#[command(name = "maze-chase")]
#[command(version, long_about = None)]
struct Cli {
    /// TOML file overriding the preset tuning
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seed for every random choice, for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Where log output goes while the terminal is in raw mode
    #[arg(long, global = true, default_value = "maze-chase.log")]
    log_file: PathBuf,

    #[command(subcommand)]
    game: Option<Game>,
}

#[derive(Subcommand)]
enum Game {
    /// Whole-cell movement on the classic maze (default)
    Tile,
    /// Pixel movement on the symbolic mazes
    Pixel,
    /// Snake with a persisted high score
    Snake {
        #[arg(long, default_value = "highscore.txt")]
        high_score_file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_file)?;

    let rng = match cli.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    tracing::info!(seed = ?cli.seed, "starting");

    match cli.game.unwrap_or(Game::Tile) {
        Game::Tile => {
            let config = load_config(cli.config.as_deref(), GameConfig::tile())?;
            play::<TileArena>(config, maps::classic_levels()?, rng)
        }
        Game::Pixel => {
            let config = load_config(cli.config.as_deref(), GameConfig::pixel())?;
            play::<PixelArena>(config, maps::symbolic_levels()?, rng)
        }
        Game::Snake { high_score_file } => {
            let config = load_config(cli.config.as_deref(), GameConfig::tile())?;
            let scores = HighScoreFile::new(high_score_file);
            let mut game = SnakeGame::new(&config, scores.load(), rng)?;
            terminal::with_terminal(|stdout| terminal::play_snake(stdout, &mut game, &scores))
        }
    }
}

fn play<A: Arena>(config: GameConfig, levels: Vec<LevelLayout>, rng: ChaCha8Rng) -> Result<()> {
    let mut session = Session::<A, _>::new(config, levels, rng)?;
    terminal::with_terminal(|stdout| terminal::play_session(stdout, &mut session))?;
    let board = session.scoreboard();
    println!("Final score: {} (level {})", board.score, session.level());
    Ok(())
}

/// A config file overrides the keys it names; the rest comes from the preset.
fn load_config(path: Option<&Path>, preset: GameConfig) -> Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load_over(path, &preset)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(preset),
    }
}

fn setup_logging(log_file: &Path) -> Result<()> {
    let dir = match log_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = log_file
        .file_name()
        .context("log file path has no file name")?;
    std::fs::create_dir_all(dir)?;

    let file_appender = tracing_appender::rolling::never(dir, name);
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    // The terminal is in raw mode while playing, so logs only go to the file.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    // Keep the writer alive for the whole process.
    std::mem::forget(guard);
    Ok(())
}
