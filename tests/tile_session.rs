use maze_chase::collision::Verdict;
use maze_chase::components::{Cell, Direction};
use maze_chase::config::GameConfig;
use maze_chase::engine::{Arena, TileArena};
use maze_chase::level::{maps, LevelLayout};
use maze_chase::session::{Session, SessionCommand, SessionState};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn start(config: GameConfig, layout: LevelLayout) -> Session<TileArena, ChaCha8Rng> {
    let mut session = Session::new(config, vec![layout], ChaCha8Rng::seed_from_u64(42)).unwrap();
    assert!(session.command(SessionCommand::Start).unwrap());
    session
}

/// Config with parked ghosts and no extra spawns.
fn parked_ghosts() -> GameConfig {
    let mut config = GameConfig::tile();
    config.ghosts.speed = 0.0;
    config.ghosts.speed_per_level = 0.0;
    config.ghosts.spawn_window = None;
    config
}

/// Corridor with the player at (1,1) and two ghosts parked on (2,1).
fn ambush() -> LevelLayout {
    LevelLayout {
        ghost_spawns: vec![Cell::new(2, 1)],
        ..LevelLayout::parse(&["WWWWWW", "WPSFFW", "WWWWWW"]).unwrap()
    }
}

#[test]
fn food_under_the_player_scores_once() {
    let mut layout = LevelLayout::parse(&["WWW", "WPW", "WWW"]).unwrap();
    layout.food = vec![Cell::new(1, 1)];
    let mut session = start(GameConfig::tile(), layout);

    assert_eq!(session.tick(), Some(Verdict::LevelComplete));
    assert_eq!(session.scoreboard().score, 10);
    assert_eq!(session.arena().food_remaining(), 0);
}

#[test]
fn shared_cell_costs_one_life() {
    let mut session = start(parked_ghosts(), ambush());
    assert_eq!(session.arena().ghost_cells().count(), 2);
    session.request_direction(Direction::Right);

    assert_eq!(session.tick(), Some(Verdict::Continue));
    assert_eq!(session.tick(), Some(Verdict::LifeLost { lives_left: 2 }));
    assert_eq!(session.scoreboard().lives, 2);

    // Hard reset of positions and motion state.
    let arena = session.arena();
    assert_eq!(arena.player_cell(), Cell::new(1, 1));
    assert_eq!(arena.player_direction(), Direction::None);
    assert!(arena.ghost_cells().all(|cell| cell == Cell::new(2, 1)));
    assert_eq!(session.state(), SessionState::Playing);
}

#[test]
fn game_over_freezes_the_board() {
    let mut config = parked_ghosts();
    config.rules.starting_lives = 1;
    let mut session = start(config, ambush());
    session.request_direction(Direction::Right);
    session.tick();
    assert_eq!(session.tick(), Some(Verdict::GameOver));
    assert_eq!(session.state(), SessionState::GameOver);

    let frozen = session.snapshot();
    session.request_direction(Direction::Left);
    for _ in 0..20 {
        assert_eq!(session.tick(), None);
    }
    assert_eq!(session.snapshot(), frozen);
    assert!(!session.command(SessionCommand::Continue).unwrap());

    assert!(session.command(SessionCommand::Restart).unwrap());
    assert_eq!(session.state(), SessionState::Playing);
    assert_eq!(session.scoreboard().lives, 1);
    assert_eq!(session.scoreboard().score, 0);
    assert_eq!(session.level(), 1);
    assert_eq!(session.arena().food_remaining(), 2);
}

#[test]
fn empty_food_never_completes() {
    let layout = LevelLayout::parse(&["WWWWW", "WPSSW", "WSSSW", "WWWWW"]).unwrap();
    let mut session = start(parked_ghosts(), layout);
    let moves = [Direction::Right, Direction::Down, Direction::Left, Direction::Up];
    for tick in 0..200 {
        session.request_direction(moves[(tick / 7) % moves.len()]);
        assert_eq!(session.tick(), Some(Verdict::Continue));
    }
    assert_eq!(session.state(), SessionState::Playing);
}

#[test]
fn later_levels_are_harder() {
    let levels = maps::classic_levels().unwrap();
    let food = levels[0].food_count();
    let mut config = GameConfig::tile();
    config.ghosts.spawn_window = None;
    let mut session = Session::<TileArena, _>::new(config, levels, ChaCha8Rng::seed_from_u64(7)).unwrap();
    assert_eq!(session.state(), SessionState::Menu);
    assert_eq!(session.arena().initial_food(), food);
    assert_eq!(session.arena().ghost_cells().count(), 2);
    assert!(session
        .arena()
        .ghost_cells()
        .all(|cell| cell == maps::CLASSIC_GHOST_SPAWN));
    assert_eq!(session.grid().cols(), 40);
    assert_eq!(session.grid().rows(), 20);
    assert!(session
        .arena()
        .food()
        .iter()
        .all(|cell| *cell != maps::CLASSIC_PLAYER_SPAWN && *cell != maps::CLASSIC_GHOST_SPAWN));

    let harder = TileArena::load(&maps::classic_levels().unwrap()[0], session.config(), 3).unwrap();
    assert_eq!(harder.ghost_cells().count(), 4);
    session.command(SessionCommand::Quit).unwrap();
    assert_eq!(session.state(), SessionState::Exited);
}
