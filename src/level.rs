use crate::components::Cell;
use crate::error::MapError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Open,
}

/// Static occupancy of one level. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Builds a grid from a dense array of cell kinds, `1` for wall and `0`
    /// for open. The outer ring must be walls.
    pub fn from_kinds<R: AsRef<[u8]>>(kinds: &[R]) -> Result<Grid, MapError> {
        let rows = kinds.len();
        let cols = kinds.first().map(|row| row.as_ref().len()).unwrap_or(0);
        if rows == 0 || cols == 0 {
            return Err(MapError::Empty);
        }

        let mut tiles = Vec::with_capacity(cols * rows);
        for (y, row) in kinds.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(MapError::RaggedRows {
                    row: y,
                    expected: cols,
                    found: row.len(),
                });
            }
            for (x, kind) in row.iter().enumerate() {
                tiles.push(match kind {
                    0 => Tile::Open,
                    1 => Tile::Wall,
                    other => {
                        return Err(MapError::UnknownKind {
                            kind: *other,
                            col: x,
                            row: y,
                        })
                    }
                });
            }
        }

        let grid = Grid { cols, rows, tiles };
        grid.check_sealed()?;
        Ok(grid)
    }

    /// An all-open field with no walls; the grid bound is the only edge.
    pub fn open_field(cols: usize, rows: usize) -> Grid {
        Grid {
            cols,
            rows,
            tiles: vec![Tile::Open; cols * rows],
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn tile(&self, cell: Cell) -> Option<Tile> {
        self.index(cell).map(|idx| self.tiles[idx])
    }

    /// Out-of-bounds cells count as blocked.
    pub fn is_open(&self, cell: Cell) -> bool {
        self.tile(cell) == Some(Tile::Open)
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.index(cell).is_some()
    }

    pub fn cells(&self) -> impl Iterator<Item = (Cell, Tile)> + '_ {
        self.tiles.iter().enumerate().map(move |(idx, tile)| {
            let cell = Cell::new((idx % self.cols) as i32, (idx / self.cols) as i32);
            (cell, *tile)
        })
    }

    pub fn walls(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells()
            .filter(|(_, tile)| *tile == Tile::Wall)
            .map(|(cell, _)| cell)
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.col < 0 || cell.row < 0 {
            return None;
        }
        let (x, y) = (cell.col as usize, cell.row as usize);
        if x >= self.cols || y >= self.rows {
            return None;
        }
        Some(y * self.cols + x)
    }

    fn check_sealed(&self) -> Result<(), MapError> {
        for (cell, tile) in self.cells() {
            let x = cell.col as usize;
            let y = cell.row as usize;
            let border = x == 0 || y == 0 || x == self.cols - 1 || y == self.rows - 1;
            if border && tile != Tile::Wall {
                return Err(MapError::UnsealedBorder(cell));
            }
        }
        Ok(())
    }
}

/// Everything needed to (re)build a level: the grid, where food goes and
/// where actors start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelLayout {
    pub grid: Grid,
    pub food: Vec<Cell>,
    pub player_spawn: Cell,
    pub ghost_spawns: Vec<Cell>,
}

impl LevelLayout {
    /// Parses a symbolic map: `W` wall, `F` food, `S` or space empty floor,
    /// `P` player spawn, `G` ghost spawn.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<LevelLayout, MapError> {
        let height = rows.len();
        let width = rows.first().map(|row| row.as_ref().chars().count()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MapError::Empty);
        }

        let mut tiles = Vec::with_capacity(width * height);
        let mut food = Vec::new();
        let mut player_spawn = None;
        let mut ghost_spawns = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(MapError::RaggedRows {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let cell = Cell::new(x as i32, y as i32);
                let tile = match glyph {
                    'W' => Tile::Wall,
                    'F' => {
                        food.push(cell);
                        Tile::Open
                    }
                    'S' | ' ' => Tile::Open,
                    'P' => {
                        if player_spawn.is_some() {
                            return Err(MapError::DuplicatePlayerSpawn(cell));
                        }
                        player_spawn = Some(cell);
                        Tile::Open
                    }
                    'G' => {
                        ghost_spawns.push(cell);
                        Tile::Open
                    }
                    other => {
                        return Err(MapError::UnknownGlyph {
                            glyph: other,
                            col: x,
                            row: y,
                        })
                    }
                };
                tiles.push(tile);
            }
        }

        let player_spawn = player_spawn.ok_or(MapError::MissingPlayerSpawn)?;
        Ok(LevelLayout {
            grid: Grid {
                cols: width,
                rows: height,
                tiles,
            },
            food,
            player_spawn,
            ghost_spawns,
        })
    }

    /// Wraps a dense grid, putting food on every open cell that is not a spawn.
    pub fn from_grid(
        grid: Grid,
        player_spawn: Cell,
        ghost_spawns: Vec<Cell>,
    ) -> Result<LevelLayout, MapError> {
        for spawn in std::iter::once(&player_spawn).chain(ghost_spawns.iter()) {
            if !grid.is_open(*spawn) {
                return Err(MapError::SpawnOnWall(*spawn));
            }
        }
        let food = grid
            .cells()
            .filter(|(cell, tile)| {
                *tile == Tile::Open && *cell != player_spawn && !ghost_spawns.contains(cell)
            })
            .map(|(cell, _)| cell)
            .collect();
        Ok(LevelLayout {
            grid,
            food,
            player_spawn,
            ghost_spawns,
        })
    }

    pub fn food_count(&self) -> usize {
        self.food.len()
    }
}

pub mod maps {
    use super::{Grid, LevelLayout};
    use crate::components::Cell;
    use crate::error::MapError;

    #[rustfmt::skip]
    pub const CLASSIC_MAZE: [[u8; 40]; 20] = [
        [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
        [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1,1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
        [1,0,1,1,1,1,0,1,1,1,1,1,1,1,1,0,1,1,0,1,1,0,1,1,1,1,1,1,1,0,1,1,1,1,0,1,1,1,0,1],
        [1,0,1,1,1,1,0,1,1,1,1,1,1,1,1,0,1,1,0,1,1,0,1,1,1,1,1,1,1,0,1,1,1,1,0,1,1,1,0,1],
        [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
        [1,0,1,1,1,1,0,1,1,0,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,0,1,1,0,1,1,1,1,0,1,1,1,0,1],
        [1,0,0,0,0,0,0,1,1,0,0,0,0,0,0,0,0,0,0,1,1,0,0,0,0,0,0,1,1,0,0,0,0,0,0,0,0,0,0,1],
        [1,1,1,1,1,1,0,1,1,1,1,1,1,1,1,0,1,1,0,1,1,0,1,1,1,1,1,1,1,0,1,1,1,1,0,1,1,1,1,1],
        [1,1,1,1,1,1,0,1,1,0,0,0,0,0,0,0,1,1,0,0,0,0,1,1,0,0,0,0,0,0,1,1,1,1,0,1,1,1,1,1],
        [1,1,1,1,1,1,0,1,1,0,1,1,1,1,1,0,1,1,0,1,1,0,1,1,0,1,1,1,1,0,1,1,1,1,0,1,1,1,1,1],
        [1,0,0,0,0,0,0,0,0,0,1,1,1,1,1,0,0,0,0,1,1,0,0,0,0,1,1,1,1,0,0,0,0,0,0,0,0,0,0,1],
        [1,0,1,1,1,1,0,1,1,0,1,1,1,1,1,0,1,1,0,1,1,0,1,1,0,1,1,1,1,0,1,1,1,1,0,1,1,1,0,1],
        [1,0,0,0,0,0,0,1,1,0,0,0,0,0,0,0,1,1,0,0,0,0,1,1,0,0,0,0,0,0,1,1,1,1,0,1,1,1,0,1],
        [1,1,1,1,1,1,0,1,1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,0,1,1,1,1,1],
        [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
        [1,0,1,1,1,1,0,1,1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,0,1,1,1,0,1],
        [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
        [1,0,1,1,1,1,0,1,1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,1,1,1,0,1,1,1,1,1,1,1,0,1,1,1,0,1],
        [1,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,1],
        [1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1],
    ];

    pub const CLASSIC_PLAYER_SPAWN: Cell = Cell::new(1, 1);
    // The geometric center (20, 10) is a wall; the ghosts start one cell east.
    pub const CLASSIC_GHOST_SPAWN: Cell = Cell::new(21, 10);

    pub const SYMBOLIC_LEVELS: [&[&str]; 3] = [
        &[
            "WWWWWWWWWWWWWWWWWWWWW",
            "WFFFFFFFFFWFFFFFFFFFW",
            "WFWWWFWWWFWFWWWFWWWFW",
            "WFFFFFFFFFFFFFFFFFFFW",
            "WFWWWFWFWWSWWFWFWWWFW",
            "WFFFFFWFWGSGWFWFFFFFW",
            "WWWWWFWFWWWWWFWFWWWWW",
            "WFFFFFFFFFFFFFFFFFFFW",
            "WFWWWFWWWFWFWWWFWWWFW",
            "WFFFFFFFFFPFFFFFFFFFW",
            "WWWWWWWWWWWWWWWWWWWWW",
        ],
        &[
            "WWWWWWWWWWWWWWWWWWWWW",
            "WFFFFFFFFFFFFFFFFFFFW",
            "WFWFWWWFWWWWWFWWWFWFW",
            "WFWFFFFFFFSFFFFFFFWFW",
            "WFWWWFWWWWSWWWWFWWWFW",
            "WFFFFFWGSSGSSGWFFFFFW",
            "WFWWWFWWWWWWWWWFWWWFW",
            "WFWFFFFFFFFFFFFFFFWFW",
            "WFWFWWWFWWWWWFWWWFWFW",
            "WFFFFFFFFFPFFFFFFFFFW",
            "WWWWWWWWWWWWWWWWWWWWW",
        ],
        &[
            "WWWWWWWWWWWWWWWWWWWWW",
            "WFFFFFFFFWWWFFFFFFFFW",
            "WFWWWWWFFFFFFFWWWWWFW",
            "WFWFFFWFWWSWWFWFFFWFW",
            "WFFFWFFFWGSGWFFFWFFFW",
            "WWWFWFWFWWWWWFWFWFWWW",
            "WFFFFFWFFFFFFFWFFFFFW",
            "WFWWWFWWWFWFWWWFWWWFW",
            "WFFFWFFFFFWFFFFFWFFFW",
            "WFWFFFWWWFPFWWWFFFWFW",
            "WFWWWFFFFFWFFFFFWWWFW",
            "WFFFFFWWWFFFWWWFFFFFW",
            "WWWWWWWWWWWWWWWWWWWWW",
        ],
    ];

    /// The single dense maze the tile engine cycles through.
    pub fn classic_levels() -> Result<Vec<LevelLayout>, MapError> {
        let grid = Grid::from_kinds(&CLASSIC_MAZE)?;
        let layout = LevelLayout::from_grid(grid, CLASSIC_PLAYER_SPAWN, vec![CLASSIC_GHOST_SPAWN])?;
        Ok(vec![layout])
    }

    pub fn symbolic_levels() -> Result<Vec<LevelLayout>, MapError> {
        SYMBOLIC_LEVELS
            .iter()
            .map(|rows| LevelLayout::parse(*rows))
            .collect()
    }
}
