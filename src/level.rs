//! Maze definition: cell grid, tunnel rows, spawn markers and the
//! reachability checks a layout has to pass before a game can use it.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use crate::components::{Dir, PelletKind, Personality, Pos};
use crate::error::MazeError;

/// Layout of the built-in maze, 28 x 31.
pub const REFERENCE_LAYOUT: [&str; 31] = [
    "############################",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#o####.#####.##.#####.####o#",
    "#.####.#####.##.#####.####.#",
    "#..........................#",
    "#.####.##.########.##.####.#",
    "#.####.##.########.##.####.#",
    "#......##....##....##......#",
    "######.##### ## #####.######",
    "######.##    XA    ##.######",
    "######.## ###=#### ##.######",
    "######.## #c_b_d_# ##.######",
    "######.## ######## ##.######",
    "T     .              .     T",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "######.##          ##.######",
    "######.## ######## ##.######",
    "######.## ######## ##.######",
    "#............##............#",
    "#.####.#####.##.#####.####.#",
    "#.####.#####.##.#####.####.#",
    "#o..##.......P .......##..o#",
    "###.##.##.########.##.##.###",
    "###.##.##.########.##.##.###",
    "#......##....##....##......#",
    "#.##########.##.##########.#",
    "#.##########.##.##########.#",
    "#..........................#",
    "############################",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellType {
    Wall,
    Path,
    PowerPellet,
    GhostPen,
    Tunnel,
}

#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<CellType>,
    tunnel_rows: Vec<i32>,
}

impl Grid {
    pub fn width(&self) -> i32 {
        self.width as i32
    }

    pub fn height(&self) -> i32 {
        self.height as i32
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width() && pos.y < self.height()
    }

    pub fn is_tunnel_row(&self, y: i32) -> bool {
        self.tunnel_rows.contains(&y)
    }

    /// Brings an x that ran off either side of a tunnel row back onto the grid.
    pub fn wrap(&self, pos: Pos) -> Pos {
        if self.is_tunnel_row(pos.y) {
            Pos::new(pos.x.rem_euclid(self.width()), pos.y)
        } else {
            pos
        }
    }

    pub fn clamp(&self, pos: Pos) -> Pos {
        Pos::new(
            pos.x.clamp(0, self.width() - 1),
            pos.y.clamp(0, self.height() - 1),
        )
    }

    pub fn cell_type(&self, pos: Pos) -> CellType {
        let pos = self.wrap(pos);
        if !self.in_bounds(pos) {
            return CellType::Wall;
        }
        self.cells[pos.y as usize * self.width + pos.x as usize]
    }

    /// Player movement and normal ghost navigation.
    pub fn is_legal_move(&self, pos: Pos) -> bool {
        if self.is_tunnel_row(pos.y) {
            return true;
        }
        !matches!(self.cell_type(pos), CellType::Wall | CellType::GhostPen)
    }

    /// Like [`Grid::is_legal_move`] but lets a ghost walk through the pen.
    pub fn is_legal_for_ghost_in_pen(&self, pos: Pos) -> bool {
        self.is_tunnel_row(pos.y) || self.cell_type(pos) != CellType::Wall
    }

    pub fn is_pen(&self, pos: Pos) -> bool {
        !self.is_tunnel_row(pos.y) && self.cell_type(pos) == CellType::GhostPen
    }

    /// Open cells where a fruit may appear.
    pub fn path_cells(&self) -> Vec<Pos> {
        let mut cells = Vec::new();
        for y in 0..self.height() {
            for x in 0..self.width() {
                let pos = Pos::new(x, y);
                if matches!(self.cell_type(pos), CellType::Path | CellType::PowerPellet) {
                    cells.push(pos);
                }
            }
        }
        cells
    }

    /// Scatter target of each personality, one per inner corner.
    pub fn home_corner(&self, personality: Personality) -> Pos {
        let right = self.width() - 2;
        let bottom = self.height() - 2;
        match personality {
            Personality::Aggressive => Pos::new(right, 1),
            Personality::Ambusher => Pos::new(1, 1),
            Personality::Flanker => Pos::new(right, bottom),
            Personality::Shy => Pos::new(1, bottom),
        }
    }

    fn flood(&self, start: Pos) -> Vec<Vec<bool>> {
        let mut seen = vec![vec![false; self.width]; self.height];
        let mut q = VecDeque::new();
        seen[start.y as usize][start.x as usize] = true;
        q.push_back(start);
        while let Some(pos) = q.pop_front() {
            for dir in Dir::ORDER {
                let next = pos.step(dir);
                if !self.is_legal_move(next) {
                    continue;
                }
                let next = self.wrap(next);
                if !self.in_bounds(next) || seen[next.y as usize][next.x as usize] {
                    continue;
                }
                seen[next.y as usize][next.x as usize] = true;
                q.push_back(next);
            }
        }
        seen
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GhostSpawn {
    pub personality: Personality,
    pub pos: Pos,
    pub in_pen: bool,
}

impl GhostSpawn {
    pub fn facing(&self) -> Dir {
        if self.in_pen {
            Dir::Up
        } else {
            Dir::Left
        }
    }
}

#[derive(Clone, Debug)]
pub struct Maze {
    pub grid: Grid,
    pub player_start: Pos,
    pub pen_exit: Option<Pos>,
    pub ghost_spawns: Vec<GhostSpawn>,
    pub pellets: Vec<(Pos, PelletKind)>,
}

impl Maze {
    /// The built-in maze.
    pub fn reference() -> Maze {
        Maze::from_rows(&REFERENCE_LAYOUT).expect("reference maze is valid")
    }

    pub fn load(path: &Path) -> Result<Maze, MazeError> {
        let text = fs::read_to_string(path).map_err(|source| MazeError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let maze = Maze::parse(&text)?;
        maze.validate()?;
        Ok(maze)
    }

    pub fn parse(text: &str) -> Result<Maze, MazeError> {
        let rows: Vec<&str> = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .filter(|l| !l.is_empty())
            .collect();
        Maze::from_rows(&rows)
    }

    pub fn from_rows(rows: &[&str]) -> Result<Maze, MazeError> {
        let height = rows.len();
        let width = rows.first().map(|r| r.chars().count()).unwrap_or(0);
        if height == 0 || width == 0 {
            return Err(MazeError::Empty);
        }

        let mut cells = Vec::with_capacity(width * height);
        let mut tunnel_rows = Vec::new();
        let mut player_start = None;
        let mut pen_exit = None;
        let mut ghost_spawns: Vec<GhostSpawn> = Vec::new();
        let mut pellets = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(MazeError::Ragged {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let pos = Pos::new(x as i32, y as i32);
                let cell = match ch {
                    '#' => CellType::Wall,
                    ' ' => CellType::Path,
                    '.' => {
                        pellets.push((pos, PelletKind::Normal));
                        CellType::Path
                    }
                    'o' => {
                        pellets.push((pos, PelletKind::Power));
                        CellType::PowerPellet
                    }
                    'T' => {
                        if !tunnel_rows.contains(&pos.y) {
                            tunnel_rows.push(pos.y);
                        }
                        CellType::Tunnel
                    }
                    '=' | '_' => CellType::GhostPen,
                    'P' => {
                        if player_start.replace(pos).is_some() {
                            return Err(MazeError::DuplicateMarker(ch));
                        }
                        CellType::Path
                    }
                    'X' => {
                        if pen_exit.replace(pos).is_some() {
                            return Err(MazeError::DuplicateMarker(ch));
                        }
                        CellType::Path
                    }
                    'A'..='D' | 'a'..='d' => {
                        let personality = Personality::from_marker(ch)
                            .ok_or(MazeError::UnknownCell { ch, x, y })?;
                        if ghost_spawns.iter().any(|g| g.personality == personality) {
                            return Err(MazeError::DuplicateMarker(ch));
                        }
                        let in_pen = ch.is_ascii_lowercase();
                        ghost_spawns.push(GhostSpawn {
                            personality,
                            pos,
                            in_pen,
                        });
                        if in_pen {
                            CellType::GhostPen
                        } else {
                            CellType::Path
                        }
                    }
                    _ => return Err(MazeError::UnknownCell { ch, x, y }),
                };
                cells.push(cell);
            }
        }

        let player_start = player_start.ok_or(MazeError::MissingPlayerStart)?;
        ghost_spawns.sort_by_key(|g| g.personality.index());

        Ok(Maze {
            grid: Grid {
                width,
                height,
                cells,
                tunnel_rows,
            },
            player_start,
            pen_exit,
            ghost_spawns,
            pellets,
        })
    }

    /// Every open cell must be reachable from the player start, and the pen
    /// may only open onto the pen exit.
    pub fn validate(&self) -> Result<(), MazeError> {
        let grid = &self.grid;
        let reachable = grid.flood(self.player_start);
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let pos = Pos::new(x, y);
                match grid.cell_type(pos) {
                    CellType::Wall => {}
                    CellType::GhostPen => {
                        for dir in Dir::ORDER {
                            let next = pos.step(dir);
                            if !grid.in_bounds(next) || grid.is_pen(next) {
                                continue;
                            }
                            if grid.cell_type(next) != CellType::Wall
                                && Some(next) != self.pen_exit
                            {
                                return Err(MazeError::PenLeak { x, y });
                            }
                        }
                    }
                    _ => {
                        if !reachable[y as usize][x as usize] {
                            return Err(MazeError::Unreachable { x, y });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Cell an eaten ghost reappears on: its own pen spawn, or the first pen
    /// spawn in the maze for ghosts that start outside.
    pub fn respawn_for(&self, spawn: &GhostSpawn) -> Pos {
        if spawn.in_pen {
            return spawn.pos;
        }
        self.ghost_spawns
            .iter()
            .find(|g| g.in_pen)
            .map(|g| g.pos)
            .unwrap_or(spawn.pos)
    }

    pub fn count_pellets(&self) -> usize {
        self.pellets.len()
    }
}
