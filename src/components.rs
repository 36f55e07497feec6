use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Pos {
    pub x: i32,
    pub y: i32,
}

impl Pos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Dir) -> Pos {
        self.offset(dir, 1)
    }

    pub fn offset(self, dir: Dir, cells: i32) -> Pos {
        let (dx, dy) = dir.delta();
        Pos {
            x: self.x + dx * cells,
            y: self.y + dy * cells,
        }
    }

    pub fn manhattan(self, other: Pos) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn euclidean(self, other: Pos) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    /// Evaluation order used when breaking distance ties.
    pub const ORDER: [Dir; 4] = [Dir::Left, Dir::Right, Dir::Up, Dir::Down];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PelletKind {
    Normal,
    Power,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    pub pos: Pos,
    pub dir: Dir,
}

impl Player {
    pub fn new(pos: Pos) -> Self {
        Self { pos, dir: Dir::Left }
    }
}

/// Targeting strategy of a ghost. The layout letters `A`..`D` select one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Personality {
    Aggressive,
    Ambusher,
    Flanker,
    Shy,
}

impl Personality {
    pub const ALL: [Personality; 4] = [
        Personality::Aggressive,
        Personality::Ambusher,
        Personality::Flanker,
        Personality::Shy,
    ];

    pub fn index(self) -> usize {
        match self {
            Personality::Aggressive => 0,
            Personality::Ambusher => 1,
            Personality::Flanker => 2,
            Personality::Shy => 3,
        }
    }

    pub fn from_marker(ch: char) -> Option<Personality> {
        match ch.to_ascii_uppercase() {
            'A' => Some(Personality::Aggressive),
            'B' => Some(Personality::Ambusher),
            'C' => Some(Personality::Flanker),
            'D' => Some(Personality::Shy),
            _ => None,
        }
    }

    pub fn base_speed(self) -> f32 {
        match self {
            Personality::Aggressive => 0.80,
            Personality::Ambusher => 0.75,
            Personality::Flanker => 0.70,
            Personality::Shy => 0.65,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GhostMode {
    Chase,
    Scatter,
    Frightened,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ghost {
    pub personality: Personality,
    pub pos: Pos,
    pub dir: Dir,
    pub mode: GhostMode,
    pub eaten: bool,
    /// Probability of moving on each movement opportunity.
    pub speed: f32,
    pub previous: Option<Pos>,
    pub spawn: Pos,
    pub spawn_dir: Dir,
    /// Where the ghost reappears after being eaten.
    pub respawn: Pos,
    /// Play tick at which a ghost waiting in the pen may start walking out.
    pub release_at: u64,
}

impl Ghost {
    pub fn new(personality: Personality, spawn: Pos, spawn_dir: Dir, respawn: Pos) -> Self {
        Self {
            personality,
            pos: spawn,
            dir: spawn_dir,
            mode: GhostMode::Scatter,
            eaten: false,
            speed: personality.base_speed(),
            previous: None,
            spawn,
            spawn_dir,
            respawn,
            release_at: 0,
        }
    }

    pub fn reset_to_spawn(&mut self, mode: GhostMode, release_at: u64) {
        self.pos = self.spawn;
        self.dir = self.spawn_dir;
        self.mode = mode;
        self.eaten = false;
        self.previous = None;
        self.release_at = release_at;
    }

    pub fn is_frightened(&self) -> bool {
        self.mode == GhostMode::Frightened && !self.eaten
    }

    /// Turns the ghost around on the spot: the cell it was heading into
    /// becomes the one it may not enter next.
    pub fn reverse(&mut self, ahead: Pos) {
        self.dir = self.dir.opposite();
        self.previous = Some(ahead);
    }

    pub fn move_to(&mut self, pos: Pos, dir: Dir) {
        self.previous = Some(self.pos);
        self.pos = pos;
        self.dir = dir;
    }
}
