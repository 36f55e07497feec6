use serde::Serialize;

use crate::components::{Dir, GhostMode, PelletKind, Personality, Pos};
use crate::game::GameState;

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub width: i32,
    pub height: i32,
    pub player: Pos,
    pub player_dir: Dir,
    pub ghosts: Vec<GhostView>,
    pub pellets: Vec<(Pos, PelletKind)>,
    pub fruit: Option<FruitView>,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    /// Current scatter/chase phase; frightened is reported separately.
    pub mode: GhostMode,
    pub frightened: bool,
    /// Ticks of frightened time left, zero when not frightened.
    pub frightened_remaining: u64,
    pub state: GameState,
    pub tick: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GhostView {
    pub personality: Personality,
    pub pos: Pos,
    pub dir: Dir,
    pub mode: GhostMode,
    pub eaten: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FruitView {
    pub pos: Pos,
    pub value: u32,
}

impl Snapshot {
    pub fn remaining_dots(&self) -> usize {
        self.pellets.len()
    }

    pub fn ghost_at(&self, pos: Pos) -> Option<&GhostView> {
        self.ghosts.iter().find(|g| g.pos == pos)
    }

    pub fn pellet_at(&self, pos: Pos) -> Option<PelletKind> {
        self.pellets
            .iter()
            .find(|(p, _)| *p == pos)
            .map(|(_, kind)| *kind)
    }
}
