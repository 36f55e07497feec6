use std::collections::{BTreeMap, VecDeque};

use crate::components::{Dir, PelletKind, Player, Pos};
use crate::level::Grid;

/// Commands the host can send to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    Left,
    Right,
    PauseToggle,
    Close,
}

impl Input {
    pub fn direction(self) -> Option<Dir> {
        match self {
            Input::Up => Some(Dir::Up),
            Input::Down => Some(Dir::Down),
            Input::Left => Some(Dir::Left),
            Input::Right => Some(Dir::Right),
            Input::PauseToggle | Input::Close => None,
        }
    }
}

/// Directions waiting for the next tick. When full the oldest is dropped.
#[derive(Clone, Debug)]
pub struct InputQueue {
    pending: VecDeque<Dir>,
    capacity: usize,
}

impl InputQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, dir: Dir) {
        if self.pending.len() == self.capacity {
            self.pending.pop_front();
        }
        self.pending.push_back(dir);
    }

    pub fn pop(&mut self) -> Option<Dir> {
        self.pending.pop_front()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Moves one cell and turns to face `dir`. Illegal moves leave the player
/// untouched, facing included.
pub fn try_move(player: &mut Player, grid: &Grid, dir: Dir) -> bool {
    let next = player.pos.step(dir);
    if !grid.is_legal_move(next) {
        return false;
    }
    player.pos = grid.wrap(next);
    player.dir = dir;
    true
}

/// Removes and returns the collectible under `pos`, if any.
pub fn consume(pellets: &mut BTreeMap<Pos, PelletKind>, pos: Pos) -> Option<PelletKind> {
    pellets.remove(&pos)
}
