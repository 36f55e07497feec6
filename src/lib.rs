//! Grid-based maze chase engine: a fixed-step simulation of a player eating
//! dots while four ghosts with distinct personalities hunt them.
//!
//! The host feeds [`Input`]s and wall-clock frames into a [`Game`] and draws
//! whatever [`Game::snapshot`] returns.

pub mod components;
pub mod config;
pub mod error;
pub mod game;
pub mod game_loop;
pub mod ghost;
pub mod level;
pub mod mode;
pub mod movement;
pub mod player;
pub mod scoring;
pub mod snapshot;

pub use components::{Dir, Ghost, GhostMode, PelletKind, Personality, Player, Pos};
pub use config::{Config, Rules, TerminalSettings};
pub use error::{ConfigError, MazeError};
pub use game::{Control, Game, GameEvent, GameState};
pub use level::{CellType, Grid, Maze};
pub use player::Input;
pub use snapshot::Snapshot;
