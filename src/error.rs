use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum MazeError {
    #[error("maze layout is empty")]
    Empty,
    #[error("row {row} is {found} cells wide, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown maze character {ch:?} at ({x}, {y})")]
    UnknownCell { ch: char, x: usize, y: usize },
    #[error("maze has no player start ('P')")]
    MissingPlayerStart,
    #[error("marker {0:?} appears more than once")]
    DuplicateMarker(char),
    #[error("cell ({x}, {y}) cannot be reached from the player start")]
    Unreachable { x: i32, y: i32 },
    #[error("pen cell ({x}, {y}) opens onto a cell other than the pen exit")]
    PenLeak { x: i32, y: i32 },
    #[error("failed to read maze file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
