//! Configuration loader.
//!
//! * Looks for `pacman.toml` in the cwd unless a path is given.
//! * Every field has a default, so the file is optional.
//! * `PACMAN_TICK_MS` and `PACMAN_FPS` override the step and render rate.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::game_loop::{DEFAULT_MAX_FRAME_MS, DEFAULT_STEP_MS};
use crate::mode::ModeTimings;

pub const DEFAULT_CONFIG_FILE: &str = "pacman.toml";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Whether the host shell may launch the game at all.
    pub enabled: bool,
    pub seed: Option<u64>,
    /// Custom maze layout; the built-in maze is used when absent.
    pub maze: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
    pub rules: Rules,
    pub terminal: TerminalSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            seed: None,
            maze: None,
            log_file: None,
            rules: Rules::default(),
            terminal: TerminalSettings::default(),
        }
    }
}

/// Gameplay tunables. Durations are milliseconds of play time.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Rules {
    pub step_ms: f64,
    pub max_frame_ms: f64,
    pub scatter_ms: u64,
    pub chase_ms: u64,
    pub frightened_ms: u64,
    /// Ticks between two movement opportunities of a ghost.
    pub ghost_step_ticks: u32,
    /// Gap between ghosts leaving the pen at level start.
    pub ghost_release_ms: u64,
    pub life_lost_ms: u64,
    pub level_advance_ms: u64,
    pub fruit_min_ms: u64,
    pub fruit_max_ms: u64,
    pub fruit_lifetime_ms: u64,
    pub starting_lives: u32,
    pub starting_level: u32,
    pub extra_life_every: u32,
    /// Fractional ghost speed-up per level past the first.
    pub speed_per_level: f32,
    /// Clearing this level ends the game with a win.
    pub max_level: Option<u32>,
    pub input_buffer: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            step_ms: DEFAULT_STEP_MS,
            max_frame_ms: DEFAULT_MAX_FRAME_MS,
            scatter_ms: 7_000,
            chase_ms: 20_000,
            frightened_ms: 8_000,
            ghost_step_ticks: 8,
            ghost_release_ms: 2_000,
            life_lost_ms: 1_500,
            level_advance_ms: 2_000,
            fruit_min_ms: 10_000,
            fruit_max_ms: 20_000,
            fruit_lifetime_ms: 9_000,
            starting_lives: 3,
            starting_level: 1,
            extra_life_every: 10_000,
            speed_per_level: 0.1,
            max_level: None,
            input_buffer: 2,
        }
    }
}

impl Rules {
    /// Converts play time to whole simulation ticks, at least one.
    pub fn ticks(&self, ms: u64) -> u64 {
        ((ms as f64 / self.step_ms).round() as u64).max(1)
    }

    pub fn mode_timings(&self) -> ModeTimings {
        ModeTimings {
            scatter_ticks: self.ticks(self.scatter_ms),
            chase_ticks: self.ticks(self.chase_ms),
            frightened_ticks: self.ticks(self.frightened_ms),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.step_ms.is_finite() && self.step_ms > 0.0) {
            return Err(invalid("rules.step_ms", "must be a positive number"));
        }
        if !(self.max_frame_ms.is_finite() && self.max_frame_ms >= self.step_ms) {
            return Err(invalid("rules.max_frame_ms", "must be at least step_ms"));
        }
        if self.scatter_ms == 0 || self.chase_ms == 0 {
            return Err(invalid("rules.scatter_ms", "mode durations must be non-zero"));
        }
        if self.ghost_step_ticks == 0 {
            return Err(invalid("rules.ghost_step_ticks", "must be at least 1"));
        }
        if self.fruit_min_ms > self.fruit_max_ms {
            return Err(invalid("rules.fruit_min_ms", "must not exceed fruit_max_ms"));
        }
        if self.starting_lives == 0 {
            return Err(invalid("rules.starting_lives", "must be at least 1"));
        }
        if self.starting_level == 0 {
            return Err(invalid("rules.starting_level", "levels start at 1"));
        }
        if !(0.0..=10.0).contains(&self.speed_per_level) {
            return Err(invalid("rules.speed_per_level", "must be within 0..=10"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerminalSettings {
    pub render_fps: u64,
    /// Minimum gap between two repeats of a held direction key.
    pub input_repeat_ms: u64,
}

impl Default for TerminalSettings {
    fn default() -> Self {
        Self {
            render_fps: 120,
            input_repeat_ms: 120,
        }
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

impl Config {
    /// Loads `path`, or `pacman.toml` when none is given. Only the implicit
    /// default file may be missing.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (p, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        let mut config = match fs::read_to_string(&p) {
            Ok(text) => Self::from_toml(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !explicit => Self::default(),
            Err(source) => return Err(ConfigError::Read { path: p, source }),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.rules.validate()?;
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.rules.validate()?;
        Ok(config)
    }

    /// Applies `PACMAN_TICK_MS` and `PACMAN_FPS`. Unparsable or zero values
    /// are ignored.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = var("PACMAN_TICK_MS") {
            match raw.parse::<f64>() {
                Ok(v) if v > 0.0 && v.is_finite() => {
                    self.rules.step_ms = v;
                    self.rules.max_frame_ms = self.rules.max_frame_ms.max(v);
                }
                _ => warn!("ignoring PACMAN_TICK_MS={raw:?}"),
            }
        }
        if let Some(raw) = var("PACMAN_FPS") {
            match raw.parse::<u64>() {
                Ok(v) if v > 0 => self.terminal.render_fps = v,
                _ => warn!("ignoring PACMAN_FPS={raw:?}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert!(config.enabled);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = Config::from_toml(
            r#"
            enabled = false
            seed = 42

            [rules]
            chase_ms = 15000
            max_level = 3

            [terminal]
            render_fps = 30
            "#,
        )
        .unwrap();
        assert!(!config.enabled);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.rules.chase_ms, 15_000);
        assert_eq!(config.rules.max_level, Some(3));
        assert_eq!(config.rules.scatter_ms, 7_000);
        assert_eq!(config.terminal.render_fps, 30);
        assert_eq!(config.terminal.input_repeat_ms, 120);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::from_toml("rules = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn from_toml_rejects_rules_that_would_stall_the_game() {
        let err = Config::from_toml("[rules]\nghost_step_ticks = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "rules.ghost_step_ticks", .. }
        ));
        let err = Config::from_toml("[rules]\nstep_ms = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "rules.step_ms", .. }));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let err = Config::load(Some(Path::new("/nonexistent/pacman.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn load_reads_and_validates_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pacman.toml");
        fs::write(&path, "[rules]\nstarting_lives = 5\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.rules.starting_lives, 5);

        fs::write(&path, "[rules]\nstarting_lives = 0\n").unwrap();
        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "rules.starting_lives",
                ..
            }
        ));
    }

    #[test]
    fn env_overrides_step_and_fps() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            "PACMAN_TICK_MS" => Some("20".to_string()),
            "PACMAN_FPS" => Some("0".to_string()),
            _ => None,
        });
        assert_eq!(config.rules.step_ms, 20.0);
        assert_eq!(config.terminal.render_fps, 120);
    }

    #[test]
    fn durations_round_to_ticks() {
        let rules = Rules::default();
        assert_eq!(rules.ticks(7_000), 420);
        assert_eq!(rules.ticks(20_000), 1_200);
        assert_eq!(rules.ticks(1), 1);
        assert_eq!(rules.mode_timings().frightened_ticks, 480);
    }

    #[test]
    fn inverted_fruit_window_is_rejected() {
        let rules = Rules {
            fruit_min_ms: 5_000,
            fruit_max_ms: 1_000,
            ..Rules::default()
        };
        assert!(rules.validate().is_err());
    }
}
