mod render;

use std::fs::File;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use log::{debug, error, info};
use thiserror::Error;

use pacman_egg::{Config, ConfigError, Control, Dir, Game, GameEvent, Input, Maze, MazeError};

use crate::render::Renderer;

#[derive(Parser, Debug)]
#[command(name = "pacman", version)]
#[command(about = "Maze chase in the terminal: eat every dot, dodge the ghosts")]
struct Cli {
    /// Config file (defaults to ./pacman.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// RNG seed for a reproducible session
    #[arg(long)]
    seed: Option<u64>,
    /// Maze layout file to play instead of the built-in one
    #[arg(long)]
    maze: Option<PathBuf>,
    /// Level to start on
    #[arg(long)]
    level: Option<u32>,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Maze(#[from] MazeError),
    #[error("cannot open log file {path}: {source}")]
    LogFile { path: PathBuf, source: io::Error },
    #[error("logger already initialised: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

fn main() -> ExitCode {
    match start(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            eprintln!("pacman: {err}");
            ExitCode::FAILURE
        }
    }
}

fn start(cli: Cli) -> Result<(), AppError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(level) = cli.level {
        config.rules.starting_level = level;
        config.rules.validate()?;
    }
    if cli.maze.is_some() {
        config.maze = cli.maze;
    }
    init_logging(config.log_file.as_deref())?;

    if !config.enabled {
        info!("game disabled by configuration");
        eprintln!("pacman is disabled (set `enabled = true` in the config to play)");
        return Ok(());
    }

    let maze = match &config.maze {
        Some(path) => Maze::load(path)?,
        None => Maze::reference(),
    };
    let seed = cli.seed.or(config.seed).unwrap_or_else(rand::random);
    info!("starting session with seed {seed}");
    let game = Game::new(config.rules.clone(), maze, seed)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &config, game);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    result
}

/// Logs go to `log_file` when set; otherwise only errors reach stderr so the
/// alternate screen stays clean.
fn init_logging(path: Option<&Path>) -> Result<(), AppError> {
    let default_level = if path.is_some() { "info" } else { "error" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level));
    if let Some(path) = path {
        let file = File::create(path).map_err(|source| AppError::LogFile {
            path: path.to_path_buf(),
            source,
        })?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.try_init()?;
    Ok(())
}

fn run(stdout: &mut Stdout, config: &Config, mut game: Game) -> Result<(), AppError> {
    let grid = &game.maze().grid;
    let mut renderer = Renderer::new(grid.width() as usize, grid.height() as usize);
    let frame_time = Duration::from_micros(1_000_000 / config.terminal.render_fps.max(1));
    let repeat = Duration::from_millis(config.terminal.input_repeat_ms);
    let mut last_sent: [Option<Instant>; 4] = [None; 4];
    let clock = Instant::now();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            let Event::Key(key) = event::read()? else {
                continue;
            };
            let Some(input) = input_for(key) else {
                continue;
            };
            if let Some(dir) = input.direction() {
                // Held keys auto-repeat far faster than the player should move.
                let slot = &mut last_sent[idx_for_dir(dir)];
                if slot.is_some_and(|t| frame_start.duration_since(t) < repeat) {
                    continue;
                }
                *slot = Some(frame_start);
            }
            if game.apply_input(input) == Control::Close {
                return Ok(());
            }
        }

        game.frame(clock.elapsed().as_secs_f64() * 1000.0);
        for event in game.drain_events() {
            log_event(&event);
        }
        renderer.draw(stdout, &game)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn input_for(key: KeyEvent) -> Option<Input> {
    if !matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Input::Close);
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(Input::Close),
        KeyCode::Char('p') | KeyCode::Char(' ') => Some(Input::PauseToggle),
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('w') => Some(Input::Up),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('s') => Some(Input::Down),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('a') => Some(Input::Left),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('d') => Some(Input::Right),
        _ => None,
    }
}

fn idx_for_dir(dir: Dir) -> usize {
    match dir {
        Dir::Up => 0,
        Dir::Down => 1,
        Dir::Left => 2,
        Dir::Right => 3,
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::DotEaten { .. } => {}
        GameEvent::LevelCleared { .. } | GameEvent::GameOver { .. } | GameEvent::ExtraLife { .. } => {
            info!("{event:?}")
        }
        _ => debug!("{event:?}"),
    }
}
