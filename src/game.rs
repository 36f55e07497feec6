//! One game session: owns every piece of mutable state and advances it one
//! fixed step at a time.

use std::collections::BTreeMap;
use std::mem;

use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::components::{Dir, Ghost, GhostMode, PelletKind, Personality, Player, Pos};
use crate::config::Rules;
use crate::error::ConfigError;
use crate::game_loop::FixedTimestep;
use crate::ghost::{self, TargetContext};
use crate::level::Maze;
use crate::mode::{ModeChange, ModeController, TimedState};
use crate::player::{self, Input, InputQueue};
use crate::scoring::{self, ScoreBoard, DOT_SCORE};
use crate::snapshot::{FruitView, GhostView, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameState {
    Intro,
    Playing,
    Paused,
    /// Short freeze after the player is caught, before positions reset.
    LifeLost,
    Win,
    GameOver,
}

/// Tells the host whether to keep the session open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    StateChanged { from: GameState, to: GameState },
    DotEaten { pos: Pos },
    PowerPelletEaten { pos: Pos },
    GhostEaten { personality: Personality, points: u32 },
    GhostRespawned { personality: Personality },
    FruitSpawned { pos: Pos, value: u32 },
    FruitEaten { points: u32 },
    FruitExpired,
    ExtraLife { lives: u32 },
    LifeLost { lives: u32 },
    LevelCleared { level: u32 },
    LevelStarted { level: u32 },
    GameOver { score: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    Respawn,
    NextLevel,
}

#[derive(Debug, Clone, Copy)]
struct Fruit {
    pos: Pos,
    value: u32,
    life: TimedState<()>,
}

pub struct Game {
    rules: Rules,
    maze: Maze,
    state: GameState,
    player: Player,
    ghosts: Vec<Ghost>,
    pellets: BTreeMap<Pos, PelletKind>,
    board: ScoreBoard,
    modes: ModeController,
    clock: FixedTimestep,
    inputs: InputQueue,
    fruit: Option<Fruit>,
    fruit_due: u64,
    transition: Option<TimedState<Transition>>,
    /// Ticks simulated while `Playing`; mode and fruit timers run on this.
    play_ticks: u64,
    /// Every tick, transitions included.
    ticks: u64,
    rng: StdRng,
    events: Vec<GameEvent>,
}

impl Game {
    /// Starts a session in `Intro`. Rules are validated first, since a zero
    /// step or ghost interval would stall or crash the simulation.
    pub fn new(rules: Rules, maze: Maze, seed: u64) -> Result<Self, ConfigError> {
        rules.validate()?;
        let ghosts = maze
            .ghost_spawns
            .iter()
            .map(|spawn| {
                Ghost::new(
                    spawn.personality,
                    spawn.pos,
                    spawn.facing(),
                    maze.respawn_for(spawn),
                )
            })
            .collect();
        let mut game = Game {
            player: Player::new(maze.player_start),
            ghosts,
            pellets: BTreeMap::new(),
            board: ScoreBoard::new(
                rules.starting_lives,
                rules.starting_level,
                rules.extra_life_every,
            ),
            modes: ModeController::new(rules.mode_timings(), 0),
            clock: FixedTimestep::new(rules.step_ms, rules.max_frame_ms),
            inputs: InputQueue::new(rules.input_buffer),
            fruit: None,
            fruit_due: 0,
            transition: None,
            play_ticks: 0,
            ticks: 0,
            rng: StdRng::seed_from_u64(seed),
            events: Vec::new(),
            state: GameState::Intro,
            rules,
            maze,
        };
        game.reset_level();
        Ok(game)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.board.score
    }

    pub fn lives(&self) -> u32 {
        self.board.lives
    }

    pub fn level(&self) -> u32 {
        self.board.level
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ghosts(&self) -> &[Ghost] {
        &self.ghosts
    }

    pub fn remaining_dots(&self) -> usize {
        self.pellets.len()
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    /// A win with no next level to move on to.
    pub fn is_final_win(&self) -> bool {
        self.state == GameState::Win && self.transition.is_none()
    }

    fn is_running(&self) -> bool {
        match self.state {
            GameState::Playing | GameState::LifeLost => true,
            GameState::Win => self.transition.is_some(),
            GameState::Intro | GameState::Paused | GameState::GameOver => false,
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }

    /// Host frame callback. Runs as many fixed steps as the time since the
    /// previous frame covers and returns how many ran.
    pub fn frame(&mut self, now_ms: f64) -> u32 {
        if !self.is_running() {
            self.clock.reset();
            return 0;
        }
        let steps = self.clock.advance(now_ms);
        let mut ran = 0;
        for _ in 0..steps {
            if !self.is_running() {
                break;
            }
            self.tick();
            ran += 1;
        }
        ran
    }

    pub fn apply_input(&mut self, input: Input) -> Control {
        if input == Input::Close {
            info!("session closed at score {}", self.board.score);
            return Control::Close;
        }
        match (self.state, input) {
            (GameState::Intro, _) => self.set_state(GameState::Playing),
            (GameState::Playing, Input::PauseToggle) => {
                self.inputs.clear();
                self.set_state(GameState::Paused);
            }
            (GameState::Playing, _) => {
                if let Some(dir) = input.direction() {
                    self.inputs.push(dir);
                }
            }
            (GameState::Paused, Input::PauseToggle) => self.set_state(GameState::Playing),
            (GameState::GameOver, Input::PauseToggle) => self.restart(),
            (GameState::Win, Input::PauseToggle) if self.is_final_win() => self.restart(),
            _ => {}
        }
        Control::Continue
    }

    /// Back to the intro screen with a fresh score, lives and level.
    pub fn restart(&mut self) {
        info!("restarting session");
        self.board = ScoreBoard::new(
            self.rules.starting_lives,
            self.rules.starting_level,
            self.rules.extra_life_every,
        );
        self.transition = None;
        self.reset_level();
        self.set_state(GameState::Intro);
    }

    /// One fixed simulation step.
    pub fn tick(&mut self) {
        match self.state {
            GameState::Playing => self.tick_playing(),
            GameState::LifeLost | GameState::Win => self.tick_transition(),
            GameState::Intro | GameState::Paused | GameState::GameOver => {}
        }
    }

    fn tick_playing(&mut self) {
        let now = self.play_ticks;
        self.play_ticks += 1;
        self.ticks += 1;

        self.apply_mode_changes(now);

        if let Some(dir) = self.inputs.pop() {
            player::try_move(&mut self.player, &self.maze.grid, dir);
        }
        self.consume_under_player(now);
        self.collect_fruit(now);

        if self.pellets.is_empty() {
            self.level_cleared();
            return;
        }

        self.check_collisions();
        if self.state != GameState::Playing {
            return;
        }

        self.update_fruit(now);
        self.move_ghosts(now);
        self.check_collisions();
    }

    fn tick_transition(&mut self) {
        self.ticks += 1;
        let Some(pending) = self.transition else {
            return;
        };
        if !pending.has_expired(self.ticks) {
            return;
        }
        match pending.state {
            Transition::Respawn => self.reset_positions(),
            Transition::NextLevel => {
                self.board.level = self.board.level.saturating_add(1);
                self.reset_level();
            }
        }
        // Still running while the transition is pending, so the clock keeps
        // its baseline across the hand-over.
        self.set_state(GameState::Playing);
        self.transition = None;
    }

    fn set_state(&mut self, to: GameState) {
        let from = self.state;
        if from == to {
            return;
        }
        info!("state {:?} -> {:?}", from, to);
        let was_running = self.is_running();
        self.state = to;
        if !(was_running && self.is_running()) {
            self.clock.reset();
        }
        self.events.push(GameEvent::StateChanged { from, to });
    }

    fn award(&mut self, points: u32) {
        if self.board.award(points) > 0 {
            self.events.push(GameEvent::ExtraLife {
                lives: self.board.lives,
            });
        }
    }

    fn apply_mode_changes(&mut self, now: u64) {
        for change in self.modes.update(now) {
            match change {
                ModeChange::Cycle(phase) => {
                    for g in self.ghosts.iter_mut() {
                        if !g.eaten && g.mode != GhostMode::Frightened {
                            g.mode = phase.ghost_mode();
                        }
                    }
                }
                ModeChange::FrightenedOver => {
                    let mode = self.modes.global_mode();
                    for g in self.ghosts.iter_mut().filter(|g| !g.eaten) {
                        g.mode = mode;
                    }
                }
            }
        }
    }

    fn consume_under_player(&mut self, now: u64) {
        let pos = self.player.pos;
        match player::consume(&mut self.pellets, pos) {
            Some(PelletKind::Normal) => {
                self.award(DOT_SCORE);
                self.events.push(GameEvent::DotEaten { pos });
            }
            Some(PelletKind::Power) => {
                self.award(DOT_SCORE);
                self.events.push(GameEvent::PowerPelletEaten { pos });
                self.frighten(now);
            }
            None => {}
        }
    }

    fn frighten(&mut self, now: u64) {
        self.modes.trigger_frightened(now);
        let grid = &self.maze.grid;
        for g in self.ghosts.iter_mut().filter(|g| !g.eaten) {
            g.mode = GhostMode::Frightened;
            let ahead = grid.wrap(g.pos.step(g.dir));
            g.reverse(ahead);
        }
    }

    /// Player against every ghost on the same cell. Frightened ghosts are
    /// eaten; the first dangerous one costs a life and ends the check.
    fn check_collisions(&mut self) {
        let pos = self.player.pos;
        let points = scoring::ghost_value(self.board.level);
        let mut eaten = Vec::new();
        let mut caught = false;
        for g in self.ghosts.iter_mut() {
            if g.pos != pos || g.eaten {
                continue;
            }
            if g.is_frightened() {
                g.eaten = true;
                eaten.push(g.personality);
            } else {
                caught = true;
                break;
            }
        }
        for personality in eaten {
            debug!("{:?} ghost eaten for {} points", personality, points);
            self.award(points);
            self.events.push(GameEvent::GhostEaten {
                personality,
                points,
            });
        }
        if caught {
            self.lose_life();
        }
    }

    fn lose_life(&mut self) {
        let alive = self.board.lose_life();
        self.events.push(GameEvent::LifeLost {
            lives: self.board.lives,
        });
        self.inputs.clear();
        self.fruit = None;
        if alive {
            self.transition = Some(TimedState::new(
                Transition::Respawn,
                self.ticks,
                self.rules.ticks(self.rules.life_lost_ms),
            ));
            self.set_state(GameState::LifeLost);
        } else {
            info!("game over with {} points", self.board.score);
            self.events.push(GameEvent::GameOver {
                score: self.board.score,
            });
            self.set_state(GameState::GameOver);
        }
    }

    fn level_cleared(&mut self) {
        let level = self.board.level;
        info!("level {} cleared with {} points", level, self.board.score);
        self.events.push(GameEvent::LevelCleared { level });
        self.inputs.clear();
        self.fruit = None;
        let last = self.rules.max_level.is_some_and(|max| level >= max);
        self.transition = if last {
            None
        } else {
            Some(TimedState::new(
                Transition::NextLevel,
                self.ticks,
                self.rules.ticks(self.rules.level_advance_ms),
            ))
        };
        self.set_state(GameState::Win);
    }

    fn schedule_fruit(&mut self, now: u64) {
        let min = self.rules.ticks(self.rules.fruit_min_ms);
        let max = self.rules.ticks(self.rules.fruit_max_ms).max(min);
        self.fruit_due = now + self.rng.gen_range(min..=max);
    }

    fn update_fruit(&mut self, now: u64) {
        match self.fruit {
            Some(fruit) => {
                if fruit.life.has_expired(now) {
                    self.fruit = None;
                    self.events.push(GameEvent::FruitExpired);
                    self.schedule_fruit(now);
                }
            }
            None if now >= self.fruit_due => {
                let player = self.player.pos;
                let cells: Vec<Pos> = self
                    .maze
                    .grid
                    .path_cells()
                    .into_iter()
                    .filter(|p| *p != player)
                    .collect();
                if let Some(&pos) = cells.choose(&mut self.rng) {
                    let value = scoring::fruit_value(self.board.level);
                    debug!("fruit worth {} at {:?}", value, pos);
                    self.fruit = Some(Fruit {
                        pos,
                        value,
                        life: TimedState::new((), now, self.rules.ticks(self.rules.fruit_lifetime_ms)),
                    });
                    self.events.push(GameEvent::FruitSpawned { pos, value });
                } else {
                    self.schedule_fruit(now);
                }
            }
            None => {}
        }
    }

    fn collect_fruit(&mut self, now: u64) {
        let Some(fruit) = self.fruit else {
            return;
        };
        if fruit.pos != self.player.pos {
            return;
        }
        self.fruit = None;
        self.award(fruit.value);
        self.events.push(GameEvent::FruitEaten {
            points: fruit.value,
        });
        self.schedule_fruit(now);
    }

    fn move_ghosts(&mut self, now: u64) {
        if now % u64::from(self.rules.ghost_step_ticks) != 0 {
            return;
        }
        let grid = &self.maze.grid;
        let pen_exit = self.maze.pen_exit;
        let mut plans = Vec::with_capacity(self.ghosts.len());
        for g in self.ghosts.iter() {
            if grid.is_pen(g.pos) && now < g.release_at {
                plans.push(None);
                continue;
            }
            if !g.eaten && !self.rng.gen_bool(f64::from(g.speed.clamp(0.0, 1.0))) {
                plans.push(None);
                continue;
            }
            let ctx = TargetContext {
                grid,
                player: &self.player,
                ghosts: &self.ghosts,
                ghost: g,
            };
            plans.push(ghost::plan_move(&ctx, pen_exit, &mut self.rng));
        }

        let global = self.modes.global_mode();
        for (g, plan) in self.ghosts.iter_mut().zip(plans) {
            if let Some((pos, dir)) = plan {
                g.move_to(pos, dir);
            }
            if !g.eaten {
                continue;
            }
            let home = pen_exit.unwrap_or(g.respawn);
            if g.pos.manhattan(home) <= 1 {
                g.pos = g.respawn;
                g.dir = Dir::Up;
                g.previous = None;
                g.eaten = false;
                g.mode = global;
                g.release_at = now;
                self.events.push(GameEvent::GhostRespawned {
                    personality: g.personality,
                });
            }
        }
    }

    fn ghost_speed(&self, personality: Personality) -> f32 {
        let level = self.board.level.saturating_sub(1) as f32;
        (personality.base_speed() * (1.0 + self.rules.speed_per_level * level)).min(1.0)
    }

    /// Player and ghosts back to their spawns; dots, score and level stay.
    fn reset_positions(&mut self) {
        let now = self.play_ticks;
        let interval = self.rules.ticks(self.rules.ghost_release_ms);
        self.player = Player::new(self.maze.player_start);
        for (idx, g) in self.ghosts.iter_mut().enumerate() {
            g.reset_to_spawn(GhostMode::Scatter, now + idx as u64 * interval);
        }
        self.modes = ModeController::new(self.rules.mode_timings(), now);
        self.fruit = None;
        self.inputs.clear();
        self.schedule_fruit(now);
    }

    fn reset_level(&mut self) {
        self.pellets = self.maze.pellets.iter().copied().collect();
        for idx in 0..self.ghosts.len() {
            let speed = self.ghost_speed(self.ghosts[idx].personality);
            self.ghosts[idx].speed = speed;
        }
        self.reset_positions();
        info!("level {} started", self.board.level);
        self.events.push(GameEvent::LevelStarted {
            level: self.board.level,
        });
    }

    /// Read-only view of the current frame.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            width: self.maze.grid.width(),
            height: self.maze.grid.height(),
            player: self.player.pos,
            player_dir: self.player.dir,
            ghosts: self
                .ghosts
                .iter()
                .map(|g| GhostView {
                    personality: g.personality,
                    pos: g.pos,
                    dir: g.dir,
                    mode: g.mode,
                    eaten: g.eaten,
                })
                .collect(),
            pellets: self.pellets.iter().map(|(p, k)| (*p, *k)).collect(),
            fruit: self.fruit.map(|f| FruitView {
                pos: f.pos,
                value: f.value,
            }),
            score: self.board.score,
            lives: self.board.lives,
            level: self.board.level,
            mode: self.modes.global_mode(),
            frightened: self.modes.is_frightened(),
            frightened_remaining: self.modes.frightened_remaining(self.play_ticks),
            state: self.state,
            tick: self.ticks,
        }
    }
}
