//! Global ghost behaviour: the scatter/chase cycle plus the frightened
//! overlay a power pellet puts on top of it. Time is counted in play ticks.

use log::debug;

use crate::components::GhostMode;

/// A state that lasts `duration` ticks from `entered_at`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimedState<S> {
    pub state: S,
    pub entered_at: u64,
    pub duration: u64,
}

impl<S: Copy> TimedState<S> {
    pub fn new(state: S, entered_at: u64, duration: u64) -> Self {
        Self {
            state,
            entered_at,
            duration,
        }
    }

    pub fn deadline(&self) -> u64 {
        self.entered_at.saturating_add(self.duration)
    }

    pub fn has_expired(&self, now: u64) -> bool {
        now >= self.deadline()
    }

    pub fn remaining(&self, now: u64) -> u64 {
        self.deadline().saturating_sub(now)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CyclePhase {
    Scatter,
    Chase,
}

impl CyclePhase {
    pub fn ghost_mode(self) -> GhostMode {
        match self {
            CyclePhase::Scatter => GhostMode::Scatter,
            CyclePhase::Chase => GhostMode::Chase,
        }
    }
}

/// What changed during [`ModeController::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeChange {
    Cycle(CyclePhase),
    FrightenedOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModeTimings {
    pub scatter_ticks: u64,
    pub chase_ticks: u64,
    pub frightened_ticks: u64,
}

#[derive(Clone, Debug)]
pub struct ModeController {
    timings: ModeTimings,
    cycle: TimedState<CyclePhase>,
    frightened: Option<TimedState<()>>,
}

impl ModeController {
    pub fn new(timings: ModeTimings, now: u64) -> Self {
        Self {
            timings,
            cycle: TimedState::new(CyclePhase::Scatter, now, timings.scatter_ticks),
            frightened: None,
        }
    }

    pub fn phase(&self) -> CyclePhase {
        self.cycle.state
    }

    /// Mode a ghost that is not frightened should be in right now.
    pub fn global_mode(&self) -> GhostMode {
        self.cycle.state.ghost_mode()
    }

    pub fn is_frightened(&self) -> bool {
        self.frightened.is_some()
    }

    pub fn frightened_remaining(&self, now: u64) -> u64 {
        self.frightened.map(|f| f.remaining(now)).unwrap_or(0)
    }

    /// Starts (or restarts) the frightened overlay. The cycle keeps running.
    pub fn trigger_frightened(&mut self, now: u64) {
        debug!("frightened for {} ticks from tick {}", self.timings.frightened_ticks, now);
        self.frightened = Some(TimedState::new((), now, self.timings.frightened_ticks));
    }

    /// Advances both timers to `now`, returning every transition that fired.
    pub fn update(&mut self, now: u64) -> Vec<ModeChange> {
        let mut changes = Vec::new();
        while self.cycle.has_expired(now) {
            let next = match self.cycle.state {
                CyclePhase::Scatter => CyclePhase::Chase,
                CyclePhase::Chase => CyclePhase::Scatter,
            };
            let duration = match next {
                CyclePhase::Scatter => self.timings.scatter_ticks,
                CyclePhase::Chase => self.timings.chase_ticks,
            };
            self.cycle = TimedState::new(next, self.cycle.deadline(), duration.max(1));
            debug!("mode cycle -> {:?} at tick {}", next, now);
            changes.push(ModeChange::Cycle(next));
        }
        if self.frightened.is_some_and(|f| f.has_expired(now)) {
            self.frightened = None;
            changes.push(ModeChange::FrightenedOver);
        }
        changes
    }
}
