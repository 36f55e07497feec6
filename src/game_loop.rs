/// Default simulation step, one sixtieth of a second.
pub const DEFAULT_STEP_MS: f64 = 1000.0 / 60.0;

/// Longest gap between two frames that still counts towards the accumulator.
pub const DEFAULT_MAX_FRAME_MS: f64 = 250.0;

// Absorbs float error so that e.g. 50 ms covers exactly three 1000/60 ms steps.
const EPSILON_MS: f64 = 1e-6;

/// Turns the host's variable frame timestamps into a whole number of
/// fixed-size simulation steps.
#[derive(Clone, Debug)]
pub struct FixedTimestep {
    step_ms: f64,
    max_frame_ms: f64,
    accumulator: f64,
    last: Option<f64>,
}

impl FixedTimestep {
    pub fn new(step_ms: f64, max_frame_ms: f64) -> Self {
        Self {
            step_ms,
            max_frame_ms,
            accumulator: 0.0,
            last: None,
        }
    }

    /// Forgets the previous timestamp and any leftover time, so the next
    /// frame after a pause starts from zero.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last = None;
    }

    /// Records a frame at `now_ms` and returns how many steps to simulate.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let Some(last) = self.last.replace(now_ms) else {
            return 0;
        };
        if !(self.step_ms > 0.0) {
            return 0;
        }
        let elapsed = (now_ms - last).clamp(0.0, self.max_frame_ms);
        self.accumulator += elapsed;

        let mut steps = 0;
        while self.accumulator + EPSILON_MS >= self.step_ms {
            self.accumulator -= self.step_ms;
            steps += 1;
        }
        if self.accumulator < 0.0 {
            self.accumulator = 0.0;
        }
        steps
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_MS, DEFAULT_MAX_FRAME_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_only_sets_the_baseline() {
        let mut clock = FixedTimestep::default();
        assert_eq!(clock.advance(1234.0), 0);
    }

    #[test]
    fn stall_then_fast_frame() {
        let mut clock = FixedTimestep::default();
        assert_eq!(clock.advance(0.0), 0);
        assert_eq!(clock.advance(50.0), 3);
        assert_eq!(clock.advance(66.0), 0);
        assert_eq!(clock.advance(67.0), 1);
    }

    #[test]
    fn leftover_time_carries_over() {
        let mut clock = FixedTimestep::default();
        clock.advance(0.0);
        assert_eq!(clock.advance(10.0), 0);
        assert_eq!(clock.advance(20.0), 1);
        assert_eq!(clock.advance(30.0), 0);
        assert_eq!(clock.advance(40.0), 1);
    }

    #[test]
    fn never_runs_more_steps_than_time_allows() {
        let mut clock = FixedTimestep::default();
        let mut now = 0.0;
        let mut total = 0u32;
        clock.advance(now);
        for delta in [3.0, 40.0, 16.0, 17.0, 1.0, 90.0, 5.5] {
            now += delta;
            total += clock.advance(now);
            assert!(total as f64 * DEFAULT_STEP_MS <= now + 1e-6);
        }
        assert_eq!(total, (now / DEFAULT_STEP_MS).floor() as u32);
    }

    #[test]
    fn long_stalls_are_clamped() {
        let mut clock = FixedTimestep::new(10.0, 100.0);
        clock.advance(0.0);
        assert_eq!(clock.advance(5_000.0), 10);
    }

    #[test]
    fn time_going_backwards_adds_nothing() {
        let mut clock = FixedTimestep::default();
        clock.advance(100.0);
        assert_eq!(clock.advance(50.0), 0);
        assert_eq!(clock.advance(50.0 + DEFAULT_STEP_MS), 1);
    }

    #[test]
    fn zero_step_runs_nothing() {
        let mut clock = FixedTimestep::new(0.0, 100.0);
        clock.advance(0.0);
        assert_eq!(clock.advance(50.0), 0);
    }

    #[test]
    fn reset_drops_the_accumulator() {
        let mut clock = FixedTimestep::default();
        clock.advance(0.0);
        clock.advance(16.0);
        clock.reset();
        assert_eq!(clock.advance(1000.0), 0);
        assert_eq!(clock.advance(1001.0), 0);
    }
}
