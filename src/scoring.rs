use log::info;

pub const DOT_SCORE: u32 = 10;
pub const GHOST_SCORE: u32 = 200;

/// Fruit value per level; levels past the end keep the last entry.
pub const FRUIT_VALUES: [u32; 6] = [100, 300, 500, 700, 1000, 2000];

pub fn fruit_value(level: u32) -> u32 {
    let idx = (level.saturating_sub(1) as usize).min(FRUIT_VALUES.len() - 1);
    FRUIT_VALUES[idx]
}

pub fn ghost_value(level: u32) -> u32 {
    GHOST_SCORE.saturating_mul(level)
}

/// Score, lives and level for one session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreBoard {
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    extra_life_every: u32,
    next_extra_life: u32,
}

impl ScoreBoard {
    pub fn new(lives: u32, level: u32, extra_life_every: u32) -> Self {
        Self {
            score: 0,
            lives,
            level,
            extra_life_every,
            next_extra_life: extra_life_every,
        }
    }

    pub fn next_extra_life(&self) -> u32 {
        self.next_extra_life
    }

    /// Adds points and returns how many extra lives the new total earned.
    pub fn award(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        let mut earned = 0;
        while self.extra_life_every > 0 && self.score >= self.next_extra_life {
            self.lives = self.lives.saturating_add(1);
            earned += 1;
            info!("extra life at {} points, lives now {}", self.score, self.lives);
            let Some(next) = self.next_extra_life.checked_add(self.extra_life_every) else {
                self.extra_life_every = 0;
                break;
            };
            self.next_extra_life = next;
        }
        earned
    }

    /// Takes a life and reports whether any are left.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.lives > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fruit_value_saturates_after_level_six() {
        assert_eq!(fruit_value(1), 100);
        assert_eq!(fruit_value(4), 700);
        assert_eq!(fruit_value(6), 2000);
        assert_eq!(fruit_value(40), 2000);
    }

    #[test]
    fn ghost_value_scales_with_level() {
        assert_eq!(ghost_value(1), 200);
        assert_eq!(ghost_value(3), 600);
        assert_eq!(ghost_value(u32::MAX), u32::MAX);
    }

    #[test]
    fn extra_life_on_each_threshold_crossing() {
        let mut board = ScoreBoard::new(3, 1, 10_000);
        assert_eq!(board.award(9_990), 0);
        assert_eq!(board.award(10), 1);
        assert_eq!(board.lives, 4);
        assert_eq!(board.next_extra_life(), 20_000);
        assert_eq!(board.award(25_000), 2);
        assert_eq!(board.lives, 6);
    }

    #[test]
    fn losing_the_last_life_reports_game_over() {
        let mut board = ScoreBoard::new(2, 1, 10_000);
        assert!(board.lose_life());
        assert!(!board.lose_life());
        assert!(!board.lose_life());
        assert_eq!(board.lives, 0);
    }
}
