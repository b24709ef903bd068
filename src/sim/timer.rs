//! Round clock at one-second resolution

use serde::{Deserialize, Serialize};

use crate::format_time;

/// Count-up (free play) or countdown (timed/ranked)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerMode {
    CountUp,
    Countdown { duration_secs: u32 },
}

/// What a single clock tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerTick {
    /// Round paused, nothing changed
    Frozen,
    /// One second elapsed
    Advanced,
    /// One second elapsed and the countdown reached zero
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTimer {
    pub mode: TimerMode,
    /// Seconds played so far (pauses excluded)
    pub elapsed_secs: u32,
}

impl RoundTimer {
    pub fn new(mode: TimerMode) -> Self {
        Self {
            mode,
            elapsed_secs: 0,
        }
    }

    /// Advance by one second unless paused
    pub fn tick(&mut self, paused: bool) -> TimerTick {
        if paused {
            return TimerTick::Frozen;
        }
        if self.is_finished() {
            return TimerTick::Finished;
        }
        self.elapsed_secs += 1;
        if self.is_finished() {
            TimerTick::Finished
        } else {
            TimerTick::Advanced
        }
    }

    /// Seconds left on a countdown
    pub fn remaining_secs(&self) -> Option<u32> {
        match self.mode {
            TimerMode::CountUp => None,
            TimerMode::Countdown { duration_secs } => {
                Some(duration_secs.saturating_sub(self.elapsed_secs))
            }
        }
    }

    /// True once a countdown hits zero (never for count-up)
    pub fn is_finished(&self) -> bool {
        self.remaining_secs() == Some(0)
    }

    /// Value shown on the HUD: elapsed for count-up, remaining for countdown
    pub fn display_secs(&self) -> u32 {
        self.remaining_secs().unwrap_or(self.elapsed_secs)
    }

    pub fn label(&self) -> String {
        format_time(self.display_secs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_up_never_finishes() {
        let mut timer = RoundTimer::new(TimerMode::CountUp);
        for _ in 0..10_000 {
            assert_eq!(timer.tick(false), TimerTick::Advanced);
        }
        assert_eq!(timer.display_secs(), 10_000);
        assert_eq!(timer.remaining_secs(), None);
    }

    #[test]
    fn test_countdown_finishes_at_zero() {
        let mut timer = RoundTimer::new(TimerMode::Countdown { duration_secs: 3 });
        assert_eq!(timer.label(), "0:03");
        assert_eq!(timer.tick(false), TimerTick::Advanced);
        assert_eq!(timer.tick(false), TimerTick::Advanced);
        assert_eq!(timer.tick(false), TimerTick::Finished);
        assert_eq!(timer.remaining_secs(), Some(0));
        assert_eq!(timer.elapsed_secs, 3);

        // Extra ticks don't run past zero
        assert_eq!(timer.tick(false), TimerTick::Finished);
        assert_eq!(timer.elapsed_secs, 3);
    }

    #[test]
    fn test_paused_tick_is_noop() {
        let mut timer = RoundTimer::new(TimerMode::Countdown { duration_secs: 60 });
        timer.tick(false);
        let before = timer;
        assert_eq!(timer.tick(true), TimerTick::Frozen);
        assert_eq!(timer, before);
        assert_eq!(timer.label(), "0:59");
    }
}
