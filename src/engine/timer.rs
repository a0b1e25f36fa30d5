//! # engine::timer
//!
//! **Iteration Timer** — one countdown per iteration, driven by whole-second
//! ticks from outside (the runner's interval, or a test).
//!
//! ```text
//! Idle ──start──▶ Running ──tick (elapsed > duration)──▶ Expired
//!                    │
//!                    └──cancel──▶ Cancelled
//! ```
//!
//! Expiry uses a strict comparison: with `duration = 5` the fifth tick still
//! reports `remaining = 0`, the sixth expires.  After `Expired` or
//! `Cancelled` the timer is inert; a new iteration gets a new timer.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimerState {
    Idle,
    Running,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick { remaining: u32 },
    /// Emitted exactly once per timer.
    Expired,
}

#[derive(Debug, Clone)]
pub struct IterationTimer {
    state:    TimerState,
    duration: u32,
    elapsed:  u32,
}

impl IterationTimer {
    pub fn new() -> Self {
        Self { state: TimerState::Idle, duration: 0, elapsed: 0 }
    }

    /// A timer already running for `duration` seconds.
    pub fn started(duration: u32) -> Self {
        let mut timer = Self::new();
        timer.start(duration);
        timer
    }

    /// Idle → Running.  Returns `false` (and changes nothing) otherwise.
    pub fn start(&mut self, duration: u32) -> bool {
        if self.state != TimerState::Idle {
            return false;
        }
        self.state = TimerState::Running;
        self.duration = duration;
        self.elapsed = 0;
        true
    }

    pub fn tick(&mut self) -> Option<TimerEvent> {
        if self.state != TimerState::Running {
            return None;
        }

        self.elapsed += 1;

        if self.elapsed > self.duration {
            self.state = TimerState::Expired;
            Some(TimerEvent::Expired)
        } else {
            Some(TimerEvent::Tick { remaining: self.duration - self.elapsed })
        }
    }

    /// Running → Cancelled.  No-op in any other state.
    pub fn cancel(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Cancelled;
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn duration(&self) -> u32 {
        self.duration
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn remaining(&self) -> u32 {
        self.duration.saturating_sub(self.elapsed)
    }

    /// Elapsed seconds, never more than the configured duration.
    pub fn time_spent(&self) -> u32 {
        self.elapsed.min(self.duration)
    }
}

impl Default for IterationTimer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_end(timer: &mut IterationTimer, max_ticks: u32) -> Vec<TimerEvent> {
        (0..max_ticks).filter_map(|_| timer.tick()).collect()
    }

    #[test]
    fn test_counts_down_then_expires_once() {
        let mut timer = IterationTimer::started(3);
        let events = run_to_end(&mut timer, 10);

        assert_eq!(
            events,
            vec![
                TimerEvent::Tick { remaining: 2 },
                TimerEvent::Tick { remaining: 1 },
                TimerEvent::Tick { remaining: 0 },
                TimerEvent::Expired,
            ]
        );
        assert_eq!(timer.state(), TimerState::Expired);
        assert_eq!(timer.time_spent(), 3);
    }

    #[test]
    fn test_expiry_is_never_before_duration() {
        for duration in 1..=10 {
            let mut timer = IterationTimer::started(duration);
            let mut expired_at = None;
            for n in 1..=duration + 5 {
                if timer.tick() == Some(TimerEvent::Expired) {
                    assert!(expired_at.is_none(), "second expiry for duration {duration}");
                    expired_at = Some(n);
                }
            }
            assert!(expired_at.unwrap() >= duration);
        }
    }

    #[test]
    fn test_cancel_stops_everything() {
        let mut timer = IterationTimer::started(5);
        timer.tick();
        timer.tick();
        timer.cancel();

        assert_eq!(timer.state(), TimerState::Cancelled);
        assert!(run_to_end(&mut timer, 10).is_empty());
        assert_eq!(timer.time_spent(), 2);
    }

    #[test]
    fn test_cancel_is_noop_unless_running() {
        let mut idle = IterationTimer::new();
        idle.cancel();
        assert_eq!(idle.state(), TimerState::Idle);

        let mut expired = IterationTimer::started(0);
        assert_eq!(expired.tick(), Some(TimerEvent::Expired));
        expired.cancel();
        assert_eq!(expired.state(), TimerState::Expired);
    }

    #[test]
    fn test_cannot_restart() {
        let mut timer = IterationTimer::started(5);
        assert!(!timer.start(10));
        assert_eq!(timer.duration(), 5);

        timer.cancel();
        assert!(!timer.start(10));
        assert_eq!(timer.state(), TimerState::Cancelled);
    }

    #[test]
    fn test_idle_timer_does_not_tick() {
        let mut timer = IterationTimer::new();
        assert_eq!(timer.tick(), None);
        assert_eq!(timer.elapsed(), 0);
    }
}
