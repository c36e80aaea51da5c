use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running { next_deadline: Instant },
}

/// Fixed-interval clock used to advance the displayed position between
/// server updates. It never schedules itself: the engine starts and stops
/// it after every state change.
#[derive(Debug, Clone)]
pub struct InterpolationTimer {
    interval: Duration,
    state: TimerState,
}

impl InterpolationTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            state: TimerState::Stopped,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval.as_millis() as u64
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    /// Returns true if the timer was stopped before
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }
        debug!("Interpolation timer started");
        self.state = TimerState::Running {
            next_deadline: Instant::now() + self.interval,
        };
        true
    }

    /// Returns true if the timer was running before
    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        debug!("Interpolation timer stopped");
        self.state = TimerState::Stopped;
        true
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            TimerState::Running { next_deadline } => Some(next_deadline),
            TimerState::Stopped => None,
        }
    }

    /// Schedule the following tick one interval after the last one
    pub fn rearm(&mut self) {
        if let TimerState::Running { next_deadline } = self.state {
            let now = Instant::now();
            let mut next = next_deadline + self.interval;
            if next <= now {
                // fell behind; don't fire a burst to catch up
                next = now + self.interval;
            }
            self.state = TimerState::Running {
                next_deadline: next,
            };
        }
    }
}

impl Default for InterpolationTimer {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

/// Position after one tick, or None once the track end is reached.
/// Never returns a value past the duration.
pub fn advance(position_ms: u64, duration_ms: u64, interval_ms: u64) -> Option<u64> {
    if position_ms >= duration_ms {
        return None;
    }
    Some(position_ms.saturating_add(interval_ms).min(duration_ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_start_stop_idempotent() {
        let mut timer = InterpolationTimer::default();
        assert!(!timer.is_running());
        assert!(timer.next_deadline().is_none());

        assert!(timer.start());
        assert!(!timer.start());
        assert!(timer.is_running());
        assert!(timer.next_deadline().is_some());

        assert!(timer.stop());
        assert!(!timer.stop());
        assert_eq!(timer.state(), TimerState::Stopped);
    }

    #[test]
    fn test_timer_start_keeps_deadline() {
        let mut timer = InterpolationTimer::new(Duration::from_millis(250));
        timer.start();
        let deadline = timer.next_deadline();
        timer.start();
        assert_eq!(timer.next_deadline(), deadline);
    }

    #[test]
    fn test_timer_rearm() {
        let mut timer = InterpolationTimer::new(Duration::from_secs(60));
        timer.rearm();
        assert!(timer.next_deadline().is_none());

        timer.start();
        let first = timer.next_deadline().unwrap();
        timer.rearm();
        assert_eq!(timer.next_deadline().unwrap(), first + Duration::from_secs(60));
    }

    #[test]
    fn test_advance() {
        assert_eq!(advance(0, 10_000, 1000), Some(1000));
        assert_eq!(advance(9_500, 10_000, 1000), Some(10_000));
        assert_eq!(advance(10_000, 10_000, 1000), None);
        assert_eq!(advance(12_000, 10_000, 1000), None);
    }
}
