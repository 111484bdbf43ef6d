use std::time::{Duration, Instant};

/// Host-side frame pacing, redesigned from a self-rescheduling callback
/// chain into an explicit loop controller: the animation loop asks for the
/// next tick before every cycle, and a `false` answer stops it.
///
/// Ticks never overlap; the whole pipeline is single-threaded and
/// cooperative, so the surface needs no locking.
pub trait FrameScheduler {
    /// Block until the next refresh slot. Returns `false` when no further
    /// cycles should run.
    fn next_tick(&mut self) -> bool;
}

/// Real-time pacing at a fixed refresh rate. Never stops on its own, like
/// the display-refresh callback it stands in for.
pub struct RefreshScheduler {
    interval: Duration,
    deadline: Option<Instant>,
}

impl RefreshScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    pub fn from_hz(hz: u32) -> Self {
        let hz = hz.max(1);
        Self::new(Duration::from_secs_f64(1.0 / f64::from(hz)))
    }
}

impl FrameScheduler for RefreshScheduler {
    fn next_tick(&mut self) -> bool {
        let now = Instant::now();
        let deadline = self.deadline.unwrap_or(now);
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
        // Late cycles skip ahead instead of accumulating debt.
        self.deadline = Some(deadline.max(now) + self.interval);
        true
    }
}

/// Offline pacing: grants a fixed number of ticks as fast as the pipeline
/// can consume them, then stops the loop. Gives tests and batch renders a
/// deterministic teardown.
pub struct CountedScheduler {
    remaining: u64,
}

impl CountedScheduler {
    pub fn new(ticks: u64) -> Self {
        Self { remaining: ticks }
    }
}

impl FrameScheduler for CountedScheduler {
    fn next_tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counted_scheduler_grants_exactly_n_ticks() {
        let mut s = CountedScheduler::new(3);
        assert!(s.next_tick());
        assert!(s.next_tick());
        assert!(s.next_tick());
        assert!(!s.next_tick());
        assert!(!s.next_tick());
    }

    #[test]
    fn counted_scheduler_with_zero_ticks_stops_immediately() {
        let mut s = CountedScheduler::new(0);
        assert!(!s.next_tick());
    }

    #[test]
    fn refresh_scheduler_spaces_ticks_by_interval() {
        let mut s = RefreshScheduler::new(Duration::from_millis(5));
        let start = Instant::now();
        assert!(s.next_tick());
        assert!(s.next_tick());
        assert!(s.next_tick());
        // First tick is immediate; the next two wait one interval each.
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
