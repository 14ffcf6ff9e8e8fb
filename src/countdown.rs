use std::time::Duration;

const FINE_INTERVAL: Duration = Duration::from_millis(100);
const COARSE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Stopped,
    TimedOut,
    Interrupted,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::TimedOut | Status::Interrupted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced,
    TimedOut,
    Ignored,
}

/// A single countdown. `elapsed` only moves forward, in whole tick
/// intervals, and is frozen at `total` once the countdown times out.
#[derive(Debug, Clone)]
pub struct Countdown {
    name: String,
    total: Duration,
    elapsed: Duration,
    interval: Duration,
    status: Status,
}

impl Countdown {
    pub fn new(name: impl Into<String>, total: Duration) -> Self {
        Countdown {
            name: name.into(),
            total,
            elapsed: Duration::ZERO,
            interval: tick_interval(total),
            status: Status::Running,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn total(&self) -> Duration {
        self.total
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn remaining(&self) -> Duration {
        self.total.saturating_sub(self.elapsed)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Fraction of the countdown that has elapsed, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        let total_ms = self.total.as_millis();
        if total_ms == 0 {
            return if self.elapsed >= self.total { 1.0 } else { 0.0 };
        }
        let elapsed_ms = self.elapsed.as_millis().min(total_ms);
        elapsed_ms as f64 / total_ms as f64
    }

    pub fn on_tick(&mut self) -> TickOutcome {
        if self.status != Status::Running {
            return TickOutcome::Ignored;
        }

        self.elapsed += self.interval;
        if self.elapsed >= self.total {
            self.elapsed = self.total;
            self.status = Status::TimedOut;
            return TickOutcome::TimedOut;
        }
        TickOutcome::Advanced
    }

    /// Flips between running and stopped. Returns `false` once the
    /// countdown has finished.
    pub fn toggle_pause(&mut self) -> bool {
        self.status = match self.status {
            Status::Running => Status::Stopped,
            Status::Stopped => Status::Running,
            Status::TimedOut | Status::Interrupted => return false,
        };
        true
    }

    pub fn interrupt(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = Status::Interrupted;
        true
    }
}

/// Short countdowns tick ten times a second so the bar moves smoothly.
pub fn tick_interval(total: Duration) -> Duration {
    if total < Duration::from_secs(60) {
        FINE_INTERVAL
    } else {
        COARSE_INTERVAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_end(c: &mut Countdown) -> usize {
        let mut ticks = 0;
        while c.on_tick() != TickOutcome::TimedOut {
            ticks += 1;
            assert!(ticks < 1_000_000);
        }
        ticks + 1
    }

    #[test]
    fn short_timers_tick_fast() {
        assert_eq!(tick_interval(Duration::from_secs(59)), Duration::from_millis(100));
        assert_eq!(tick_interval(Duration::from_secs(60)), Duration::from_secs(1));
        assert_eq!(tick_interval(Duration::from_secs(1500)), Duration::from_secs(1));
    }

    #[test]
    fn progress_endpoints_are_exact() {
        for secs in [1, 7, 59, 60, 61, 1500, 5415] {
            let mut c = Countdown::new("t", Duration::from_secs(secs));
            assert_eq!(c.progress(), 0.0);
            run_to_end(&mut c);
            assert_eq!(c.progress(), 1.0);
        }
    }

    #[test]
    fn progress_is_ratio_of_millis() {
        let mut c = Countdown::new("t", Duration::from_secs(4));
        for _ in 0..10 {
            c.on_tick();
        }
        assert_eq!(c.elapsed(), Duration::from_secs(1));
        assert_eq!(c.progress(), 0.25);
    }

    #[test]
    fn elapsed_never_exceeds_total() {
        let mut c = Countdown::new("t", Duration::from_millis(250));
        let mut last = Duration::ZERO;
        for _ in 0..10 {
            c.on_tick();
            assert!(c.elapsed() >= last);
            assert!(c.elapsed() <= c.total());
            last = c.elapsed();
        }
        assert_eq!(c.elapsed(), Duration::from_millis(250));
        assert_eq!(c.status(), Status::TimedOut);
    }

    #[test]
    fn times_out_on_exact_boundary() {
        let mut c = Countdown::new("t", Duration::from_secs(3));
        assert_eq!(run_to_end(&mut c), 30);
        assert_eq!(c.remaining(), Duration::ZERO);
    }

    #[test]
    fn ticks_after_timeout_are_ignored() {
        let mut c = Countdown::new("t", Duration::from_millis(100));
        assert_eq!(c.on_tick(), TickOutcome::TimedOut);
        assert_eq!(c.on_tick(), TickOutcome::Ignored);
        assert_eq!(c.elapsed(), Duration::from_millis(100));
    }

    #[test]
    fn paused_countdown_ignores_ticks() {
        let mut c = Countdown::new("t", Duration::from_secs(120));
        c.on_tick();
        assert!(c.toggle_pause());
        assert_eq!(c.status(), Status::Stopped);
        assert_eq!(c.on_tick(), TickOutcome::Ignored);
        assert_eq!(c.elapsed(), Duration::from_secs(1));

        assert!(c.toggle_pause());
        assert_eq!(c.status(), Status::Running);
        assert_eq!(c.on_tick(), TickOutcome::Advanced);
        assert_eq!(c.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn interrupt_is_terminal() {
        let mut c = Countdown::new("t", Duration::from_secs(10));
        c.on_tick();
        assert!(c.interrupt());
        assert_eq!(c.status(), Status::Interrupted);
        assert_eq!(c.on_tick(), TickOutcome::Ignored);
        assert!(!c.toggle_pause());
        assert!(!c.interrupt());
        assert_eq!(c.elapsed(), Duration::from_millis(100));
    }

    #[test]
    fn interrupt_can_stop_a_paused_countdown() {
        let mut c = Countdown::new("t", Duration::from_secs(10));
        c.toggle_pause();
        assert!(c.interrupt());
        assert_eq!(c.status(), Status::Interrupted);
    }

    #[test]
    fn timed_out_cannot_be_interrupted() {
        let mut c = Countdown::new("t", Duration::from_millis(100));
        c.on_tick();
        assert!(!c.interrupt());
        assert_eq!(c.status(), Status::TimedOut);
    }
}
