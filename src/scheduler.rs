use std::time::{Duration, Instant};

/// "Every `interval`, call advance()" as seen by the session.
///
/// The front-end polls [`Ticker::due`] from its event loop; tests fire ticks
/// by hand.
pub trait Ticker {
    fn start(&mut self, interval: Duration);
    fn stop(&mut self);
    fn is_active(&self) -> bool;
    /// True when a tick should be delivered now. Re-arms for the next one.
    fn due(&mut self, now: Instant) -> bool;
    /// Time until the next tick, `None` while stopped.
    fn until_next(&self, now: Instant) -> Option<Duration>;
}

#[derive(Debug, Default)]
pub struct IntervalTicker {
    interval: Duration,
    next: Option<Instant>,
}

impl IntervalTicker {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ticker for IntervalTicker {
    fn start(&mut self, interval: Duration) {
        self.interval = interval;
        self.next = Some(Instant::now() + interval);
    }

    fn stop(&mut self) {
        self.next = None;
    }

    fn is_active(&self) -> bool {
        self.next.is_some()
    }

    fn due(&mut self, now: Instant) -> bool {
        match self.next {
            Some(deadline) if now >= deadline => {
                // late polls deliver one tick, not a burst
                let base = if now.duration_since(deadline) >= self.interval {
                    now
                } else {
                    deadline
                };
                self.next = Some(base + self.interval);
                true
            }
            _ => false,
        }
    }

    fn until_next(&self, now: Instant) -> Option<Duration> {
        self.next.map(|deadline| deadline.saturating_duration_since(now))
    }
}

/// Ticker driven by hand, for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualTicker {
    active: bool,
    pending: usize,
}

#[cfg(test)]
impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `count` ticks. Ignored while stopped, like a real timer.
    pub fn fire(&mut self, count: usize) {
        if self.active {
            self.pending += count;
        }
    }
}

#[cfg(test)]
impl Ticker for ManualTicker {
    fn start(&mut self, _interval: Duration) {
        self.active = true;
    }

    fn stop(&mut self) {
        self.active = false;
        self.pending = 0;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn due(&mut self, _now: Instant) -> bool {
        if self.active && self.pending > 0 {
            self.pending -= 1;
            true
        } else {
            false
        }
    }

    fn until_next(&self, _now: Instant) -> Option<Duration> {
        self.active.then_some(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_ticker_is_due_after_interval() {
        let mut ticker = IntervalTicker::new();
        assert!(!ticker.is_active());
        ticker.start(Duration::from_millis(1000));
        let start = Instant::now();
        assert!(!ticker.due(start));
        assert!(ticker.due(start + Duration::from_millis(1100)));
        assert!(!ticker.due(start + Duration::from_millis(1200)));
        assert!(ticker.due(start + Duration::from_millis(2100)));
    }

    #[test]
    fn late_poll_delivers_a_single_tick() {
        let mut ticker = IntervalTicker::new();
        ticker.start(Duration::from_millis(1000));
        let late = Instant::now() + Duration::from_secs(10);
        assert!(ticker.due(late));
        assert!(!ticker.due(late));
    }

    #[test]
    fn stopped_ticker_is_never_due() {
        let mut ticker = IntervalTicker::new();
        ticker.start(Duration::from_millis(10));
        ticker.stop();
        assert!(!ticker.due(Instant::now() + Duration::from_secs(1)));
        assert_eq!(ticker.until_next(Instant::now()), None);
    }

    #[test]
    fn manual_ticker_only_fires_while_active() {
        let mut ticker = ManualTicker::new();
        ticker.fire(2);
        assert!(!ticker.due(Instant::now()));
        ticker.start(Duration::from_secs(1));
        ticker.fire(2);
        assert!(ticker.due(Instant::now()));
        assert!(ticker.due(Instant::now()));
        assert!(!ticker.due(Instant::now()));
    }
}
