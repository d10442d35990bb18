use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic nanosecond time source for frame timestamps and deadlines.
pub trait Clock {
    /// Nanoseconds since an arbitrary fixed origin. Never decreases.
    fn now_ns(&self) -> u64;

    fn elapsed_since(&self, earlier_ns: u64) -> Duration {
        Duration::from_nanos(self.now_ns().saturating_sub(earlier_ns))
    }
}

/// Wall clock backed by `Instant`, with sub-millisecond resolution on every
/// supported platform.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ns(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
}

/// Hand-advanced clock for deterministic tests and headless runs.
///
/// Clones share the same underlying instant, so a test can keep a handle
/// and advance time while the engine owns its copy. Single-threaded by
/// construction (`Rc`).
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ns(&self, ns: u64) {
        self.0.set(ns);
    }

    pub fn advance(&self, d: Duration) {
        self.0.set(self.0.get().saturating_add(d.as_nanos() as u64));
    }

    pub fn advance_ms(&self, ms: f64) {
        self.advance(Duration::from_secs_f64(ms / 1_000.0));
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> u64 {
        self.0.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic_clock_never_decreases() {
        let clock = MonotonicClock::new();
        let a = clock.now_ns();
        let b = clock.now_ns();
        assert!(b >= a);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance_ms(16.0);
        assert_eq!(clock.now_ns(), 16_000_000);
        handle.advance(Duration::from_millis(2));
        assert_eq!(clock.now_ns(), 18_000_000);
    }

    #[test]
    fn elapsed_since_saturates() {
        let clock = ManualClock::new();
        clock.set_ns(5);
        assert_eq!(clock.elapsed_since(10), Duration::ZERO);
    }
}
