use std::time::Duration;

use tracing::debug;

/// One-shot termination deadline linked to stimulus playback.
///
/// The delay is `stop - start` in seconds of media time, with a missing
/// start offset counting as zero. With no stop offset configured the cutoff
/// never arms and termination relies solely on the stimulus's natural end.
/// Arming happens when playback actually begins; the armed deadline is
/// polled once per tick against the engine's monotonic clock and fires
/// exactly once.
#[derive(Debug, Clone)]
pub struct PlaybackCutoff {
    delay: Option<Duration>,
    deadline_ns: Option<u64>,
    fired: bool,
}

impl PlaybackCutoff {
    pub fn from_offsets(start: Option<f64>, stop: Option<f64>) -> Self {
        let delay = stop.map(|stop| {
            let span = stop - start.unwrap_or(0.0);
            // a stop at or before the effective start fires immediately
            Duration::from_secs_f64(span.max(0.0))
        });
        Self {
            delay,
            deadline_ns: None,
            fired: false,
        }
    }

    /// The configured delay, if a stop offset was given.
    pub fn delay(&self) -> Option<Duration> {
        self.delay
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ns.is_some()
    }

    /// Arm the deadline at playback start. Re-arming is a no-op.
    pub fn arm(&mut self, now_ns: u64) {
        if self.fired || self.deadline_ns.is_some() {
            return;
        }
        if let Some(delay) = self.delay {
            let deadline = now_ns.saturating_add(delay.as_nanos() as u64);
            self.deadline_ns = Some(deadline);
            debug!(delay_ms = delay.as_secs_f64() * 1e3, "playback cutoff armed");
        }
    }

    /// True exactly once, at or after the armed deadline.
    pub fn poll(&mut self, now_ns: u64) -> bool {
        match self.deadline_ns {
            Some(deadline) if !self.fired && now_ns >= deadline => {
                self.fired = true;
                true
            }
            _ => false,
        }
    }
}
