use std::time::Instant;

use pursuit_core::Playback;

/// Wall-clock stand-in for the playable media object.
///
/// Decoding is out of scope for this shell, so the position simply advances
/// in real time while playing and the natural end fires once the configured
/// duration elapses. A real host would back this trait with its media
/// pipeline instead.
#[derive(Debug)]
pub struct ClockPlayback {
    duration_secs: f64,
    base_position: f64,
    playing_since: Option<Instant>,
}

impl ClockPlayback {
    pub fn new(duration_secs: f64) -> Self {
        Self {
            duration_secs: duration_secs.max(0.0),
            base_position: 0.0,
            playing_since: None,
        }
    }
}

impl Playback for ClockPlayback {
    fn play(&mut self) {
        if self.playing_since.is_none() && !self.has_ended() {
            self.playing_since = Some(Instant::now());
        }
    }

    fn pause(&mut self) {
        self.base_position = self.position_secs();
        self.playing_since = None;
    }

    fn seek(&mut self, seconds: f64) {
        self.base_position = seconds.clamp(0.0, self.duration_secs);
        if let Some(since) = &mut self.playing_since {
            *since = Instant::now();
        }
    }

    fn position_secs(&self) -> f64 {
        let running = self
            .playing_since
            .map(|since| since.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        (self.base_position + running).min(self.duration_secs)
    }

    fn is_playing(&self) -> bool {
        self.playing_since.is_some() && !self.has_ended()
    }

    fn has_ended(&self) -> bool {
        self.position_secs() >= self.duration_secs
    }
}
