use pursuit_core::KinematicRecord;

const NS_PER_MS: f64 = 1_000_000.0;

#[derive(Debug, Clone, Copy)]
struct RunTimestamps {
    start_ns: u64,
    previous_ns: u64,
}

/// Accumulates the per-frame kinematic trace of a run.
///
/// The first frame only establishes the run's start and previous
/// timestamps; interval and elapsed samples begin with the second frame.
/// The displacement magnitude is sampled on every frame including the
/// first, so `magnitudes` ends one entry longer than the timing sequences.
/// That asymmetry is inherited from previously recorded traces and is kept
/// so old and new data stay comparable.
#[derive(Debug, Default)]
pub struct KinematicRecorder {
    timestamps: Option<RunTimestamps>,
    record: KinematicRecord,
}

impl KinematicRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// One completed frame at `now_ns` with the pointer's displacement
    /// magnitude as read this tick.
    pub fn on_frame(&mut self, now_ns: u64, magnitude: f64) {
        self.record.magnitudes.push(magnitude);
        match &mut self.timestamps {
            None => {
                self.timestamps = Some(RunTimestamps {
                    start_ns: now_ns,
                    previous_ns: now_ns,
                });
            }
            Some(ts) => {
                self.record
                    .frame_intervals_ms
                    .push(now_ns.saturating_sub(ts.previous_ns) as f64 / NS_PER_MS);
                self.record
                    .elapsed_ms
                    .push(now_ns.saturating_sub(ts.start_ns) as f64 / NS_PER_MS);
                ts.previous_ns = now_ns;
            }
        }
    }

    pub fn frame_count(&self) -> usize {
        self.record.frame_count()
    }

    /// The run's start timestamp, set lazily by the first frame.
    pub fn start_ns(&self) -> Option<u64> {
        self.timestamps.map(|ts| ts.start_ns)
    }

    pub fn record(&self) -> &KinematicRecord {
        &self.record
    }

    pub fn into_record(self) -> KinematicRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_contributes_no_timing_samples() {
        let mut recorder = KinematicRecorder::new();
        recorder.on_frame(1_000_000, 3.0);
        let record = recorder.record();
        assert!(record.frame_intervals_ms.is_empty());
        assert!(record.elapsed_ms.is_empty());
        assert_eq!(record.magnitudes, vec![3.0]);
        assert_eq!(recorder.start_ns(), Some(1_000_000));
    }

    #[test]
    fn intervals_and_elapsed_track_from_the_second_frame() {
        // first frame at T0, then T0+16ms and T0+34ms
        let t0 = 5_000_000u64;
        let mut recorder = KinematicRecorder::new();
        recorder.on_frame(t0, 0.0);
        recorder.on_frame(t0 + 16_000_000, 1.0);
        recorder.on_frame(t0 + 34_000_000, 2.0);

        let record = recorder.into_record();
        assert_eq!(record.frame_intervals_ms, vec![16.0, 18.0]);
        assert_eq!(record.elapsed_ms, vec![16.0, 34.0]);
        assert_eq!(record.magnitudes.len(), 3);
        assert!(record.is_consistent());
    }

    #[test]
    fn elapsed_is_the_running_sum_of_intervals() {
        let mut recorder = KinematicRecorder::new();
        let mut now = 0u64;
        recorder.on_frame(now, 0.0);
        for step in [16_700_000u64, 16_600_000, 17_100_000, 16_400_000] {
            now += step;
            recorder.on_frame(now, 0.0);
        }
        let record = recorder.into_record();
        let mut sum = 0.0;
        for (interval, elapsed) in record
            .frame_intervals_ms
            .iter()
            .zip(record.elapsed_ms.iter())
        {
            sum += interval;
            assert!((sum - elapsed).abs() < 1e-9);
        }
    }

    #[test]
    fn sequences_keep_the_inherited_length_asymmetry() {
        let mut recorder = KinematicRecorder::new();
        for frame in 0..10u64 {
            recorder.on_frame(frame * 16_000_000, frame as f64);
        }
        let record = recorder.into_record();
        assert_eq!(record.magnitudes.len(), 10);
        assert_eq!(record.frame_intervals_ms.len(), 9);
        assert_eq!(record.elapsed_ms.len(), 9);
    }
}
