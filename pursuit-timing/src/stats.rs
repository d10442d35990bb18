use std::time::Duration;

/// Rolling buffer of frame-to-frame intervals with summary statistics,
/// used by the host shell to report the effective display cadence.
#[derive(Debug, Clone)]
pub struct FrameTimeStats {
    samples_ns: Vec<u64>,
    max_samples: usize,
}

/// Summary of the observed refresh cadence, in nanoseconds.
#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSummary {
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub effective_fps: f64,
}

impl FrameTimeStats {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples_ns: Vec::with_capacity(max_samples),
            max_samples,
        }
    }

    pub fn record(&mut self, interval: Duration) {
        if self.samples_ns.len() >= self.max_samples {
            self.samples_ns.remove(0);
        }
        self.samples_ns.push(interval.as_nanos() as u64);
    }

    pub fn len(&self) -> usize {
        self.samples_ns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples_ns.is_empty()
    }

    pub fn summary(&self) -> RefreshSummary {
        if self.samples_ns.is_empty() {
            return RefreshSummary {
                average_frame_time_ns: 0.0,
                jitter_ns: 0.0,
                min_frame_time_ns: 0.0,
                max_frame_time_ns: 0.0,
                effective_fps: 0.0,
            };
        }
        let times: Vec<f64> = self.samples_ns.iter().map(|&ns| ns as f64).collect();
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let variance = times.iter().map(|t| (t - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = times.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        RefreshSummary {
            average_frame_time_ns: avg,
            jitter_ns: variance.sqrt(),
            min_frame_time_ns: min,
            max_frame_time_ns: max,
            effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

impl Default for FrameTimeStats {
    fn default() -> Self {
        Self::new(1000)
    }
}
