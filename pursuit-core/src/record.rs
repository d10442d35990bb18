use serde::{Deserialize, Serialize};

/// The per-frame kinematic trace of a run: three parallel, append-only
/// sequences, one entry per completed frame.
///
/// `frame_intervals_ms` and `elapsed_ms` always have equal length; the first
/// frame only establishes the run's start timestamp and contributes no
/// timing sample, while `magnitudes` is sampled on every frame including the
/// first. A run with `n` frames therefore ends with `n - 1` timing entries
/// and `n` magnitudes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KinematicRecord {
    pub frame_intervals_ms: Vec<f64>,
    pub elapsed_ms: Vec<f64>,
    pub magnitudes: Vec<f64>,
}

impl KinematicRecord {
    /// Number of completed frames.
    pub fn frame_count(&self) -> usize {
        self.magnitudes.len()
    }

    /// Length invariant across the three sequences.
    pub fn is_consistent(&self) -> bool {
        self.frame_intervals_ms.len() == self.elapsed_ms.len()
            && if self.magnitudes.is_empty() {
                self.frame_intervals_ms.is_empty()
            } else {
                self.magnitudes.len() == self.frame_intervals_ms.len() + 1
            }
    }
}

/// The result record handed to the trial host at termination: the stimulus
/// source list and the kinematic trace. Never mutated after termination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub stimulus: Vec<String>,
    #[serde(flatten)]
    pub record: KinematicRecord,
}

impl TrialResult {
    pub fn new(stimulus: Vec<String>, record: KinematicRecord) -> Self {
        Self { stimulus, record }
    }
}
