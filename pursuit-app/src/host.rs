use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use pursuit_core::TrialResult;
use tracing::info;

/// Receives the final result record. Whatever comes after the trial
/// (sequencing, persistence) belongs to the host, not to this shell.
pub trait TrialHost {
    fn finish(&mut self, result: &TrialResult) -> Result<()>;
}

/// Writes the result record as pretty-printed JSON.
pub struct JsonResultHost {
    path: PathBuf,
}

impl JsonResultHost {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TrialHost for JsonResultHost {
    fn finish(&mut self, result: &TrialResult) -> Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("cannot create result file {}", self.path.display()))?;
        serde_json::to_writer_pretty(file, result).context("failed to write trial result")?;
        info!(path = %self.path.display(), "trial result written");
        Ok(())
    }
}
