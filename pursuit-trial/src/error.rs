use thiserror::Error;

/// Fatal configuration errors, detected before any frame is scheduled.
///
/// Boundary conditions (zero-size surface, missing offsets) degenerate to
/// valid defaults instead of erroring; see the engine constructor.
#[derive(Debug, Error)]
pub enum TrialError {
    #[error("trial has no stimulus sources")]
    NoSources,
}
