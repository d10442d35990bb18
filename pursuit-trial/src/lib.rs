pub mod config;
pub mod cutoff;
pub mod engine;
pub mod error;
pub mod frame_loop;
pub mod recorder;
pub mod sampler;

pub use config::TrialParams;
pub use cutoff::PlaybackCutoff;
pub use engine::{ClickAction, FrameOutcome, OverlaySink, TrialEngine};
pub use error::TrialError;
pub use frame_loop::{
    FrameLoop, FrameRequest, FrameScheduler, RunState, StopEffect, StopReason, Tick,
};
pub use recorder::KinematicRecorder;
pub use sampler::PointerSampler;
