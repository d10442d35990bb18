pub mod geometry;
pub mod playback;
pub mod pointer;
pub mod record;

pub use geometry::{Geometry, OverlayStyle, Point};
pub use playback::Playback;
pub use pointer::PointerCell;
pub use record::{KinematicRecord, TrialResult};
