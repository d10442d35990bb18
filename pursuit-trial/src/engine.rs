use pursuit_core::{Geometry, KinematicRecord, Point, PointerCell, TrialResult};
use pursuit_timing::Clock;
use tracing::{debug, info, warn};

use crate::config::TrialParams;
use crate::cutoff::PlaybackCutoff;
use crate::error::TrialError;
use crate::frame_loop::{FrameLoop, FrameScheduler, RunState, StopEffect, StopReason, Tick};
use crate::recorder::KinematicRecorder;
use crate::sampler::PointerSampler;

/// Per-frame drawing seam. The engine calls this exactly once per running
/// tick, after the next frame has been requested and before the kinematic
/// sample is appended.
pub trait OverlaySink {
    fn render_overlay(&mut self, geometry: &Geometry, pointer: Point);
}

/// What a click did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickAction {
    /// The click activated the run; the host must start stimulus playback
    /// and report it via `playback_started`.
    Activated,
    /// A qualifying click while already running; no effect.
    AlreadyActive,
    /// Outside the activation radius; no effect.
    OutsideRadius,
    /// The run has already terminated; no effect.
    Inactive,
}

/// What one display callback did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Awaiting activation; the host may draw the idle overlay.
    Idle,
    /// A running tick completed: overlay drawn, sample recorded.
    Rendered,
    /// The run terminated this callback; collect the result with
    /// `take_result`.
    Terminated(StopReason),
    /// Callback after termination; nothing to do.
    Skip,
}

/// The trial's run context: the shared pointer cell, the frame loop, the
/// kinematic recorder and the playback cutoff, composed around one
/// monotonic clock.
///
/// All state is trial-scoped; the engine is built when the trial's
/// interactive phase begins and dropped when the host has collected the
/// result.
pub struct TrialEngine<C: Clock> {
    params: TrialParams,
    geometry: Geometry,
    pointer: PointerCell,
    sampler: PointerSampler,
    frame_loop: FrameLoop,
    recorder: KinematicRecorder,
    cutoff: PlaybackCutoff,
    clock: C,
    result: Option<TrialResult>,
}

impl<C: Clock> TrialEngine<C> {
    /// Build the trial-scoped state from host params and the surface's
    /// realized dimensions.
    ///
    /// Fails only on configuration that leaves nothing to run; boundary
    /// geometry degenerates instead of erroring.
    pub fn new(
        params: TrialParams,
        surface_width: u32,
        surface_height: u32,
        clock: C,
    ) -> Result<Self, TrialError> {
        if params.sources.is_empty() {
            return Err(TrialError::NoSources);
        }
        let geometry = Geometry::from_surface(surface_width, surface_height, &params.overlay);
        if geometry.is_degenerate() {
            warn!(
                surface_width,
                surface_height,
                "zero-size stimulus surface; overlay geometry degenerates to a zero-radius target"
            );
        }
        let pointer = PointerCell::new(geometry.center);
        let sampler = PointerSampler::new(pointer.clone(), geometry, Point::default());
        let cutoff = PlaybackCutoff::from_offsets(params.start, params.stop);
        Ok(Self {
            params,
            geometry,
            pointer,
            sampler,
            frame_loop: FrameLoop::new(),
            recorder: KinematicRecorder::new(),
            cutoff,
            clock,
            result: None,
        })
    }

    /// Where the surface sits in viewport coordinates; pointer events are
    /// translated relative to this.
    pub fn set_surface_origin(&mut self, origin: Point) {
        self.sampler = PointerSampler::new(self.pointer.clone(), self.geometry, origin);
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn state(&self) -> RunState {
        self.frame_loop.state()
    }

    pub fn is_terminated(&self) -> bool {
        self.frame_loop.state() == RunState::Terminated
    }

    /// Latest published pointer position, surface-local.
    pub fn pointer(&self) -> Point {
        self.pointer.get()
    }

    /// The trace accumulated so far.
    pub fn record(&self) -> &KinematicRecord {
        self.recorder.record()
    }

    /// A pointer movement event in viewport coordinates.
    pub fn pointer_moved(&mut self, viewport: Point) {
        self.sampler.pointer_moved(viewport);
    }

    /// A click event in viewport coordinates. A click within the
    /// activation radius while idle starts the run; everything else is
    /// ignored.
    pub fn click<S: FrameScheduler>(&mut self, viewport: Point, scheduler: &mut S) -> ClickAction {
        if !self.sampler.click_activates(viewport) {
            debug!("click outside the activation radius; ignored");
            return ClickAction::OutsideRadius;
        }
        match self.frame_loop.state() {
            RunState::Terminated => ClickAction::Inactive,
            RunState::Running => {
                debug!("activation click while already running; ignored");
                ClickAction::AlreadyActive
            }
            RunState::Idle => {
                self.frame_loop.activate(scheduler);
                info!("activation click; run started");
                ClickAction::Activated
            }
        }
    }

    /// The host reports that stimulus playback has begun. Arms the cutoff
    /// deadline if a stop offset was configured; repeated reports are
    /// no-ops.
    pub fn playback_started(&mut self) {
        self.cutoff.arm(self.clock.now_ns());
    }

    /// Funnel for both termination producers (cutoff deadline, natural
    /// media end). All requests after the first are no-ops.
    pub fn request_stop(&mut self, reason: StopReason) {
        self.apply_stop(reason);
    }

    /// One display-synchronized callback: poll the cutoff, then run the
    /// frame-loop tick. While running, the next frame is requested first,
    /// then the overlay is drawn, then the kinematic sample is appended.
    pub fn frame<S: FrameScheduler, O: OverlaySink>(
        &mut self,
        scheduler: &mut S,
        overlay: &mut O,
    ) -> FrameOutcome {
        if self.cutoff.poll(self.clock.now_ns()) {
            if let Some(reason) = self.apply_stop(StopReason::CutoffTimer) {
                return FrameOutcome::Terminated(reason);
            }
        }
        match self.frame_loop.begin_frame(scheduler) {
            Tick::Skip => match self.frame_loop.state() {
                RunState::Idle => FrameOutcome::Idle,
                _ => FrameOutcome::Skip,
            },
            Tick::Terminated(reason) => {
                self.finish(reason);
                FrameOutcome::Terminated(reason)
            }
            Tick::Run => {
                let pointer = self.pointer.get();
                overlay.render_overlay(&self.geometry, pointer);
                let now_ns = self.clock.now_ns();
                let magnitude = self.geometry.magnitude_from_center(pointer);
                self.recorder.on_frame(now_ns, magnitude);
                FrameOutcome::Rendered
            }
        }
    }

    /// The final result record. `Some` exactly once per terminated run.
    pub fn take_result(&mut self) -> Option<TrialResult> {
        self.result.take()
    }

    fn apply_stop(&mut self, reason: StopReason) -> Option<StopReason> {
        match self.frame_loop.request_stop(reason) {
            StopEffect::Terminated(reason) => {
                self.finish(reason);
                Some(reason)
            }
            StopEffect::Deferred => {
                debug!(?reason, "stop requested; run terminates on the next tick");
                None
            }
            StopEffect::Ignored => None,
        }
    }

    fn finish(&mut self, reason: StopReason) {
        let record = std::mem::take(&mut self.recorder).into_record();
        info!(
            ?reason,
            frames = record.frame_count(),
            "trial terminated"
        );
        self.result = Some(TrialResult::new(self.params.sources.clone(), record));
    }
}
