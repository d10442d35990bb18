use tracing::debug;

/// Why a run stopped. Both producers funnel into the same idempotent stop
/// request; whichever arrives first wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The playback-linked cutoff deadline expired.
    CutoffTimer,
    /// The stimulus reached its natural end.
    MediaEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Terminated,
}

/// Opaque handle to a scheduled display callback, held only so the loop can
/// cancel its one outstanding request at termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest(u64);

impl FrameRequest {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Seam between the frame loop and the host's display-synchronized
/// callback source. The winit host maps `request_frame` to a redraw
/// request; tests use a recording implementation.
pub trait FrameScheduler {
    /// Request exactly one display-synchronized callback.
    fn request_frame(&mut self) -> FrameRequest;

    /// Cancel a previously issued request. Best effort: hosts without
    /// cancellation may ignore it, since a callback arriving after
    /// termination is skipped anyway.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// What a stop request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopEffect {
    /// Accepted while idle: the run terminated on the spot.
    Terminated(StopReason),
    /// Accepted while running: the next tick observes it.
    Deferred,
    /// Already stopping or terminated; no effect.
    Ignored,
}

/// Disposition of one display callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Not running; nothing to do this callback.
    Skip,
    /// The next frame is already requested; do this tick's render and
    /// record work now.
    Run,
    /// A stop was observed: the pending request is cancelled and the run
    /// is terminated, with no render or record work this tick.
    Terminated(StopReason),
}

/// The display-synchronized run loop: `Idle` until the activation gesture,
/// `Running` while frames are scheduled, `Terminated` once a stop request
/// is observed.
///
/// While running there is never more than one outstanding frame request,
/// and each tick requests its successor *before* doing any work, so the
/// run is self-sustaining and a stop takes effect at the next callback
/// rather than one frame later.
#[derive(Debug, Default)]
pub struct FrameLoop {
    state: RunState,
    pending: Option<FrameRequest>,
    stop: Option<StopReason>,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn pending(&self) -> Option<FrameRequest> {
        self.pending
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    /// Idle to Running; requests the first frame. Activation is idempotent:
    /// anything but `Idle` leaves the loop untouched.
    pub fn activate<S: FrameScheduler>(&mut self, scheduler: &mut S) -> bool {
        if self.state != RunState::Idle {
            return false;
        }
        self.state = RunState::Running;
        self.pending = Some(scheduler.request_frame());
        true
    }

    /// Funnel for all termination producers. The first request wins; every
    /// later one is a no-op. A stop while still idle terminates
    /// immediately, since there is no tick to observe it.
    pub fn request_stop(&mut self, reason: StopReason) -> StopEffect {
        if self.state == RunState::Terminated || self.stop.is_some() {
            debug!(?reason, "stop request ignored; already stopping");
            return StopEffect::Ignored;
        }
        self.stop = Some(reason);
        match self.state {
            RunState::Idle => {
                self.state = RunState::Terminated;
                StopEffect::Terminated(reason)
            }
            RunState::Running => StopEffect::Deferred,
            RunState::Terminated => unreachable!("terminated state handled above"),
        }
    }

    /// One display callback. On `Tick::Run` the next frame has already
    /// been requested when this returns; the caller performs the tick's
    /// render and record work afterwards.
    pub fn begin_frame<S: FrameScheduler>(&mut self, scheduler: &mut S) -> Tick {
        if self.state != RunState::Running {
            return Tick::Skip;
        }
        if let Some(reason) = self.stop {
            if let Some(request) = self.pending.take() {
                scheduler.cancel_frame(request);
            }
            self.state = RunState::Terminated;
            return Tick::Terminated(reason);
        }
        self.pending = Some(scheduler.request_frame());
        Tick::Run
    }
}
