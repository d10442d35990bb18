//! End-to-end runs of the trial engine against a manual clock: activation,
//! a jittered pointer trajectory, and both termination producers.

use pursuit_core::{Geometry, Point};
use pursuit_timing::ManualClock;
use pursuit_trial::{
    ClickAction, FrameOutcome, FrameRequest, FrameScheduler, OverlaySink, StopReason, TrialEngine,
    TrialParams,
};
use rand::Rng;

#[derive(Default)]
struct CountingScheduler {
    next_id: u64,
    requested: u64,
    cancelled: u64,
}

impl FrameScheduler for CountingScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        self.requested += 1;
        FrameRequest::new(self.next_id)
    }

    fn cancel_frame(&mut self, _request: FrameRequest) {
        self.cancelled += 1;
    }
}

#[derive(Default)]
struct CountingSink {
    renders: u64,
}

impl OverlaySink for CountingSink {
    fn render_overlay(&mut self, _geometry: &Geometry, _pointer: Point) {
        self.renders += 1;
    }
}

fn engine_with(
    stop: Option<f64>,
) -> (TrialEngine<ManualClock>, ManualClock, CountingScheduler, CountingSink) {
    let mut params = TrialParams::new(vec!["pursuit_a.mp4".into(), "pursuit_a.webm".into()], 640, 480);
    params.stop = stop;
    let clock = ManualClock::new();
    let engine = TrialEngine::new(params, 640, 480, clock.clone()).expect("engine");
    (
        engine,
        clock,
        CountingScheduler::default(),
        CountingSink::default(),
    )
}

#[test]
fn full_run_under_the_cutoff_timer() {
    let (mut engine, clock, mut scheduler, mut sink) = engine_with(Some(3.0));
    let mut rng = rand::rng();

    // playback begins (autoplay); recording still waits for the click
    engine.playback_started();
    clock.advance_ms(120.0);
    assert_eq!(engine.frame(&mut scheduler, &mut sink), FrameOutcome::Idle);

    assert_eq!(
        engine.click(Point::new(322.0, 241.0), &mut scheduler),
        ClickAction::Activated
    );

    let mut frames = 0u64;
    let outcome = loop {
        clock.advance_ms(16.0 + rng.random_range(0.0..2.0));
        engine.pointer_moved(Point::new(
            320.0 + rng.random_range(-150.0..150.0),
            240.0 + rng.random_range(-110.0..110.0),
        ));
        match engine.frame(&mut scheduler, &mut sink) {
            FrameOutcome::Rendered => frames += 1,
            outcome => break outcome,
        }
    };

    assert_eq!(outcome, FrameOutcome::Terminated(StopReason::CutoffTimer));
    assert!(frames > 100, "3 s at ~17 ms per frame, got {frames}");
    assert_eq!(sink.renders, frames);

    let result = engine.take_result().expect("one result");
    assert_eq!(result.stimulus.len(), 2);
    assert_eq!(result.record.magnitudes.len() as u64, frames);
    assert_eq!(result.record.frame_intervals_ms.len() as u64, frames - 1);
    assert_eq!(result.record.elapsed_ms.len(), result.record.frame_intervals_ms.len());
    assert!(result.record.is_consistent());

    // elapsed is non-decreasing and the running sum of intervals
    let mut sum = 0.0f64;
    let mut last = 0.0f64;
    for (interval, elapsed) in result
        .record
        .frame_intervals_ms
        .iter()
        .zip(result.record.elapsed_ms.iter())
    {
        sum += interval;
        assert!((sum - elapsed).abs() < 1e-6);
        assert!(*elapsed >= last);
        last = *elapsed;
    }
    assert!(result.record.magnitudes.iter().all(|m| *m >= 0.0));

    // exactly one result per run
    assert_eq!(engine.take_result(), None);
    assert_eq!(engine.frame(&mut scheduler, &mut sink), FrameOutcome::Skip);
}

#[test]
fn natural_end_then_late_cutoff_delivers_one_result() {
    let (mut engine, clock, mut scheduler, mut sink) = engine_with(Some(10.0));
    engine.playback_started();
    engine.click(Point::new(320.0, 240.0), &mut scheduler);
    for _ in 0..5 {
        clock.advance_ms(16.0);
        assert_eq!(
            engine.frame(&mut scheduler, &mut sink),
            FrameOutcome::Rendered
        );
    }

    engine.request_stop(StopReason::MediaEnded);
    clock.advance_ms(16.0);
    assert_eq!(
        engine.frame(&mut scheduler, &mut sink),
        FrameOutcome::Terminated(StopReason::MediaEnded)
    );
    assert!(engine.take_result().is_some());

    // the cutoff deadline passes afterwards; nothing more happens
    clock.advance_ms(20_000.0);
    assert_eq!(engine.frame(&mut scheduler, &mut sink), FrameOutcome::Skip);
    assert_eq!(engine.take_result(), None);
}

#[test]
fn cutoff_then_late_natural_end_delivers_one_result() {
    let (mut engine, clock, mut scheduler, mut sink) = engine_with(Some(0.1));
    engine.playback_started();
    engine.click(Point::new(320.0, 240.0), &mut scheduler);
    clock.advance_ms(16.0);
    assert_eq!(
        engine.frame(&mut scheduler, &mut sink),
        FrameOutcome::Rendered
    );

    clock.advance_ms(200.0);
    assert_eq!(
        engine.frame(&mut scheduler, &mut sink),
        FrameOutcome::Terminated(StopReason::CutoffTimer)
    );
    assert!(engine.take_result().is_some());

    engine.request_stop(StopReason::MediaEnded);
    assert_eq!(engine.take_result(), None);
    assert_eq!(engine.frame(&mut scheduler, &mut sink), FrameOutcome::Skip);
}

#[test]
fn without_a_stop_offset_only_the_natural_end_terminates() {
    let (mut engine, clock, mut scheduler, mut sink) = engine_with(None);
    engine.playback_started();
    engine.click(Point::new(320.0, 240.0), &mut scheduler);

    for _ in 0..600 {
        clock.advance_ms(16.0);
        assert_eq!(
            engine.frame(&mut scheduler, &mut sink),
            FrameOutcome::Rendered
        );
    }

    engine.request_stop(StopReason::MediaEnded);
    clock.advance_ms(16.0);
    assert_eq!(
        engine.frame(&mut scheduler, &mut sink),
        FrameOutcome::Terminated(StopReason::MediaEnded)
    );
    let result = engine.take_result().unwrap();
    assert_eq!(result.record.frame_count(), 600);
}

#[test]
fn click_outside_the_radius_changes_nothing() {
    let (mut engine, clock, mut scheduler, mut sink) = engine_with(Some(3.0));
    assert_eq!(
        engine.click(Point::new(320.0, 300.0), &mut scheduler),
        ClickAction::OutsideRadius
    );
    clock.advance_ms(16.0);
    assert_eq!(engine.frame(&mut scheduler, &mut sink), FrameOutcome::Idle);
    assert_eq!(engine.record().frame_count(), 0);
    assert_eq!(scheduler.requested, 0);
    assert_eq!(sink.renders, 0);
}

#[test]
fn second_qualifying_click_starts_no_second_run() {
    let (mut engine, clock, mut scheduler, mut sink) = engine_with(None);
    engine.playback_started();
    assert_eq!(
        engine.click(Point::new(320.0, 240.0), &mut scheduler),
        ClickAction::Activated
    );
    assert_eq!(
        engine.click(Point::new(321.0, 239.0), &mut scheduler),
        ClickAction::AlreadyActive
    );
    // only the activation's first frame request is outstanding
    assert_eq!(scheduler.requested, 1);
    clock.advance_ms(16.0);
    assert_eq!(
        engine.frame(&mut scheduler, &mut sink),
        FrameOutcome::Rendered
    );
}

#[test]
fn cutoff_never_fires_when_playback_never_starts() {
    let (mut engine, clock, mut scheduler, mut sink) = engine_with(Some(0.5));
    // no playback_started call
    clock.advance_ms(60_000.0);
    assert_eq!(engine.frame(&mut scheduler, &mut sink), FrameOutcome::Idle);
    assert!(engine.take_result().is_none());
}
