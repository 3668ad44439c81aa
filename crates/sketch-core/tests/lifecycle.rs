use anyhow::anyhow;
use glam::{Vec2, Vec3};
use sketch_core::constants::MAX_CONSECUTIVE_FRAME_ERRORS;
use sketch_core::{
    restore_camera, save_camera, Camera, ContainerMetrics, FrameContext, FrameOutcome,
    FrameScheduler, LifecycleError, LoopState, MemoryStore, Observed, PointerInput, PointerState,
    Sketch, SketchController, SketchOptions, TimeStep, ViewportSize,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct SpyScheduler {
    requests: usize,
}

impl FrameScheduler for SpyScheduler {
    fn request_frame(&mut self) {
        self.requests += 1;
    }
}

#[derive(Default, Debug)]
struct Log {
    updates: usize,
    renders: usize,
    resizes: Vec<ViewportSize>,
    disposed: usize,
    last_time: f32,
    pointer_events: Vec<(PointerInput, PointerState)>,
    frame_pointer: Vec<Vec2>,
    camera_at_update: Vec<Vec3>,
    restores: usize,
}

struct TestSketch {
    log: Rc<RefCell<Log>>,
    fail: bool,
    camera: Observed<Camera>,
}

impl TestSketch {
    fn on_camera_restored(&mut self) {
        self.log.borrow_mut().restores += 1;
    }
}

impl Sketch for TestSketch {
    fn resize(&mut self, viewport: &ViewportSize) {
        self.log.borrow_mut().resizes.push(*viewport);
    }

    fn update(&mut self, frame: &FrameContext<'_>) -> anyhow::Result<()> {
        if self.fail {
            return Err(anyhow!("shader exploded"));
        }
        let mut log = self.log.borrow_mut();
        log.updates += 1;
        log.last_time = frame.time.elapsed;
        log.frame_pointer.push(frame.pointer.smoothed());
        log.camera_at_update.push(self.camera.borrow().position);
        Ok(())
    }

    fn render(&mut self, _frame: &FrameContext<'_>) -> anyhow::Result<()> {
        self.log.borrow_mut().renders += 1;
        Ok(())
    }

    fn pointer(&mut self, input: &PointerInput, pointer: &PointerState, _viewport: &ViewportSize) {
        self.log.borrow_mut().pointer_events.push((*input, *pointer));
    }

    fn dispose(&mut self) {
        self.log.borrow_mut().disposed += 1;
    }
}

struct Container {
    width: f32,
    height: f32,
    dpr: f32,
}

impl ContainerMetrics for Container {
    fn css_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn device_pixel_ratio(&self) -> f32 {
        self.dpr
    }
}

/// A container whose client-space position can move, as it does on scroll.
struct Placed {
    width: f32,
    height: f32,
    origin: (f32, f32),
}

impl ContainerMetrics for Placed {
    fn css_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    fn device_pixel_ratio(&self) -> f32 {
        1.0
    }

    fn origin(&self) -> (f32, f32) {
        self.origin
    }
}

fn controller_with(
    fail: bool,
    options: SketchOptions,
) -> (SketchController<TestSketch>, Rc<RefCell<Log>>) {
    let log = Rc::new(RefCell::new(Log::default()));
    let sketch = TestSketch {
        log: Rc::clone(&log),
        fail,
        camera: Observed::new(Camera::default()),
    };
    (SketchController::new(sketch, options), log)
}

fn controller(fail: bool) -> (SketchController<TestSketch>, Rc<RefCell<Log>>) {
    controller_with(
        fail,
        SketchOptions {
            time_step: TimeStep::Fixed(0.5),
            ..SketchOptions::default()
        },
    )
}

fn smoothing_controller(factor: f32) -> (SketchController<TestSketch>, Rc<RefCell<Log>>) {
    let (mut ctl, log) = controller_with(
        false,
        SketchOptions {
            time_step: TimeStep::Fixed(0.5),
            smoothing: factor,
            header_offset: 0.0,
            ..SketchOptions::default()
        },
    );
    ctl.configure(&Container {
        width: 200.0,
        height: 100.0,
        dpr: 1.0,
    });
    (ctl, log)
}

#[test]
fn stop_after_start_schedules_no_further_frames() {
    let (mut ctl, log) = controller(false);
    let mut spy = SpyScheduler::default();
    ctl.start(&mut spy).unwrap();
    assert_eq!(spy.requests, 1);
    assert_eq!(ctl.frame(&mut spy), FrameOutcome::Rendered);
    assert_eq!(spy.requests, 2);

    ctl.stop();
    assert_eq!(ctl.frame(&mut spy), FrameOutcome::Halted);
    assert_eq!(ctl.frame(&mut spy), FrameOutcome::Halted);
    assert_eq!(spy.requests, 2);
    assert_eq!(log.borrow().renders, 1);
    assert_eq!(log.borrow().disposed, 1);
    assert_eq!(ctl.loop_state(), LoopState::Stopped);
}

#[test]
fn stop_is_terminal_and_idempotent() {
    let (mut ctl, log) = controller(false);
    let mut spy = SpyScheduler::default();
    ctl.stop();
    ctl.stop();
    assert_eq!(log.borrow().disposed, 1);
    assert_eq!(ctl.start(&mut spy), Err(LifecycleError::Disposed));
    assert_eq!(spy.requests, 0);
    assert!(ctl.is_disposed());
}

#[test]
fn repeated_start_keeps_a_single_frame_chain() {
    let (mut ctl, _log) = controller(false);
    let mut spy = SpyScheduler::default();
    ctl.start(&mut spy).unwrap();
    ctl.start(&mut spy).unwrap();
    ctl.pause();
    ctl.play(&mut spy).unwrap();
    assert_eq!(spy.requests, 1);
    assert!(ctl.frame_pending());
}

#[test]
fn pause_ends_the_chain_and_play_resumes_it() {
    let (mut ctl, log) = controller(false);
    let mut spy = SpyScheduler::default();
    ctl.start(&mut spy).unwrap();
    ctl.frame(&mut spy);
    ctl.pause();
    assert_eq!(ctl.loop_state(), LoopState::Paused);
    assert_eq!(ctl.frame(&mut spy), FrameOutcome::Halted);
    let requests = spy.requests;

    ctl.play(&mut spy).unwrap();
    assert_eq!(spy.requests, requests + 1);
    ctl.frame(&mut spy);
    assert_eq!(log.borrow().updates, 2);
    assert!((ctl.state().elapsed_time - 1.0).abs() < 1e-6);
    assert!((log.borrow().last_time - 1.0).abs() < 1e-6);
}

#[test]
fn frame_errors_are_logged_and_the_loop_survives() {
    let (mut ctl, _log) = controller(true);
    let mut spy = SpyScheduler::default();
    ctl.start(&mut spy).unwrap();
    assert_eq!(ctl.frame(&mut spy), FrameOutcome::Failed);
    assert!(ctl.is_playing());
    assert_eq!(spy.requests, 2);
    assert_eq!(ctl.stats().consecutive_errors, 1);
}

#[test]
fn a_long_run_of_errors_pauses_the_loop() {
    let (mut ctl, _log) = controller(true);
    let mut spy = SpyScheduler::default();
    ctl.start(&mut spy).unwrap();
    let mut last = FrameOutcome::Rendered;
    for _ in 0..MAX_CONSECUTIVE_FRAME_ERRORS {
        last = ctl.frame(&mut spy);
    }
    assert_eq!(last, FrameOutcome::Halted);
    assert_eq!(ctl.loop_state(), LoopState::Paused);
    assert!(!ctl.frame_pending());
}

#[test]
fn queued_updates_apply_before_the_next_update() {
    let (mut ctl, _log) = controller(false);
    let mut spy = SpyScheduler::default();
    ctl.queue_update(|s| s.fail = true);
    ctl.start(&mut spy).unwrap();
    assert_eq!(ctl.frame(&mut spy), FrameOutcome::Failed);
}

#[test]
fn resize_twice_with_same_container_is_idempotent() {
    let (mut ctl, log) = controller(false);
    let container = Container {
        width: 1280.0,
        height: 720.0,
        dpr: 3.0,
    };
    ctl.configure(&Container {
        width: 10.0,
        height: 10.0,
        dpr: 1.0,
    });
    let first = ctl.resize(&container);
    let size_once = ctl.viewport();
    let second = ctl.resize(&container);
    assert!(first.is_some());
    assert!(second.is_none());
    assert_eq!(ctl.viewport(), size_once);
    assert_eq!(size_once.backing_size(), (2560, 1440));
    assert!((size_once.aspect() - 16.0 / 9.0).abs() < 1e-6);
    assert_eq!(log.borrow().resizes.len(), 2);
}

#[test]
fn resize_listener_is_attached_once() {
    let (mut ctl, _log) = controller(false);
    let mut attached = 0;
    assert_eq!(ctl.on_resize(|| attached += 1), Some(()));
    assert_eq!(ctl.on_resize(|| attached += 1), None);
    assert_eq!(attached, 1);
    assert!(ctl.state().resize_listener_attached);
}

#[test]
fn pointer_origin_follows_the_container_after_scrolling() {
    let (mut ctl, _log) = smoothing_controller(0.5);
    let mut container = Placed {
        width: 800.0,
        height: 600.0,
        origin: (0.0, 500.0),
    };
    ctl.configure(&container);
    ctl.pointer_event(PointerInput::Move {
        client: Vec2::new(400.0, 800.0),
    });
    assert_eq!(ctl.pointer().normalized(), Vec2::ZERO);

    // scrolled: same size, so no resize fires
    container.origin = (0.0, 0.0);
    ctl.track_origin(&container);
    ctl.pointer_event(PointerInput::Move {
        client: Vec2::new(400.0, 300.0),
    });
    assert_eq!(ctl.pointer().normalized(), Vec2::ZERO);
    assert!(ctl.resize(&container).is_none());
}

#[test]
fn pointer_events_reach_the_sketch_with_updated_state() {
    let (mut ctl, log) = smoothing_controller(0.5);
    ctl.pointer_event(PointerInput::Move {
        client: Vec2::new(150.0, 25.0),
    });
    ctl.pointer_event(PointerInput::Down {
        client: Vec2::new(50.0, 25.0),
        button: 0,
    });
    assert!(ctl.pointer().down);
    ctl.pointer_event(PointerInput::Up {
        client: Vec2::new(50.0, 25.0),
    });
    ctl.pointer_event(PointerInput::Wheel { delta_y: 120.0 });

    let log = log.borrow();
    let events = &log.pointer_events;
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].1.normalized(), Vec2::new(0.5, 0.5));
    assert!(matches!(events[1].0, PointerInput::Down { button: 0, .. }));
    assert_eq!(events[1].1.normalized(), Vec2::new(-0.5, 0.5));
    assert!(events[1].1.down);
    assert!(!events[2].1.down);
    assert_eq!(events[3].0, PointerInput::Wheel { delta_y: 120.0 });
    assert_eq!(events[3].1.target(), Vec2::new(-0.5, 0.5));
}

#[test]
fn each_frame_advances_pointer_smoothing_by_the_factor() {
    let (mut ctl, log) = smoothing_controller(0.25);
    let mut spy = SpyScheduler::default();
    ctl.pointer_event(PointerInput::Move {
        client: Vec2::new(200.0, 0.0),
    });
    assert_eq!(ctl.pointer().target(), Vec2::new(1.0, 1.0));
    assert_eq!(ctl.pointer().smoothed(), Vec2::ZERO);

    ctl.start(&mut spy).unwrap();
    ctl.frame(&mut spy);
    assert_eq!(ctl.pointer().smoothed(), Vec2::splat(0.25));
    ctl.frame(&mut spy);
    assert_eq!(ctl.pointer().smoothed(), Vec2::splat(0.4375));
    assert_eq!(
        log.borrow().frame_pointer,
        vec![Vec2::splat(0.25), Vec2::splat(0.4375)]
    );
}

#[test]
fn pointer_smoothing_snaps_only_on_reset() {
    let (mut ctl, _log) = smoothing_controller(0.1);
    let mut spy = SpyScheduler::default();
    ctl.start(&mut spy).unwrap();
    ctl.pointer_event(PointerInput::Move {
        client: Vec2::new(0.0, 100.0),
    });
    ctl.frame(&mut spy);
    assert_ne!(ctl.pointer().smoothed(), ctl.pointer().target());

    ctl.pointer_event(PointerInput::Move {
        client: Vec2::new(200.0, 0.0),
    });
    assert_ne!(ctl.pointer().smoothed(), ctl.pointer().target());
    ctl.reset_pointer_smoothing();
    assert_eq!(ctl.pointer().smoothed(), Vec2::new(1.0, 1.0));
}

#[test]
fn queued_camera_restore_lands_before_the_next_update() {
    let (mut ctl, log) = controller(false);
    let mut spy = SpyScheduler::default();
    let mut store = MemoryStore::new();
    let saved = Camera::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
    save_camera(&mut store, "cam", &saved).unwrap();

    ctl.start(&mut spy).unwrap();
    ctl.frame(&mut spy);

    let camera = ctl.sketch().unwrap().camera.clone();
    let mut restored = camera.get();
    assert!(restore_camera(&store, "cam", &mut restored).unwrap().is_some());
    ctl.queue_update(move |sketch| {
        _ = camera.replace(restored);
        sketch.on_camera_restored();
    });
    assert_eq!(log.borrow().restores, 0);
    assert_eq!(
        ctl.sketch().unwrap().camera.borrow().position,
        Camera::default().position
    );

    ctl.frame(&mut spy);
    let log = log.borrow();
    assert_eq!(log.restores, 1);
    assert_eq!(
        log.camera_at_update,
        vec![Camera::default().position, Vec3::new(1.0, 2.0, 3.0)]
    );
}
