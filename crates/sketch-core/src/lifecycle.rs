//! The reusable sketch lifecycle controller.
//!
//! A [`SketchController`] owns one [`Sketch`] and drives it through
//! Stopped -> Playing <-> Paused -> Stopped. Frames are self-rescheduling:
//! each frame callback checks the play flag first and only then asks the
//! [`FrameScheduler`] for the next one, so pausing or stopping never needs a
//! cancellation handle. At most one frame request is outstanding at a time.

use crate::clock::{FrameClock, FrameTime, TimeStep};
use crate::constants::{DEFAULT_HEADER_OFFSET, DEFAULT_SMOOTHING, MAX_CONSECUTIVE_FRAME_ERRORS};
use crate::pointer::{PointerAdapter, PointerInput, PointerRange, PointerState};
use crate::viewport::{ContainerMetrics, ViewportManager, ViewportSize};
use glam::Vec2;
use instant::Instant;
use thiserror::Error;

/// Requests one future frame callback (`requestAnimationFrame` on the web).
pub trait FrameScheduler {
    fn request_frame(&mut self);
}

/// Per-frame inputs handed to a sketch.
#[derive(Clone, Copy, Debug)]
pub struct FrameContext<'a> {
    pub time: FrameTime,
    pub pointer: &'a PointerState,
    pub viewport: ViewportSize,
}

/// Scene content driven by a [`SketchController`]. Construction is the
/// scene-setup step; `update` and `render` run once per frame in that order.
pub trait Sketch {
    fn resize(&mut self, viewport: &ViewportSize);
    fn update(&mut self, frame: &FrameContext<'_>) -> anyhow::Result<()>;
    fn render(&mut self, frame: &FrameContext<'_>) -> anyhow::Result<()>;

    /// Raw pointer input, delivered after the shared pointer state was updated.
    fn pointer(&mut self, _input: &PointerInput, _pointer: &PointerState, _viewport: &ViewportSize) {
    }

    /// Release GPU resources. Called exactly once, from `stop`.
    fn dispose(&mut self) {}
}

impl<S: Sketch + ?Sized> Sketch for Box<S> {
    fn resize(&mut self, viewport: &ViewportSize) {
        (**self).resize(viewport)
    }

    fn update(&mut self, frame: &FrameContext<'_>) -> anyhow::Result<()> {
        (**self).update(frame)
    }

    fn render(&mut self, frame: &FrameContext<'_>) -> anyhow::Result<()> {
        (**self).render(frame)
    }

    fn pointer(&mut self, input: &PointerInput, pointer: &PointerState, viewport: &ViewportSize) {
        (**self).pointer(input, pointer, viewport)
    }

    fn dispose(&mut self) {
        (**self).dispose()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SketchState {
    pub is_playing: bool,
    pub elapsed_time: f32,
    pub resize_listener_attached: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("sketch was stopped and disposed")]
    Disposed,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SketchOptions {
    pub time_step: TimeStep,
    pub pointer_range: PointerRange,
    pub smoothing: f32,
    pub header_offset: f32,
}

impl Default for SketchOptions {
    fn default() -> Self {
        Self {
            time_step: TimeStep::WallClock,
            pointer_range: PointerRange::Signed,
            smoothing: DEFAULT_SMOOTHING,
            header_offset: DEFAULT_HEADER_OFFSET,
        }
    }
}

/// What a frame callback did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Updated, rendered and rescheduled.
    Rendered,
    /// A sketch hook failed; the loop continues.
    Failed,
    /// Not playing; the chain ends here.
    Halted,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub frame_index: u64,
    pub last_dt: f32,
    pub fps: f32,
    pub consecutive_errors: u32,
}

type QueuedUpdate<S> = Box<dyn FnOnce(&mut S)>;

pub struct SketchController<S: Sketch> {
    sketch: Option<S>,
    state: SketchState,
    loop_state: LoopState,
    viewport: ViewportManager,
    pointer: PointerAdapter,
    clock: FrameClock,
    queue: Vec<QueuedUpdate<S>>,
    frame_pending: bool,
    last_dt: f32,
    consecutive_errors: u32,
}

impl<S: Sketch> SketchController<S> {
    pub fn new(sketch: S, options: SketchOptions) -> Self {
        Self {
            sketch: Some(sketch),
            state: SketchState::default(),
            loop_state: LoopState::Stopped,
            viewport: ViewportManager::new(options.header_offset),
            pointer: PointerAdapter::new(
                options.pointer_range,
                options.smoothing,
                options.header_offset,
            ),
            clock: FrameClock::new(options.time_step),
            queue: Vec::new(),
            frame_pending: false,
            last_dt: 0.0,
            consecutive_errors: 0,
        }
    }

    /// Measure the container and propagate the size to the sketch.
    pub fn configure(&mut self, container: &impl ContainerMetrics) -> ViewportSize {
        let size = self.viewport.configure(container);
        self.track_origin(container);
        if let Some(sketch) = self.sketch.as_mut() {
            sketch.resize(&size);
        }
        size
    }

    /// Register the resize listener at most once per sketch instance.
    /// `attach` runs only on the first call; later calls return `None`.
    pub fn on_resize<R>(&mut self, attach: impl FnOnce() -> R) -> Option<R> {
        if self.state.resize_listener_attached || self.sketch.is_none() {
            return None;
        }
        self.state.resize_listener_attached = true;
        Some(attach())
    }

    /// Re-measure and synchronously propagate a changed size.
    pub fn resize(&mut self, container: &impl ContainerMetrics) -> Option<ViewportSize> {
        if self.sketch.is_none() {
            return None;
        }
        self.track_origin(container);
        let size = self.viewport.resize(container)?;
        log::debug!(
            "[viewport] resize {}x{} @{}",
            size.width,
            size.height,
            size.pixel_ratio
        );
        if let Some(sketch) = self.sketch.as_mut() {
            sketch.resize(&size);
        }
        Some(size)
    }

    pub fn start(&mut self, scheduler: &mut dyn FrameScheduler) -> Result<(), LifecycleError> {
        if self.sketch.is_none() {
            return Err(LifecycleError::Disposed);
        }
        if self.state.is_playing {
            return Ok(());
        }
        self.clock.reset();
        self.state.is_playing = true;
        self.loop_state = LoopState::Playing;
        self.consecutive_errors = 0;
        log::info!("[loop] playing");
        self.schedule(scheduler);
        Ok(())
    }

    /// Resume after `pause`. Same as `start`.
    pub fn play(&mut self, scheduler: &mut dyn FrameScheduler) -> Result<(), LifecycleError> {
        self.start(scheduler)
    }

    /// Flip the play flag; the pending frame ends the chain.
    pub fn pause(&mut self) {
        if self.state.is_playing {
            self.state.is_playing = false;
            self.loop_state = LoopState::Paused;
            log::info!("[loop] paused");
        }
    }

    /// Toggle between playing and paused. Returns the new play flag.
    pub fn toggle(&mut self, scheduler: &mut dyn FrameScheduler) -> Result<bool, LifecycleError> {
        if self.state.is_playing {
            self.pause();
        } else {
            self.play(scheduler)?;
        }
        Ok(self.state.is_playing)
    }

    /// Halt the loop and dispose the sketch. Terminal.
    pub fn stop(&mut self) {
        let Some(mut sketch) = self.sketch.take() else {
            return;
        };
        self.queue.clear();
        self.state = SketchState::default();
        self.loop_state = LoopState::Stopped;
        sketch.dispose();
        log::info!("[loop] stopped");
    }

    fn schedule(&mut self, scheduler: &mut dyn FrameScheduler) {
        if !self.frame_pending {
            self.frame_pending = true;
            scheduler.request_frame();
        }
    }

    pub fn frame(&mut self, scheduler: &mut dyn FrameScheduler) -> FrameOutcome {
        self.frame_at(Instant::now(), scheduler)
    }

    /// One frame callback.
    pub fn frame_at(&mut self, now: Instant, scheduler: &mut dyn FrameScheduler) -> FrameOutcome {
        self.frame_pending = false;
        if !self.state.is_playing {
            return FrameOutcome::Halted;
        }
        let Some(sketch) = self.sketch.as_mut() else {
            return FrameOutcome::Halted;
        };

        let time = self.clock.tick_at(now);
        self.state.elapsed_time = time.elapsed;
        self.last_dt = time.dt;
        for update in self.queue.drain(..) {
            update(sketch);
        }
        self.pointer.step();

        let ctx = FrameContext {
            time,
            pointer: self.pointer.state(),
            viewport: self.viewport.size(),
        };
        let result = sketch.update(&ctx).and_then(|()| sketch.render(&ctx));

        let outcome = match result {
            Ok(()) => {
                self.consecutive_errors = 0;
                FrameOutcome::Rendered
            }
            Err(e) => {
                self.consecutive_errors += 1;
                log::error!("[loop] frame {} failed: {e:#}", time.frame_index);
                if self.consecutive_errors >= MAX_CONSECUTIVE_FRAME_ERRORS {
                    log::warn!(
                        "[loop] {} consecutive frame errors; pausing",
                        self.consecutive_errors
                    );
                    self.pause();
                    return FrameOutcome::Halted;
                }
                FrameOutcome::Failed
            }
        };
        self.schedule(scheduler);
        outcome
    }

    /// Re-read the container's client-space origin. Page scrolling moves it
    /// without a resize, so hosts call this before feeding pointer events.
    pub fn track_origin(&mut self, container: &impl ContainerMetrics) {
        let (x, y) = container.origin();
        self.pointer.set_origin(Vec2::new(x, y));
    }

    /// Feed a pointer event through the adapter and on to the sketch.
    pub fn pointer_event(&mut self, input: PointerInput) {
        let viewport = self.viewport.size();
        match input {
            PointerInput::Move { client } => {
                self.pointer.on_move(client, &viewport);
            }
            PointerInput::Down { client, .. } => {
                self.pointer.on_move(client, &viewport);
                self.pointer.set_down(true);
            }
            PointerInput::Up { .. } => self.pointer.set_down(false),
            PointerInput::Wheel { .. } => {}
        }
        if let Some(sketch) = self.sketch.as_mut() {
            sketch.pointer(&input, self.pointer.state(), &viewport);
        }
    }

    /// Queue a change applied at the start of the next frame.
    pub fn queue_update(&mut self, update: impl FnOnce(&mut S) + 'static) {
        if self.sketch.is_some() {
            self.queue.push(Box::new(update));
        }
    }

    /// Snap pointer smoothing onto its target. For interaction-mode changes.
    pub fn reset_pointer_smoothing(&mut self) {
        self.pointer.reset_smoothing();
    }

    pub fn sketch(&self) -> Option<&S> {
        self.sketch.as_ref()
    }

    #[inline]
    pub fn state(&self) -> &SketchState {
        &self.state
    }

    #[inline]
    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.sketch.is_none()
    }

    #[inline]
    pub fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    #[inline]
    pub fn viewport(&self) -> ViewportSize {
        self.viewport.size()
    }

    #[inline]
    pub fn pointer(&self) -> &PointerState {
        self.pointer.state()
    }

    pub fn stats(&self) -> FrameStats {
        FrameStats {
            frame_index: self.clock.frame_index(),
            last_dt: self.last_dt,
            fps: self.clock.fps(),
            consecutive_errors: self.consecutive_errors,
        }
    }
}
