use crate::constants::{DT_MAX_SEC, DT_MIN_SEC, FIXED_TIME_STEP, FPS_BLEND_ALPHA};
use instant::Instant;
use std::time::Duration;

/// How elapsed time advances per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum TimeStep {
    /// Constant increment per frame, independent of display rate.
    Fixed(f32),
    /// Measured wall-clock delta, clamped to `[DT_MIN_SEC, DT_MAX_SEC]`.
    #[default]
    WallClock,
}

/// Frame timing snapshot handed to sketches.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Accumulated seconds while playing.
    pub elapsed: f32,
    pub frame_index: u64,
}

#[derive(Clone, Debug)]
pub struct FrameClock {
    step: TimeStep,
    last: Option<Instant>,
    elapsed: f32,
    frame_index: u64,
    fps: f32,
}

impl FrameClock {
    pub fn new(step: TimeStep) -> Self {
        Self {
            step,
            last: None,
            elapsed: 0.0,
            frame_index: 0,
            fps: 0.0,
        }
    }

    pub fn fixed() -> Self {
        Self::new(TimeStep::Fixed(FIXED_TIME_STEP))
    }

    pub fn wall_clock() -> Self {
        Self::new(TimeStep::WallClock)
    }

    /// Forget the previous timestamp so the next tick measures no gap.
    /// Called when resuming from pause.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let dt = match self.step {
            TimeStep::Fixed(step) => step.max(0.0),
            TimeStep::WallClock => match self.last {
                Some(prev) => {
                    let gap = if now >= prev {
                        now - prev
                    } else {
                        Duration::ZERO
                    };
                    gap.as_secs_f32().clamp(DT_MIN_SEC, DT_MAX_SEC)
                }
                None => 0.0,
            },
        };
        self.last = Some(now);
        self.elapsed += dt;
        if dt > 0.0 {
            let instant_fps = 1.0 / dt;
            self.fps = if self.fps == 0.0 {
                instant_fps
            } else {
                (1.0 - FPS_BLEND_ALPHA) * self.fps + FPS_BLEND_ALPHA * instant_fps
            };
        }
        let ft = FrameTime {
            dt,
            elapsed: self.elapsed,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        ft
    }

    #[inline]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    #[inline]
    pub fn step(&self) -> TimeStep {
        self.step
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::wall_clock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_step_ignores_wall_time() {
        let mut clock = FrameClock::new(TimeStep::Fixed(0.5));
        let t0 = Instant::now();
        clock.tick_at(t0);
        let ft = clock.tick_at(t0 + Duration::from_secs(10));
        assert_eq!(ft.dt, 0.5);
        assert_eq!(ft.elapsed, 1.0);
        assert_eq!(ft.frame_index, 1);
    }

    #[test]
    fn default_fixed_step_advances_by_the_constant() {
        let mut clock = FrameClock::fixed();
        let ft = clock.tick_at(Instant::now());
        assert_eq!(ft.dt, FIXED_TIME_STEP);
    }

    #[test]
    fn wall_clock_first_tick_is_zero_and_stalls_are_clamped() {
        let mut clock = FrameClock::wall_clock();
        let t0 = Instant::now();
        assert_eq!(clock.tick_at(t0).dt, 0.0);
        let ft = clock.tick_at(t0 + Duration::from_millis(16));
        assert!((ft.dt - 0.016).abs() < 1e-4);
        let ft = clock.tick_at(t0 + Duration::from_secs(5));
        assert_eq!(ft.dt, DT_MAX_SEC);
    }

    #[test]
    fn reset_drops_the_pause_gap() {
        let mut clock = FrameClock::wall_clock();
        let t0 = Instant::now();
        clock.tick_at(t0);
        clock.reset();
        let ft = clock.tick_at(t0 + Duration::from_millis(200));
        assert_eq!(ft.dt, 0.0);
    }
}
