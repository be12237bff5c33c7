//! Frame clock driving [`Scene::update`]
//!
//! Turns wall-clock frame intervals into the `dt` handed to the scene.
//! Long stalls (a debugger break, a blocking load) are clamped so animation
//! playback does not jump, and the clock can be paused, scaled or locked to
//! a fixed step for deterministic runs.

use std::time::{Duration, Instant};

use crate::scene::Scene;

/// Longest interval a single frame may report, in seconds
pub const DEFAULT_MAX_DELTA: f32 = 0.25;

/// Scene time source
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_tick: Option<Instant>,
    max_delta: f32,
    time_scale: f32,
    fixed_step: Option<f32>,
    paused: bool,
    frame_count: u64,
    scene_time: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Real-time clock with the default clamp
    pub const fn new() -> Self {
        Self {
            last_tick: None,
            max_delta: DEFAULT_MAX_DELTA,
            time_scale: 1.0,
            fixed_step: None,
            paused: false,
            frame_count: 0,
            scene_time: 0.0,
        }
    }

    /// Clock that reports `step` seconds every frame regardless of wall time
    pub const fn fixed(step: f32) -> Self {
        let mut clock = Self::new();
        clock.fixed_step = Some(step);
        clock
    }

    /// Builder pattern: set the per-frame clamp
    pub const fn with_max_delta(mut self, seconds: f32) -> Self {
        self.max_delta = seconds;
        self
    }

    /// Builder pattern: set the time scale
    pub const fn with_time_scale(mut self, scale: f32) -> Self {
        self.time_scale = scale;
        self
    }

    /// Scale applied to every later frame; negative values clamp to zero
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    /// Frames report zero `dt` until resumed
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume after [`pause`](Self::pause). The paused interval is not
    /// reported to the next frame.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.last_tick = None;
        }
    }

    /// True while paused
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Frames ticked so far, paused ones included
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Accumulated scene time in seconds
    pub const fn scene_time(&self) -> f64 {
        self.scene_time
    }

    /// Start a frame at the current wall time and return its `dt`
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Start a frame at `now` and return its `dt`
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let elapsed = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);
        self.advance(elapsed)
    }

    /// Account for one frame that took `elapsed` of wall time
    pub fn advance(&mut self, elapsed: Duration) -> f32 {
        self.frame_count += 1;
        if self.paused {
            return 0.0;
        }
        let raw = self.fixed_step.unwrap_or_else(|| elapsed.as_secs_f32());
        let dt = raw.min(self.max_delta) * self.time_scale;
        self.scene_time += f64::from(dt);
        dt
    }

    /// Tick and run one [`Scene::update`] with the resulting `dt`
    pub fn update_scene(&mut self, scene: &mut Scene) -> f32 {
        let dt = self.tick();
        scene.update(dt);
        dt
    }
}
