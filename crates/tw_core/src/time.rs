//! Frame timing for a display-driven loop.
//!
//! Movement is expressed in pixels per frame, so there is no fixed-step
//! accumulator: every redraw is exactly one simulation tick. `FrameClock`
//! only measures frames for diagnostics, and `FrameScheduler` makes sure a
//! new redraw is requested once per completed tick.

use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;
const SLOW_FRAME_SECS: f64 = 0.25;

pub struct FrameClock {
    pub frame_count: u64,
    pub real_dt: f64,
    last_instant: Instant,

    fps_samples: [f64; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f64,
    pub smoothed_frame_time_ms: f64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            fps_samples: [1.0 / 60.0; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 60.0,
            smoothed_frame_time_ms: 16.667,
        }
    }

    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        self.record_frame(now.duration_since(self.last_instant).as_secs_f64());
        self.last_instant = now;
    }

    fn record_frame(&mut self, dt: f64) {
        self.real_dt = dt;
        self.frame_count += 1;
        if dt > SLOW_FRAME_SECS {
            log::warn!("Frame took {:.1}ms", dt * 1000.0);
        }

        self.fps_samples[self.fps_sample_index] = dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt: f64 = self.fps_samples.iter().sum::<f64>() / FPS_SAMPLE_COUNT as f64;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Single-flight redraw scheduling: at most one frame request is outstanding,
/// and the next one can only be armed after the current tick has started.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: bool,
    ticks: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when the caller should request a redraw. Returns false
    /// while a previously armed request has not been serviced yet.
    pub fn arm(&mut self) -> bool {
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Marks the pending request as serviced. A redraw delivered without a
    /// matching `arm` (e.g. an expose event) still counts as a tick.
    pub fn begin_tick(&mut self) {
        self.pending = false;
        self.ticks += 1;
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
