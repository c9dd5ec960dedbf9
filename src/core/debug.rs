//! Frame statistics and the fail-fast check primitive

use std::collections::VecDeque;
use std::time::Duration;

/// Check a condition that must hold for the engine state to stay coherent.
///
/// Logs the failing condition with its source location, then panics in debug
/// builds. Release builds log and continue; the macro evaluates to the
/// condition so callers can bail out of the current operation:
///
/// ```ignore
/// if !debug_check!(world.is_alive(entity), "stale handle {:?}", entity) {
///     return;
/// }
/// ```
#[macro_export]
macro_rules! debug_check {
    ($cond:expr, $($msg:tt)+) => {{
        let ok = $cond;
        if !ok {
            log::error!(
                "check failed: `{}` at {}:{}: {}",
                stringify!($cond),
                file!(),
                line!(),
                format_args!($($msg)+)
            );
            if cfg!(debug_assertions) {
                panic!(
                    "check failed: `{}`: {}",
                    stringify!($cond),
                    format_args!($($msg)+)
                );
            }
        }
        ok
    }};
}

/// Frame statistics tracker
#[derive(Debug)]
pub struct FrameStats {
    /// Frame time history for averaging
    frame_times: VecDeque<Duration>,
    /// Maximum samples to keep
    max_samples: usize,
    /// Current FPS
    fps: f32,
    /// Average frame time in milliseconds
    avg_frame_time_ms: f32,
    /// Total frames stepped
    total_frames: u64,
}

impl FrameStats {
    /// Create a new frame stats tracker
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(120),
            max_samples: 120,
            fps: 0.0,
            avg_frame_time_ms: 0.0,
            total_frames: 0,
        }
    }

    /// Record a frame with the given delta time
    pub fn record_frame(&mut self, delta: Duration) {
        self.total_frames += 1;

        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(delta);

        self.update_stats();
    }

    fn update_stats(&mut self) {
        if self.frame_times.is_empty() {
            return;
        }

        let total: Duration = self.frame_times.iter().sum();
        let count = self.frame_times.len() as f32;
        let total_secs = total.as_secs_f32();

        // Guard against division by zero
        if total_secs > 0.0 {
            self.avg_frame_time_ms = (total_secs / count) * 1000.0;
            self.fps = count / total_secs;
        } else {
            self.avg_frame_time_ms = 0.0;
            self.fps = 0.0;
        }
    }

    /// Get current FPS
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Get average frame time in milliseconds
    pub fn avg_frame_time_ms(&self) -> f32 {
        self.avg_frame_time_ms
    }

    /// Get total frames stepped
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// Get a formatted stats string
    pub fn format_stats(&self) -> String {
        format!(
            "FPS: {:.1} | Frame: {:.2}ms",
            self.fps, self.avg_frame_time_ms
        )
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new()
    }
}
