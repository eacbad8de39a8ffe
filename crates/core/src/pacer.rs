//! Frame pacing
//!
//! Holds the worker loop to the content's frame rate times the speed
//! multiplier. Best effort: a simulation step that overruns its frame time is not
//! compensated.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct FramePacer {
    checkpoint: Option<Instant>,
    multiplier: f64,
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new()
    }
}

impl FramePacer {
    pub fn new() -> Self {
        Self {
            checkpoint: None,
            multiplier: 1.0,
        }
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Set the speed multiplier. Non-positive values reset it to 1.0.
    pub fn set_multiplier(&mut self, multiplier: f64) {
        self.multiplier = if multiplier.is_finite() && multiplier > 0.0 {
            multiplier
        } else {
            1.0
        };
    }

    /// Target duration of one frame, `None` for an unusable rate
    pub fn target(fps: f64, multiplier: f64) -> Option<Duration> {
        let rate = fps * multiplier;
        (rate.is_finite() && rate > 0.0).then(|| Duration::from_secs_f64(1.0 / rate))
    }

    /// Sleep still owed for a frame: `max(0, target - elapsed)`
    pub fn remaining(target: Duration, elapsed: Duration) -> Duration {
        target.saturating_sub(elapsed)
    }

    /// Sleep out the rest of the current frame
    ///
    /// Measures from the previous call. The first call after construction or
    /// [`reset`](Self::reset) only starts the clock. Returns the time slept.
    pub fn hold(&mut self, fps: f64) -> Duration {
        let slept = match (self.checkpoint, Self::target(fps, self.multiplier)) {
            (Some(last), Some(target)) => {
                let remaining = Self::remaining(target, last.elapsed());
                if !remaining.is_zero() {
                    std::thread::sleep(remaining);
                }
                remaining
            }
            _ => Duration::ZERO,
        };
        self.checkpoint = Some(Instant::now());
        slept
    }

    /// Forget the previous frame, e.g. after a pause
    pub fn reset(&mut self) {
        self.checkpoint = None;
    }
}
