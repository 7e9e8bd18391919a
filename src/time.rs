//! Frame pacing for the render loop.
//!
//! The host calls the engine once per display refresh. [`FrameThrottle`]
//! decides which of those calls actually run a frame: a call that arrives
//! sooner than the target interval after the last processed frame is
//! skipped. The remainder of the elapsed time is carried over so the
//! average rate stays at the target even when refreshes do not line up
//! with it.
//!
//! ```ignore
//! let mut throttle = FrameThrottle::new(60.0, Duration::from_millis(250));
//! if let Some(step) = throttle.tick(now) {
//!     // run one frame with `step` of simulated time
//! }
//! ```

use std::time::Duration;

/// Fixed-rate frame gate on a caller-supplied clock.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval: Duration,
    max_step: Duration,
    last: Option<Duration>,
    /// Frames processed.
    frames: u64,
    /// Calls skipped because they arrived too soon.
    skipped: u64,
}

impl FrameThrottle {
    /// Create a throttle for `fps` frames per second.
    ///
    /// `max_step` bounds the simulated time of one frame after a long gap.
    pub fn new(fps: f32, max_step: Duration) -> Self {
        let interval = if fps.is_finite() && fps > 0.0 {
            Duration::from_nanos((1e9 / f64::from(fps)).round() as u64)
        } else {
            Duration::ZERO
        };
        Self {
            interval,
            max_step,
            last: None,
            frames: 0,
            skipped: 0,
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[inline]
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Decide whether the call at `now` runs a frame.
    ///
    /// Returns the simulated time step of the frame, or `None` to skip. The
    /// first call only starts the clock and runs a zero-length frame.
    pub fn tick(&mut self, now: Duration) -> Option<Duration> {
        let Some(last) = self.last else {
            self.last = Some(now);
            self.frames += 1;
            return Some(Duration::ZERO);
        };

        let delta = now.saturating_sub(last);
        if delta < self.interval {
            self.skipped += 1;
            return None;
        }

        let remainder = if self.interval.is_zero() {
            Duration::ZERO
        } else {
            Duration::from_nanos((delta.as_nanos() % self.interval.as_nanos()) as u64)
        };
        self.last = Some(now - remainder);
        self.frames += 1;
        Some(delta.min(self.max_step))
    }

    /// Forget the last frame time, e.g. after the host was suspended.
    pub fn reset(&mut self) {
        self.last = None;
    }
}
