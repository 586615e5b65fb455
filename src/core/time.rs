//! Frame timing and update throttling

use std::time::{Duration, Instant};

/// Tracks frame timing and calculates FPS
pub struct FrameTimer {
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    fps_timer: Instant,
    fps: f32,
    fps_frame_count: u32,
}

impl FrameTimer {
    /// Create a new frame timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            fps_timer: now,
            fps: 0.0,
            fps_frame_count: 0,
        }
    }

    /// Call once per frame to update timing.
    ///
    /// Returns `true` when the FPS estimate was refreshed this frame
    /// (once per second).
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.frame_count += 1;
        self.fps_frame_count += 1;

        let fps_elapsed = now - self.fps_timer;
        if fps_elapsed >= Duration::from_secs(1) {
            self.fps = self.fps_frame_count as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = 0;
            self.fps_timer = now;
            return true;
        }
        false
    }

    /// Get delta time in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get current FPS (updated every second)
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Gate that opens at most once per fixed interval.
///
/// The first call to [`UpdateThrottle::ready`] always opens.
#[derive(Clone, Debug)]
pub struct UpdateThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl UpdateThrottle {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }

    /// Returns `true` and restarts the interval if at least `interval`
    /// has passed since the last time the gate opened.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Force the next call to `ready` to open.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_timer_counts_frames() {
        let mut timer = FrameTimer::new();
        timer.tick();
        timer.tick();
        assert_eq!(timer.frame_count(), 2);
        assert!(timer.delta_secs() >= 0.0);
    }

    #[test]
    fn test_throttle_first_call_opens() {
        let mut throttle = UpdateThrottle::new(Duration::from_millis(200));
        assert!(throttle.ready(Instant::now()));
    }

    #[test]
    fn test_throttle_blocks_within_interval() {
        let mut throttle = UpdateThrottle::new(Duration::from_millis(200));
        let start = Instant::now();
        assert!(throttle.ready(start));
        assert!(!throttle.ready(start + Duration::from_millis(50)));
        assert!(!throttle.ready(start + Duration::from_millis(199)));
        assert!(throttle.ready(start + Duration::from_millis(200)));
    }

    #[test]
    fn test_throttle_zero_interval_always_opens() {
        let mut throttle = UpdateThrottle::new(Duration::ZERO);
        let now = Instant::now();
        assert!(throttle.ready(now));
        assert!(throttle.ready(now));
    }

    #[test]
    fn test_throttle_reset() {
        let mut throttle = UpdateThrottle::new(Duration::from_secs(60));
        let now = Instant::now();
        assert!(throttle.ready(now));
        assert!(!throttle.ready(now));
        throttle.reset();
        assert!(throttle.ready(now));
    }
}
