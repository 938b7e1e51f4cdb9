//! Shared utilities

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Simple deterministic RNG using xorshift64
/// Reproducible sample sets for property checks without external dependencies
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) } // Ensure non-zero
    }

    /// Get the next random u64
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Get a random f64 in [0, 1)
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Get a random f64 in [min, max)
    #[inline]
    pub fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }

    /// Get a random integer in [0, bound). Returns 0 for a zero bound.
    #[inline]
    pub fn next_below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            return 0;
        }
        self.next_u64() % bound
    }
}

// ============================================================================
// Frame Clock
// ============================================================================

/// Frame pacing plus FPS statistics over a rolling window
pub struct FrameClock {
    frame_times: VecDeque<f64>,
    last_frame: Instant,
    min_interval: Duration,
    sample_count: usize,
}

impl FrameClock {
    /// `target_fps` of 0 disables throttling
    pub fn new(target_fps: u32, sample_count: usize) -> Self {
        let min_interval = if target_fps == 0 {
            Duration::ZERO
        } else {
            // Whole milliseconds, so 60 fps gives the usual 16 ms budget
            Duration::from_millis(u64::from(1000 / target_fps))
        };
        Self {
            frame_times: VecDeque::with_capacity(sample_count),
            last_frame: Instant::now(),
            min_interval,
            sample_count: sample_count.max(1),
        }
    }

    #[inline]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Time left before the next frame is due, zero if it is due now
    pub fn time_until_due(&self) -> Duration {
        self.min_interval.saturating_sub(self.last_frame.elapsed())
    }

    /// Call once a frame is about to be rendered
    /// Returns (delta_time_seconds, average_fps)
    pub fn tick(&mut self) -> (f64, f64) {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> (f64, f64) {
        let dt = now.saturating_duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;

        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.sample_count {
            self.frame_times.pop_front();
        }

        (dt, self.avg_fps())
    }

    /// Get the average frame time in milliseconds
    pub fn avg_frame_time_ms(&self) -> f64 {
        self.avg_dt() * 1000.0
    }

    pub fn avg_fps(&self) -> f64 {
        let avg_dt = self.avg_dt();
        if avg_dt > 0.0 {
            1.0 / avg_dt
        } else {
            0.0
        }
    }

    /// Get min/max FPS from sample window
    pub fn min_max_fps(&self) -> (f64, f64) {
        if self.frame_times.is_empty() {
            return (0.0, 0.0);
        }
        let min_dt = self.frame_times.iter().copied().fold(f64::INFINITY, f64::min);
        let max_dt = self.frame_times.iter().copied().fold(0.0, f64::max);
        let max_fps = if min_dt > 0.0 { 1.0 / min_dt } else { 0.0 };
        let min_fps = if max_dt > 0.0 { 1.0 / max_dt } else { 0.0 };
        (min_fps, max_fps)
    }

    /// Get total number of frames in the window
    pub fn frame_count(&self) -> usize {
        self.frame_times.len()
    }

    fn avg_dt(&self) -> f64 {
        self.frame_times.iter().sum::<f64>() / self.frame_times.len().max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rng_deterministic() {
        let mut a = Rng::new(7);
        let mut b = Rng::new(7);
        for _ in 0..32 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_rng_ranges() {
        let mut rng = Rng::new(0);
        for _ in 0..1000 {
            let f = rng.next_f64();
            assert!((0.0..1.0).contains(&f));
            let r = rng.range_f64(-2.0, 3.0);
            assert!((-2.0..3.0).contains(&r));
            assert!(rng.next_below(5) < 5);
        }
        assert_eq!(rng.next_below(0), 0);
    }

    #[test]
    fn test_frame_clock_interval() {
        assert_eq!(FrameClock::new(60, 10).min_interval(), Duration::from_millis(16));
        assert_eq!(FrameClock::new(0, 10).min_interval(), Duration::ZERO);
        assert_eq!(FrameClock::new(0, 10).time_until_due(), Duration::ZERO);
    }

    #[test]
    fn test_frame_clock_rolling_window() {
        let mut clock = FrameClock::new(60, 3);
        let start = clock.last_frame;
        for i in 1..=5 {
            clock.tick_at(start + Duration::from_millis(20 * i));
        }
        assert_eq!(clock.frame_count(), 3);
        assert_relative_eq!(clock.avg_frame_time_ms(), 20.0, max_relative = 1e-9);
        assert_relative_eq!(clock.avg_fps(), 50.0, max_relative = 1e-9);
        let (min_fps, max_fps) = clock.min_max_fps();
        assert_relative_eq!(min_fps, 50.0, max_relative = 1e-9);
        assert_relative_eq!(max_fps, 50.0, max_relative = 1e-9);
    }
}
