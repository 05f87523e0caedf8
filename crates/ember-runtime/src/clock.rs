//! Frame clock producing per-frame delta time

use std::time::Instant;

/// Default upper bound on a single frame delta (seconds)
const DEFAULT_MAX_FRAME_TIME: f64 = 0.25;

/// Tracks frame time for the host loop.
///
/// `tick` measures wall time between calls; `advance` feeds a scripted delta
/// (headless runs, tests). Both clamp to `max_frame_time` so a stalled
/// process does not hand a huge step to the systems it drives.
pub struct FrameClock {
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Number of frames ticked so far
    pub frame_count: u64,
    /// Upper bound applied to every delta
    pub max_frame_time: f64,
    /// Last tick instant
    last_instant: Instant,
    /// Whether this is the first tick
    first_tick: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            frame_count: 0,
            max_frame_time: DEFAULT_MAX_FRAME_TIME,
            last_instant: Instant::now(),
            first_tick: true,
        }
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock with a custom delta clamp
    pub fn with_max_frame_time(max_frame_time: f64) -> Self {
        Self {
            max_frame_time,
            ..Self::default()
        }
    }

    /// Advance by measured wall time. Call once per frame.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();

        if self.first_tick {
            self.first_tick = false;
            self.last_instant = now;
            self.delta_time = 0.0;
            return 0.0;
        }

        let elapsed = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.advance(elapsed)
    }

    /// Advance by a scripted delta. Negative deltas count as zero.
    pub fn advance(&mut self, dt: f64) -> f64 {
        self.delta_time = dt.max(0.0).min(self.max_frame_time);
        self.total_time += self.delta_time;
        self.frame_count += 1;
        self.delta_time
    }
}
