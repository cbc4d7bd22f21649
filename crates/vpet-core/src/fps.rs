use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Measures the achieved simulation tick rate over a sliding window.
///
/// The shell records every fixed-rate tick; the HUD reads [`rate`](Self::rate)
/// and flags the loop as lagging when it falls behind the configured rate.
pub struct TickCounter {
    stamps: VecDeque<Instant>,
    window: Duration,
    total: u64,
}

impl Default for TickCounter {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl TickCounter {
    pub fn new(window: Duration) -> Self {
        Self {
            stamps: VecDeque::new(),
            window,
            total: 0,
        }
    }

    /// Record a tick at `now` and forget ticks that left the window.
    pub fn record(&mut self, now: Instant) {
        self.stamps.push_back(now);
        self.total += 1;
        let cutoff = now.checked_sub(self.window).unwrap_or(now);
        while self.stamps.front().is_some_and(|&t| t < cutoff) {
            self.stamps.pop_front();
        }
    }

    /// Ticks per second inside the window. Zero until two ticks are known.
    pub fn rate(&self) -> f64 {
        if self.stamps.len() < 2 {
            return 0.0;
        }
        self.stamps.len() as f64 / self.window.as_secs_f64()
    }

    /// Total ticks recorded since creation.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// True when the measured rate is below 80% of `target_hz`.
    ///
    /// Always false before a full window of ticks has been seen.
    pub fn is_lagging(&self, target_hz: u32) -> bool {
        if self.total < u64::from(target_hz) {
            return false;
        }
        self.rate() < f64::from(target_hz) * 0.8
    }
}
