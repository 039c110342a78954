//! Drop statistics
//!
//! Tracks the cumulative number of dropped requests and, while auto mode is
//! running, a trailing one-second window of drop timestamps used to derive
//! the drop rate. The tracker is reset exactly once per auto-mode start;
//! manual activity accumulates into the total without ever resetting it.

use qnet_core::SimTime;
use std::collections::VecDeque;
use std::time::Duration;

/// Width of the trailing window used for the drop rate.
pub const RATE_WINDOW: Duration = Duration::from_secs(1);

#[derive(Debug, Default)]
pub struct StatsTracker {
    /// Cumulative drops since the last reset. Monotonic between resets.
    total_dropped: u64,
    /// Timestamps of recent drops, oldest first. Only fed while recording.
    window: VecDeque<SimTime>,
    /// When the tracker was last reset; with less than `RATE_WINDOW` of
    /// history the rate is the count since this instant.
    reset_at: SimTime,
    /// True while auto mode is active; gates the rate metric.
    recording: bool,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one drop. The cumulative counter always advances; the rate
    /// window only collects timestamps while recording is on.
    pub fn record_drop(&mut self, now: SimTime) {
        self.total_dropped += 1;
        if self.recording {
            self.window.push_back(now);
            self.prune(now);
        }
    }

    /// Cumulative drops since the last reset.
    pub fn total_dropped(&self) -> u64 {
        self.total_dropped
    }

    /// Drops per second over the trailing window, or `None` while the
    /// metric is inactive (manual mode). With less than a window's worth of
    /// history since the reset this is simply the count since the reset;
    /// it decays toward zero as events age out.
    pub fn drops_per_second(&self, now: SimTime) -> Option<f64> {
        if !self.recording {
            return None;
        }
        let count = if now.duration_since(self.reset_at) < RATE_WINDOW {
            self.window.len()
        } else {
            let cutoff = now.sub_duration(RATE_WINDOW);
            self.window.iter().filter(|&&at| at > cutoff).count()
        };
        Some(count as f64)
    }

    /// Start feeding the rate window. Called on the auto-start transition,
    /// immediately after `reset`.
    pub fn start_window(&mut self) {
        self.recording = true;
    }

    /// Freeze the rate metric without touching the totals. Called when auto
    /// mode stops.
    pub fn freeze_window(&mut self) {
        self.recording = false;
    }

    /// Clear the counter and the window. Called only when auto mode
    /// transitions from stopped to started.
    pub fn reset(&mut self, now: SimTime) {
        self.total_dropped = 0;
        self.window.clear();
        self.reset_at = now;
    }

    /// Discard window entries that can no longer affect the rate. Inside
    /// the first window after a reset everything still counts, so nothing
    /// is pruned.
    fn prune(&mut self, now: SimTime) {
        if now.duration_since(self.reset_at) < RATE_WINDOW {
            return;
        }
        let cutoff = now.sub_duration(RATE_WINDOW);
        while self.window.front().is_some_and(|&at| at <= cutoff) {
            self.window.pop_front();
        }
    }
}
