//! Request generation
//!
//! Requests enter the system two ways, mutually exclusive in spirit but
//! sharing one id sequence: a manual trigger (a client click) produces one
//! request immediately, and auto mode produces one request per configurable
//! interval until stopped. The generator itself schedules nothing (the
//! owning session turns its state into calendar entries) but it owns the
//! interval clamp, the auto-priority policy, and the epoch counter used to
//! cancel in-flight auto-send chains.

use crate::request::{Priority, Request, RequestId};
use qnet_core::SimTime;
use std::time::Duration;
use tracing::{info, warn};

/// Lower bound of the auto-send interval.
pub const MIN_SEND_INTERVAL: Duration = Duration::from_millis(100);
/// Upper bound of the auto-send interval.
pub const MAX_SEND_INTERVAL: Duration = Duration::from_millis(1500);

/// Priority policy for auto-generated requests.
///
/// Whether auto mode should emit a mix of priorities when the priority
/// client is shown is a product decision, so it is configuration rather
/// than behavior baked into the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoSendPriority {
    /// Auto mode always generates normal priority requests; high priority
    /// requests only come from manual clicks.
    #[default]
    NormalOnly,
    /// Alternate high/normal while the priority client is visible.
    MixedWhenPriorityVisible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationMode {
    Manual,
    Auto,
}

#[derive(Debug)]
pub struct Generator {
    next_id: u64,
    mode: GenerationMode,
    interval: Duration,
    auto_priority: AutoSendPriority,
    priority_client_visible: bool,
    /// Bumped on every auto start/stop; calendar entries carry the epoch
    /// they were scheduled under and are ignored once it is stale.
    auto_epoch: u64,
    /// Flips between high and normal under the mixed policy.
    mixed_high_next: bool,
    requests_generated: u64,
}

impl Generator {
    pub fn new(interval: Duration, auto_priority: AutoSendPriority) -> Self {
        Self {
            next_id: 1,
            mode: GenerationMode::Manual,
            interval: clamp_interval(interval),
            auto_priority,
            priority_client_visible: false,
            auto_epoch: 0,
            mixed_high_next: false,
            requests_generated: 0,
        }
    }

    pub fn mode(&self) -> GenerationMode {
        self.mode
    }

    pub fn is_auto(&self) -> bool {
        self.mode == GenerationMode::Auto
    }

    /// The interval used for the next scheduled generation.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Current auto-send epoch. Calendar entries from earlier epochs are
    /// stale and must be ignored.
    pub fn epoch(&self) -> u64 {
        self.auto_epoch
    }

    pub fn requests_generated(&self) -> u64 {
        self.requests_generated
    }

    pub fn priority_client_visible(&self) -> bool {
        self.priority_client_visible
    }

    pub fn set_priority_client_visible(&mut self, visible: bool) {
        self.priority_client_visible = visible;
    }

    /// Update the auto-send interval, clamping it into
    /// `[MIN_SEND_INTERVAL, MAX_SEND_INTERVAL]`. Takes effect when the next
    /// generation is scheduled, not retroactively. Returns the effective
    /// value.
    pub fn set_interval(&mut self, interval: Duration) -> Duration {
        self.interval = clamp_interval(interval);
        self.interval
    }

    /// Enter auto mode, returning the fresh epoch. Idempotence is the
    /// caller's concern (a start while already running would fork the send
    /// chain).
    pub fn start_auto(&mut self) -> u64 {
        self.mode = GenerationMode::Auto;
        self.auto_epoch += 1;
        info!(epoch = self.auto_epoch, interval = ?self.interval, "auto send started");
        self.auto_epoch
    }

    /// Leave auto mode. Bumping the epoch cancels any scheduled generation
    /// without touching requests already admitted or dropped.
    pub fn stop_auto(&mut self) {
        self.mode = GenerationMode::Manual;
        self.auto_epoch += 1;
        info!("auto send stopped");
    }

    /// Produce one request for a manual trigger of the given priority.
    pub fn manual_request(&mut self, priority: Priority, now: SimTime) -> Request {
        self.generate(priority, now)
    }

    /// Produce one request for an auto-send firing, with priority chosen by
    /// the configured policy.
    pub fn auto_request(&mut self, now: SimTime) -> Request {
        let priority = match self.auto_priority {
            AutoSendPriority::NormalOnly => Priority::Normal,
            AutoSendPriority::MixedWhenPriorityVisible => {
                if self.priority_client_visible {
                    self.mixed_high_next = !self.mixed_high_next;
                    if self.mixed_high_next {
                        Priority::High
                    } else {
                        Priority::Normal
                    }
                } else {
                    Priority::Normal
                }
            }
        };
        self.generate(priority, now)
    }

    fn generate(&mut self, priority: Priority, now: SimTime) -> Request {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.requests_generated += 1;
        Request::new(id, priority, now)
    }
}

fn clamp_interval(interval: Duration) -> Duration {
    let clamped = interval.clamp(MIN_SEND_INTERVAL, MAX_SEND_INTERVAL);
    if clamped != interval {
        warn!(
            requested = ?interval,
            effective = ?clamped,
            "send interval outside supported range, clamped"
        );
    }
    clamped
}
