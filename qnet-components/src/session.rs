//! Simulation session
//!
//! The session is the single owning object of a run: it holds the event
//! calendar, the topology, the dispatcher, the generator, and the stats
//! tracker, and exposes the whole trigger surface the host UI drives. All
//! mutation happens inside `step` or one of the trigger methods, as
//! discrete non-overlapping steps; there is no other way in. The render
//! layer reads a [`Snapshot`] between steps.

use crate::dispatcher::{Dispatcher, DropReason, RouteOutcome};
use crate::dists::{ConstantServiceTime, ExponentialServiceTime, ServiceTimeDistribution};
use crate::error::TopologyError;
use crate::generator::{AutoSendPriority, Generator};
use crate::request::{Priority, Request, RequestId};
use crate::stats::StatsTracker;
use crate::topology::{SlotPosition, Topology};
use qnet_core::{Scheduler, SimTime, Step};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Everything that can happen on a timer. Both variants reschedule
/// themselves, forming two independent chains through the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Periodic service progression: busy servers burn down remaining time,
    /// idle servers pull from their queues.
    ServiceTick,
    /// One auto-mode generation. Entries scheduled under an older epoch are
    /// stale and ignored, which is how stopping auto mode cancels the
    /// chain.
    AutoSend { epoch: u64 },
}

/// How servers draw their service durations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ServiceTimeConfig {
    /// Every request takes the same fixed time.
    Constant { duration: Duration },
    /// Exponentially distributed with the given mean; each slot gets its
    /// own rng stream derived from the seed.
    Exponential { mean: Duration, seed: u64 },
}

impl ServiceTimeConfig {
    fn build(&self, slot_seq: u64) -> Box<dyn ServiceTimeDistribution> {
        match *self {
            ServiceTimeConfig::Constant { duration } => {
                Box::new(ConstantServiceTime::new(duration))
            }
            ServiceTimeConfig::Exponential { mean, seed } => {
                Box::new(ExponentialServiceTime::new(mean, seed.wrapping_add(slot_seq)))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Capacity of every queue in the topology. Must be at least 1.
    pub queue_capacity: usize,
    /// Clock tick driving service progression.
    pub tick: Duration,
    /// Service duration parameter for every server.
    pub service_time: ServiceTimeConfig,
    /// Initial auto-send interval; clamped into `[100, 1500]` ms.
    pub send_interval: Duration,
    /// Priority policy for auto-generated requests.
    pub auto_priority: AutoSendPriority,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 5,
            tick: Duration::from_millis(100),
            service_time: ServiceTimeConfig::Constant {
                duration: Duration::from_secs(1),
            },
            send_interval: Duration::from_millis(1500),
            auto_priority: AutoSendPriority::NormalOnly,
        }
    }
}

/// One simulation run: topology, routing, generation, statistics, and the
/// calendar that drives them.
pub struct Session {
    config: SessionConfig,
    scheduler: Scheduler<SessionEvent>,
    topology: Topology,
    dispatcher: Dispatcher,
    generator: Generator,
    stats: StatsTracker,
    /// Counts every slot ever created, so re-added slots get fresh rng
    /// streams instead of replaying the removed slot's.
    slots_created: u64,
}

impl Session {
    pub fn new(mut config: SessionConfig) -> Self {
        if config.queue_capacity == 0 {
            warn!("queue capacity of 0 would drop everything, using 1");
            config.queue_capacity = 1;
        }
        if config.tick.is_zero() {
            warn!("zero tick would stall the calendar, using 100ms");
            config.tick = Duration::from_millis(100);
        }

        let generator = Generator::new(config.send_interval, config.auto_priority);
        let mut scheduler = Scheduler::default();
        // The tick chain starts one tick in; triggers fired before the
        // first tick land in a topology whose servers are still idle.
        scheduler.schedule_in(SimTime::from_duration(config.tick), SessionEvent::ServiceTick);

        Self {
            config,
            scheduler,
            topology: Topology::new(),
            dispatcher: Dispatcher::new(),
            generator,
            stats: StatsTracker::new(),
            slots_created: 0,
        }
    }

    // --- trigger surface -------------------------------------------------

    /// A client icon was clicked: generate one request of the trigger's
    /// priority and route it immediately.
    pub fn client_click(&mut self, priority: Priority) -> RouteOutcome {
        let now = self.time();
        let request = self.generator.manual_request(priority, now);
        self.route_and_record(request)
    }

    /// Toggle auto-send mode.
    ///
    /// Turning it on resets the stats tracker, generates one request
    /// immediately, and schedules the send chain. Turning it off cancels
    /// future generations without resetting stats or retracting anything
    /// already admitted or dropped. Re-asserting the current mode is a
    /// no-op.
    pub fn set_auto_mode(&mut self, enabled: bool) {
        if enabled == self.generator.is_auto() {
            return;
        }

        if enabled {
            let now = self.time();
            self.stats.reset(now);
            self.stats.start_window();
            let epoch = self.generator.start_auto();

            let request = self.generator.auto_request(now);
            self.route_and_record(request);
            self.scheduler.schedule_in(
                SimTime::from_duration(self.generator.interval()),
                SessionEvent::AutoSend { epoch },
            );
        } else {
            self.generator.stop_auto();
            self.stats.freeze_window();
        }
    }

    /// Update the auto-send interval (the slider). Clamped to the supported
    /// range; takes effect when the next generation is scheduled. Returns
    /// the effective value.
    pub fn set_send_interval(&mut self, interval: Duration) -> Duration {
        self.generator.set_interval(interval)
    }

    /// Occupy the next slot with a fresh queue/server pair.
    ///
    /// # Errors
    ///
    /// `TopologyError::AtCapacity` once all three slots exist, a signal to
    /// disable the control rather than a failure.
    pub fn add_queue(&mut self) -> Result<SlotPosition, TopologyError> {
        let service = self.config.service_time.build(self.slots_created);
        let position = self
            .topology
            .add_slot(self.config.queue_capacity, service)?;
        self.slots_created += 1;
        Ok(position)
    }

    /// Remove the most recently added slot. Requests still queued or in
    /// service there are recorded as drops, not silently lost.
    ///
    /// # Errors
    ///
    /// `TopologyError::Empty` when there is nothing to remove.
    pub fn remove_queue(&mut self) -> Result<SlotPosition, TopologyError> {
        let removed = self.topology.remove_slot()?;
        let now = self.time();
        for request in &removed.discarded {
            self.stats.record_drop(now);
            debug!(
                request = %request.id,
                reason = %DropReason::SlotRemoved,
                "drop recorded"
            );
        }
        Ok(removed.position)
    }

    /// Show or hide the priority client. This only changes which manual
    /// trigger sources exist and feeds the mixed auto-priority policy.
    pub fn set_priority_client_visible(&mut self, visible: bool) {
        self.generator.set_priority_client_visible(visible);
    }

    // --- stepping --------------------------------------------------------

    /// Process the next calendar entry. Returns `false` when the calendar
    /// is empty (which does not happen in practice: the tick chain is
    /// perpetual).
    pub fn step(&mut self) -> bool {
        let Some(entry) = self.scheduler.pop() else {
            return false;
        };
        match entry.into_event() {
            SessionEvent::ServiceTick => self.on_service_tick(),
            SessionEvent::AutoSend { epoch } => self.on_auto_send(epoch),
        }
        true
    }

    /// Process every entry due at or before `time`.
    pub fn run_until(&mut self, time: SimTime) {
        while self.scheduler.peek_due().is_some_and(|due| due <= time) {
            self.step();
        }
    }

    fn on_service_tick(&mut self) {
        let tick = self.config.tick;
        trace!(time = %self.scheduler.time(), "service tick");
        for slot in self.topology.slots_mut() {
            // Finish before start, so a server that completes on this tick
            // can turn around into the next queued request.
            if let Some(done) = slot.server.try_finish(tick) {
                debug!(request = %done.id, position = %slot.position, "request processed");
            }
            slot.server.try_start(&mut slot.queue);
        }
        self.scheduler
            .schedule_in(SimTime::from_duration(tick), SessionEvent::ServiceTick);
    }

    fn on_auto_send(&mut self, epoch: u64) {
        if !self.generator.is_auto() || epoch != self.generator.epoch() {
            trace!(epoch, "stale auto send entry ignored");
            return;
        }
        let now = self.time();
        let request = self.generator.auto_request(now);
        self.route_and_record(request);
        // The interval in force now governs the next firing; slider changes
        // are never retroactive.
        self.scheduler.schedule_in(
            SimTime::from_duration(self.generator.interval()),
            SessionEvent::AutoSend { epoch },
        );
    }

    /// Routing and drop accounting are one atomic step: an observer never
    /// sees a drop without its counter increment.
    fn route_and_record(&mut self, request: Request) -> RouteOutcome {
        let outcome = self.dispatcher.route(&mut self.topology, request);
        if let RouteOutcome::Dropped { id, reason, .. } = outcome {
            self.stats.record_drop(self.time());
            debug!(request = %id, %reason, "drop recorded");
        }
        outcome
    }

    // --- query surface ---------------------------------------------------

    pub fn time(&self) -> SimTime {
        self.scheduler.time()
    }

    pub fn is_auto(&self) -> bool {
        self.generator.is_auto()
    }

    pub fn send_interval(&self) -> Duration {
        self.generator.interval()
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn total_dropped(&self) -> u64 {
        self.stats.total_dropped()
    }

    /// Drop rate over the trailing second; `None` outside auto mode.
    pub fn drops_per_second(&self) -> Option<f64> {
        self.stats.drops_per_second(self.time())
    }

    /// Consistent view of the whole session for the render layer.
    pub fn snapshot(&self) -> Snapshot {
        let slots = self
            .topology
            .slots()
            .iter()
            .map(|slot| SlotSnapshot {
                position: slot.position,
                queue_capacity: slot.queue.capacity(),
                queue: slot
                    .queue
                    .iter()
                    .map(|request| QueuedRequest {
                        id: request.id,
                        priority: request.priority,
                    })
                    .collect(),
                server: match slot.server.state() {
                    crate::server::ServerState::Idle => ServerSnapshot::Idle,
                    crate::server::ServerState::Busy { request, remaining } => {
                        ServerSnapshot::Busy {
                            request: request.id,
                            remaining: *remaining,
                        }
                    }
                },
            })
            .collect();

        Snapshot {
            time: self.time(),
            slots,
            total_dropped: self.stats.total_dropped(),
            drops_per_second: self.drops_per_second(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl Step for Session {
    fn step(&mut self) -> bool {
        Session::step(self)
    }

    fn next_due(&self) -> Option<SimTime> {
        self.scheduler.peek_due()
    }
}

/// Point-in-time view of the session consumed by the render layer each
/// frame. Serializable so hosts can ship it across a process boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub time: SimTime,
    pub slots: Vec<SlotSnapshot>,
    pub total_dropped: u64,
    /// `None` while auto mode is inactive (the metric is frozen).
    pub drops_per_second: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSnapshot {
    pub position: SlotPosition,
    pub queue_capacity: usize,
    /// Queued requests in service order (head first).
    pub queue: Vec<QueuedRequest>,
    pub server: ServerSnapshot,
}

impl SlotSnapshot {
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueuedRequest {
    pub id: RequestId,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ServerSnapshot {
    Idle,
    Busy {
        request: RequestId,
        remaining: Duration,
    },
}
