//! Routing and admission
//!
//! The dispatcher receives newly generated requests and picks a target
//! queue: the active queue with the fewest pending requests, ties broken by
//! slot order (center before top before bottom). Admission is all-or-
//! nothing: a request that cannot be enqueued becomes a drop, never an
//! error propagated to the caller.

use crate::error::QueueError;
use crate::request::{Priority, Request, RequestId};
use crate::topology::{SlotPosition, Topology};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Why a request was discarded instead of queued or served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropReason {
    /// Routed while no queue was active.
    NoActiveQueue,
    /// The selected queue was at capacity.
    QueueFull,
    /// The slot holding the request was removed.
    SlotRemoved,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            DropReason::NoActiveQueue => "no active queue",
            DropReason::QueueFull => "queue full",
            DropReason::SlotRemoved => "slot removed",
        };
        write!(f, "{reason}")
    }
}

/// Outcome of routing one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteOutcome {
    Admitted {
        id: RequestId,
        priority: Priority,
        position: SlotPosition,
        /// Index the request was inserted at (0 = head of the queue).
        depth: usize,
    },
    Dropped {
        id: RequestId,
        priority: Priority,
        reason: DropReason,
    },
}

impl RouteOutcome {
    pub fn is_admitted(&self) -> bool {
        matches!(self, RouteOutcome::Admitted { .. })
    }

    pub fn is_dropped(&self) -> bool {
        matches!(self, RouteOutcome::Dropped { .. })
    }
}

/// Routing policy: least pending requests, slot order breaking ties.
///
/// The dispatcher is stateless; it borrows the topology per call and never
/// owns it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dispatcher;

impl Dispatcher {
    pub fn new() -> Self {
        Self
    }

    /// Index of the slot a new request should target, or `None` when the
    /// topology is empty. `min_by_key` keeps the first minimum, which is
    /// exactly the slot-order tie-break.
    fn select_slot(&self, topology: &Topology) -> Option<usize> {
        topology
            .slots()
            .iter()
            .enumerate()
            .min_by_key(|(_, slot)| slot.queue.len())
            .map(|(index, _)| index)
    }

    /// Route `request` into the topology.
    ///
    /// Every failure mode is converted into a `Dropped` outcome; the caller
    /// records the drop with its stats tracker in the same step.
    pub fn route(&self, topology: &mut Topology, request: Request) -> RouteOutcome {
        let id = request.id;
        let priority = request.priority;

        let Some(index) = self.select_slot(topology) else {
            debug!(request = %id, "dropped: no active queue");
            return RouteOutcome::Dropped {
                id,
                priority,
                reason: DropReason::NoActiveQueue,
            };
        };

        let slot = &mut topology.slots_mut()[index];
        let position = slot.position;
        match slot.queue.enqueue(request) {
            Ok(depth) => {
                debug!(request = %id, %position, depth, "request admitted");
                RouteOutcome::Admitted {
                    id,
                    priority,
                    position,
                    depth,
                }
            }
            Err(QueueError::Full { capacity }) => {
                debug!(request = %id, %position, capacity, "dropped: queue full");
                RouteOutcome::Dropped {
                    id,
                    priority,
                    reason: DropReason::QueueFull,
                }
            }
        }
    }
}
