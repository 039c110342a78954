//! Queue/server topology
//!
//! The topology is an ordered collection of up to three slots, each pairing
//! one bounded queue with one server. Slots fill in a fixed order (center,
//! then top, then bottom) and empty in strict reverse, so the structure
//! never has a populated outer slot while an inner one is empty.

use crate::dists::ServiceTimeDistribution;
use crate::error::TopologyError;
use crate::queue::RequestQueue;
use crate::request::Request;
use crate::server::Server;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Maximum number of concurrent queue/server pairs.
pub const MAX_SLOTS: usize = 3;

/// Fixed slot positions, in fill order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotPosition {
    Center,
    Top,
    Bottom,
}

impl SlotPosition {
    /// Fill order: center first, then top, then bottom.
    pub const ORDER: [SlotPosition; MAX_SLOTS] =
        [SlotPosition::Center, SlotPosition::Top, SlotPosition::Bottom];
}

impl std::fmt::Display for SlotPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SlotPosition::Center => "center",
            SlotPosition::Top => "top",
            SlotPosition::Bottom => "bottom",
        };
        write!(f, "{name}")
    }
}

/// One occupied position: a queue bound to the server that drains it.
pub struct Slot {
    pub position: SlotPosition,
    pub queue: RequestQueue,
    pub server: Server,
}

/// Contents of a slot that was just removed. Requests still queued or in
/// service are handed back so the caller can count them as drops rather
/// than lose them silently.
#[derive(Debug)]
pub struct RemovedSlot {
    pub position: SlotPosition,
    pub discarded: Vec<Request>,
}

/// Ordered collection of occupied slots.
///
/// The topology exclusively owns its queues and servers; routing and
/// service progression borrow slots per call.
#[derive(Default)]
pub struct Topology {
    slots: Vec<Slot>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Occupy the next slot in fill order with a fresh queue/server pair.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::AtCapacity` once all slots are occupied; the
    /// topology is unchanged. This is a no-op signal, not a failure.
    pub fn add_slot(
        &mut self,
        queue_capacity: usize,
        service_time: Box<dyn ServiceTimeDistribution>,
    ) -> Result<SlotPosition, TopologyError> {
        if self.slots.len() >= MAX_SLOTS {
            return Err(TopologyError::AtCapacity { max: MAX_SLOTS });
        }

        let position = SlotPosition::ORDER[self.slots.len()];
        self.slots.push(Slot {
            position,
            queue: RequestQueue::bounded(queue_capacity),
            server: Server::new(service_time),
        });
        debug!(%position, "slot added");
        Ok(position)
    }

    /// Remove the most recently added slot, in reverse fill order.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::Empty` when there is nothing to remove.
    pub fn remove_slot(&mut self) -> Result<RemovedSlot, TopologyError> {
        let mut slot = self.slots.pop().ok_or(TopologyError::Empty)?;

        let mut discarded = Vec::new();
        if let Some(in_flight) = slot.server.take_in_flight() {
            discarded.push(in_flight);
        }
        discarded.extend(slot.queue.drain());

        debug!(
            position = %slot.position,
            discarded = discarded.len(),
            "slot removed"
        );
        Ok(RemovedSlot {
            position: slot.position,
            discarded,
        })
    }

    /// The occupied slots, in fill order (center, top, bottom).
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [Slot] {
        &mut self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.slots.len() >= MAX_SLOTS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dists::ConstantServiceTime;
    use crate::request::{Priority, RequestId};
    use qnet_core::SimTime;
    use std::time::Duration;

    fn service() -> Box<dyn ServiceTimeDistribution> {
        Box::new(ConstantServiceTime::new(Duration::from_millis(100)))
    }

    fn request(id: u64) -> Request {
        Request::new(RequestId(id), Priority::Normal, SimTime::zero())
    }

    #[test]
    fn test_slots_fill_center_top_bottom() {
        let mut topology = Topology::new();
        assert!(topology.is_empty());

        assert_eq!(topology.add_slot(5, service()), Ok(SlotPosition::Center));
        assert_eq!(topology.add_slot(5, service()), Ok(SlotPosition::Top));
        assert_eq!(topology.add_slot(5, service()), Ok(SlotPosition::Bottom));
        assert!(topology.is_full());

        let positions: Vec<SlotPosition> =
            topology.slots().iter().map(|s| s.position).collect();
        assert_eq!(
            positions,
            vec![SlotPosition::Center, SlotPosition::Top, SlotPosition::Bottom]
        );
    }

    #[test]
    fn test_add_beyond_capacity_is_signalled() {
        let mut topology = Topology::new();
        for _ in 0..MAX_SLOTS {
            topology.add_slot(5, service()).unwrap();
        }

        assert_eq!(
            topology.add_slot(5, service()),
            Err(TopologyError::AtCapacity { max: MAX_SLOTS })
        );
        assert_eq!(topology.len(), MAX_SLOTS);
    }

    #[test]
    fn test_remove_runs_in_reverse_order() {
        let mut topology = Topology::new();
        for _ in 0..MAX_SLOTS {
            topology.add_slot(5, service()).unwrap();
        }

        assert_eq!(
            topology.remove_slot().unwrap().position,
            SlotPosition::Bottom
        );
        let positions: Vec<SlotPosition> =
            topology.slots().iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![SlotPosition::Center, SlotPosition::Top]);

        assert_eq!(topology.remove_slot().unwrap().position, SlotPosition::Top);
        assert_eq!(
            topology.remove_slot().unwrap().position,
            SlotPosition::Center
        );
        assert!(topology.is_empty());
    }

    #[test]
    fn test_remove_on_empty_is_a_noop_signal() {
        let mut topology = Topology::new();
        assert_eq!(topology.remove_slot().unwrap_err(), TopologyError::Empty);
        assert_eq!(topology.len(), 0);
    }

    #[test]
    fn test_removed_slot_hands_back_queued_and_in_flight_requests() {
        let mut topology = Topology::new();
        topology.add_slot(5, service()).unwrap();

        let slot = &mut topology.slots_mut()[0];
        slot.queue.enqueue(request(1)).unwrap();
        slot.queue.enqueue(request(2)).unwrap();
        slot.queue.enqueue(request(3)).unwrap();
        // Put request 1 in service; 2 and 3 remain queued.
        slot.server.try_start(&mut slot.queue);

        let removed = topology.remove_slot().unwrap();
        let ids: Vec<RequestId> = removed.discarded.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RequestId(1), RequestId(2), RequestId(3)]);
    }
}
