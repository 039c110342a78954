//! Queueing network components for the qnet simulation engine
//!
//! This crate models a small queueing network: requests generated by
//! clients are routed into bounded queues feeding single-request servers,
//! with a drop policy applied when the chosen queue is full. Everything is
//! owned by a [`Session`] and driven by one event calendar; see the
//! session module for the trigger and snapshot surface the host UI uses.

pub mod dispatcher;
pub mod dists;
pub mod error;
pub mod generator;
pub mod queue;
pub mod request;
pub mod server;
pub mod session;
pub mod stats;
pub mod topology;

pub use dispatcher::{Dispatcher, DropReason, RouteOutcome};
pub use dists::{ConstantServiceTime, ExponentialServiceTime, ServiceTimeDistribution};
pub use error::{QueueError, TopologyError};
pub use generator::{
    AutoSendPriority, GenerationMode, Generator, MAX_SEND_INTERVAL, MIN_SEND_INTERVAL,
};
pub use queue::RequestQueue;
pub use request::{Priority, Request, RequestId};
pub use server::{Server, ServerState};
pub use session::{
    QueuedRequest, ServerSnapshot, ServiceTimeConfig, Session, SessionConfig, SessionEvent,
    SlotSnapshot, Snapshot,
};
pub use stats::{StatsTracker, RATE_WINDOW};
pub use topology::{RemovedSlot, Slot, SlotPosition, Topology, MAX_SLOTS};
