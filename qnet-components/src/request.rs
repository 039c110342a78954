//! Request data model
//!
//! A request is immutable once created: it is identified by a monotonic id,
//! carries the priority of the client that produced it, and records its
//! creation time. Requests leave the system either processed or dropped;
//! nothing mutates them in between.

use qnet_core::SimTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Unique identifier for requests, monotonically increasing per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Request({})", self.0)
    }
}

/// Request priority. `High` orders before `Normal` everywhere requests are
/// ranked: queued high-priority requests are served first, but a request
/// already in service is never preempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    High,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Unique identifier for this request
    pub id: RequestId,
    /// Priority assigned by the generating client
    pub priority: Priority,
    /// Simulation time when the request was created
    pub created_at: SimTime,
}

impl Request {
    /// Create a new request.
    pub fn new(id: RequestId, priority: Priority, created_at: SimTime) -> Self {
        Self {
            id,
            priority,
            created_at,
        }
    }

    /// How long this request has existed.
    pub fn age(&self, now: SimTime) -> Duration {
        now.duration_since(self.created_at)
    }
}
