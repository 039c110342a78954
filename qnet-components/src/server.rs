//! Server state machine
//!
//! A server is bound to exactly one queue for its lifetime and holds at
//! most one request at a time. Progression is tick-driven: each clock tick
//! first lets a busy server burn down its remaining service time, then lets
//! an idle server pull the head of its queue. Service is non-preemptive:
//! once a request is in service it runs to completion no matter what
//! arrives behind it.

use crate::dists::ServiceTimeDistribution;
use crate::queue::RequestQueue;
use crate::request::{Request, RequestId};
use std::time::Duration;
use tracing::trace;

/// Server state: idle, or busy with one request and the service time it has
/// left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerState {
    Idle,
    Busy {
        request: Request,
        remaining: Duration,
    },
}

pub struct Server {
    state: ServerState,
    service_time: Box<dyn ServiceTimeDistribution>,
    /// Total requests processed to completion
    requests_processed: u64,
}

impl Server {
    pub fn new(service_time: Box<dyn ServiceTimeDistribution>) -> Self {
        Self {
            state: ServerState::Idle,
            service_time,
            requests_processed: 0,
        }
    }

    pub fn state(&self) -> &ServerState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, ServerState::Idle)
    }

    pub fn is_busy(&self) -> bool {
        !self.is_idle()
    }

    /// Total requests this server has processed to completion.
    pub fn requests_processed(&self) -> u64 {
        self.requests_processed
    }

    /// Burn down `tick` of the in-flight request's remaining service time.
    ///
    /// Returns the request if it completed on this tick. Idle servers are
    /// unaffected.
    pub fn try_finish(&mut self, tick: Duration) -> Option<Request> {
        match std::mem::replace(&mut self.state, ServerState::Idle) {
            ServerState::Idle => None,
            ServerState::Busy { request, remaining } => {
                let remaining = remaining.saturating_sub(tick);
                if remaining.is_zero() {
                    self.requests_processed += 1;
                    trace!(request = %request.id, "request processed");
                    Some(request)
                } else {
                    self.state = ServerState::Busy { request, remaining };
                    None
                }
            }
        }
    }

    /// Pull the head of `queue` into service if this server is idle.
    ///
    /// Returns the id of the request that entered service, if any. The
    /// service duration is drawn from the distribution at this point.
    pub fn try_start(&mut self, queue: &mut RequestQueue) -> Option<RequestId> {
        if self.is_busy() {
            return None;
        }
        let request = queue.dequeue()?;
        let id = request.id;
        let remaining = self.service_time.sample();
        trace!(request = %id, service_time = ?remaining, "request entered service");
        self.state = ServerState::Busy { request, remaining };
        Some(id)
    }

    /// Take the in-flight request out of the server, leaving it idle.
    ///
    /// Used when the owning slot is removed and the request must be counted
    /// as a drop rather than silently lost.
    pub fn take_in_flight(&mut self) -> Option<Request> {
        match std::mem::replace(&mut self.state, ServerState::Idle) {
            ServerState::Busy { request, .. } => Some(request),
            ServerState::Idle => None,
        }
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("state", &self.state)
            .field("requests_processed", &self.requests_processed)
            .finish_non_exhaustive()
    }
}
