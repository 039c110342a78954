//! Error types for simulation components
//!
//! Nothing in this core is fatal. Queue rejection is converted into a drop
//! event by the dispatcher, and topology errors are no-op signals the host
//! can use to disable the triggering control.

use thiserror::Error;

/// Errors related to queue operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    #[error("queue is full (capacity: {capacity})")]
    Full { capacity: usize },
}

/// Errors related to topology mutation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("all {max} slots are occupied")]
    AtCapacity { max: usize },

    #[error("topology has no slots to remove")]
    Empty,
}
