//! Core simulation substrate for the qnet queueing network engine.
//!
//! This crate provides the pieces that are independent of the queueing
//! domain: simulation time, the event calendar, and run-loop execution.
//!
//! # Architecture Overview
//!
//! - [`SimTime`]: simulation time (not wall-clock time) with nanosecond
//!   precision. Deterministic across runs.
//!
//! - [`Scheduler`]: a single ordered event calendar keyed by due time.
//!   Generic over the event payload, which the owning simulation defines as
//!   a closed enum. Popping an entry advances the clock.
//!
//! - [`Executor`]: drives anything implementing [`Step`] until an end
//!   condition is reached (calendar drained, time bound, or step count),
//!   optionally invoking a side effect after every step.
//!
//! # Basic Usage
//!
//! ```rust,ignore
//! use qnet_core::{Executor, Execute, SimTime};
//!
//! let mut session = /* something implementing Step */;
//! Executor::timed(SimTime::from_secs(10)).execute(&mut session);
//! ```
//!
//! # Time Model
//!
//! All timing uses [`SimTime`]. Timer-driven repetition is modelled as
//! calendar entries that reschedule themselves, processed one at a time by
//! a single stepping function; the core never blocks and owns no threads.

pub mod executor;
pub mod logging;
pub mod scheduler;
pub mod time;

pub use executor::{Execute, Executor, ExecutorWithSideEffect, Step};
pub use logging::{init_simulation_logging, init_simulation_logging_with_level};
pub use scheduler::{ClockRef, EventEntry, Scheduler};
pub use time::SimTime;
