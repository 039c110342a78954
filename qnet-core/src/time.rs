//! Simulation time management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::time::Duration;

/// Simulation time with nanosecond precision
///
/// SimTime is a point in simulation time, stored as nanoseconds since the
/// session started. It is not wall-clock time: the calendar advances it only
/// when events are processed, which keeps runs deterministic and
/// reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimTime(u64);

impl SimTime {
    /// The session start (time zero).
    pub const fn zero() -> Self {
        SimTime(0)
    }

    /// Create a SimTime from nanoseconds.
    pub const fn from_nanos(nanos: u64) -> Self {
        SimTime(nanos)
    }

    /// Create a SimTime from microseconds.
    pub const fn from_micros(micros: u64) -> Self {
        SimTime(micros * 1_000)
    }

    /// Create a SimTime from milliseconds.
    pub const fn from_millis(millis: u64) -> Self {
        SimTime(millis * 1_000_000)
    }

    /// Create a SimTime from seconds.
    pub const fn from_secs(secs: u64) -> Self {
        SimTime(secs * 1_000_000_000)
    }

    /// Create a SimTime from a Duration.
    pub fn from_duration(duration: Duration) -> Self {
        SimTime(duration.as_nanos() as u64)
    }

    /// Convert to a Duration since time zero.
    pub fn as_duration(&self) -> Duration {
        Duration::from_nanos(self.0)
    }

    /// Raw nanosecond value.
    pub const fn as_nanos(&self) -> u64 {
        self.0
    }

    /// Duration elapsed since `earlier`. Saturates at zero if `earlier` is
    /// in the future.
    pub fn duration_since(&self, earlier: SimTime) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }

    /// This time advanced by `duration`.
    pub fn add_duration(&self, duration: Duration) -> Self {
        SimTime(self.0.saturating_add(duration.as_nanos() as u64))
    }

    /// This time moved back by `duration`, saturating at zero.
    pub fn sub_duration(&self, duration: Duration) -> Self {
        SimTime(self.0.saturating_sub(duration.as_nanos() as u64))
    }
}

impl Add<SimTime> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> Self::Output {
        SimTime(self.0.saturating_add(rhs.0))
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: Duration) -> Self::Output {
        self.add_duration(rhs)
    }
}

impl Sub<Duration> for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: Duration) -> Self::Output {
        self.sub_duration(rhs)
    }
}

impl Sub<SimTime> for SimTime {
    type Output = Duration;

    fn sub(self, rhs: SimTime) -> Self::Output {
        self.duration_since(rhs)
    }
}

impl Mul<u64> for SimTime {
    type Output = SimTime;

    fn mul(self, rhs: u64) -> Self::Output {
        SimTime(self.0.saturating_mul(rhs))
    }
}

impl Default for SimTime {
    fn default() -> Self {
        SimTime::zero()
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let duration = self.as_duration();
        let secs = duration.as_secs();
        let millis = duration.subsec_millis();
        let micros = duration.subsec_micros() % 1000;
        let nanos = duration.subsec_nanos() % 1000;

        if secs > 0 {
            write!(f, "{secs}.{millis:03}s")
        } else if millis > 0 {
            write!(f, "{millis}.{micros:03}ms")
        } else if micros > 0 {
            write!(f, "{micros}.{nanos:03}µs")
        } else {
            write!(f, "{nanos}ns")
        }
    }
}
