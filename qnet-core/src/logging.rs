//! Structured logging for simulation debugging
//!
//! Thin initialisation helpers over `tracing-subscriber`. Log output is
//! controlled the usual way through `RUST_LOG`, e.g.
//! `RUST_LOG=qnet_components=debug` to watch routing and drop decisions, or
//! `RUST_LOG=trace` for everything including calendar activity.
//!
//! Level guidelines used across the workspace:
//! - TRACE: per-entry calendar activity and tick progression
//! - DEBUG: routing decisions, admissions, drops, topology edits
//! - INFO: mode transitions and session lifecycle
//! - WARN: clamped configuration values and other unusual conditions

use tracing::info;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the simulation with sensible defaults.
pub fn init_simulation_logging() {
    init_simulation_logging_with_level("info")
}

/// Initialize logging with a specific level.
///
/// # Arguments
/// * `level` - Log level: "trace", "debug", "info", "warn", or "error"
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init_simulation_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("qnet_core={level},qnet_components={level}").into());

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();

    info!("Simulation logging initialized at level: {}", level);
}
