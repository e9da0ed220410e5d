//! # Intake library.
//!
//! This library allows other crates in the workspace (and the benchmarks) to access items defined
//! inside the intake crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Global data store and cycle ordering
pub mod data_store;

/// Intake control module - homing and the per-cycle arm and roller demands
pub mod intake_ctrl;

/// Mechanisms - motor and sensor interfaces, and the simulated intake
pub mod mech;

/// Executable parameters
pub mod params;

/// Task scheduler - polls the active task each cycle
pub mod scheduler;

/// Tasks - composable intake behaviours
pub mod task;

/// Telemetry publishing
pub mod tm;
