//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the intake software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Demand and sensor data definitions for equipment (like mechanisms)
pub mod eqpt;
