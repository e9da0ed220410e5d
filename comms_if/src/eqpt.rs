//! # Equipment Interface
//!
//! This module defines the structures passed between the intake control logic and the mechanisms
//! it drives.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod mech;
