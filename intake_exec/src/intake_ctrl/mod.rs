//! Intake control module
//!
//! Owns the intake arm's target angle, homing status and roller state, and on each cycle decides
//! which single demand is sent to the arm motor.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod homing;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use homing::HomingStatus;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during IntakeCtrl initialisation.
#[derive(Debug, thiserror::Error)]
pub enum IntakeCtrlError {
    #[error("Could not load the intake parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid intake parameters: {0}")]
    InvalidParams(&'static str),
}

/// Named arm positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Retracted,
    Down,
}
