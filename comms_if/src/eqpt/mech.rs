//! # Mechanisms Equipment Demands and Sensor Data

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Demands produced by intake control on a single cycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct IntakeDems {
    /// Redefine the arm encoder's zero reference to this angle before the arm demand is applied.
    ///
    /// Units: degrees
    pub zero_ref_deg: Option<f64>,

    /// The demand for the arm motor. Exactly one is issued per cycle.
    pub arm: ArmDem,

    /// The demand for the roller motor.
    pub roller: RollerDem,
}

/// Sensor data acquired from the intake mechanism at the start of a cycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct IntakeSens {
    /// Session time at which the data was acquired.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Measured arm angle relative to the encoder zero reference.
    ///
    /// Units: degrees
    pub position_deg: f64,

    /// Measured arm angular velocity.
    ///
    /// Units: degrees/second
    pub velocity_degs: f64,

    /// Measured arm motor stator current.
    ///
    /// Units: amps
    pub current_a: f64,

    /// Raw reading of the coral beam break. The sensor is active-low, so `false` means a game
    /// piece is breaking the beam.
    pub beam_break_raw: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A single arm motor demand.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum ArmDem {
    /// Open-loop voltage output.
    Voltage {
        volts: f64
    },

    /// Closed-loop position set-point with gravity feed-forward.
    Position {
        /// Target angle, degrees
        angle_deg: f64,

        /// Closed-loop gain slot on the motor controller
        slot: u8,

        /// Use field oriented commutation
        foc: bool,
    },
}

/// A single roller motor demand.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum RollerDem {
    /// Open-loop voltage output.
    Voltage {
        volts: f64
    },

    /// Stop the motor using its configured neutral (brake) mode.
    Stop,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for RollerDem {
    fn default() -> Self {
        RollerDem::Stop
    }
}
