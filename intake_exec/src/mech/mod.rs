//! # Mechanisms
//!
//! This module provides a unified interface to the intake's motor controllers and sensors, so
//! the same control code can drive real hardware or the simulation.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Simulated intake mechanism.
pub mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::mech::{ArmDem, IntakeDems, IntakeSens, RollerDem};
use log::trace;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A smart motor controller.
///
/// Hardware faults are handled (or ignored) by the implementation, so none of these calls can
/// fail. Angles are of the driven mechanism, after any gearing.
pub trait Motor {
    /// Apply an open-loop voltage.
    fn set_voltage(&mut self, volts: f64);

    /// Track a position using the controller's closed loop with gravity feed-forward.
    ///
    /// ## Arguments
    /// - `angle_deg` - Target angle in degrees
    /// - `slot` - Gain slot to use
    /// - `foc` - Use field oriented commutation
    fn set_position(&mut self, angle_deg: f64, slot: u8, foc: bool);

    /// Stop driving, leaving the motor in its neutral (brake) mode.
    fn stop(&mut self);

    /// Redefine the current position of the encoder to be `angle_deg`.
    fn set_zero_reference(&mut self, angle_deg: f64);

    /// Units: degrees
    fn position_deg(&self) -> f64;

    /// Units: degrees/second
    fn velocity_degs(&self) -> f64;

    /// Units: amps
    fn stator_current_a(&self) -> f64;
}

/// A digital input.
pub trait BinarySensor {
    /// Raw electrical level of the input.
    fn read(&self) -> bool;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The intake's hardware: the arm and roller motors and the coral beam break.
pub struct IntakeMech<M, S>
where
    M: Motor,
    S: BinarySensor,
{
    pub arm: M,
    pub roller: M,
    pub beam_break: S,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<M, S> IntakeMech<M, S>
where
    M: Motor,
    S: BinarySensor,
{
    pub fn new(arm: M, roller: M, beam_break: S) -> Self {
        Self {
            arm,
            roller,
            beam_break,
        }
    }

    /// Acquire the sensor data for this cycle.
    pub fn read_sens(&self, time_s: f64) -> IntakeSens {
        IntakeSens {
            time_s,
            position_deg: self.arm.position_deg(),
            velocity_degs: self.arm.velocity_degs(),
            current_a: self.arm.stator_current_a(),
            beam_break_raw: self.beam_break.read(),
        }
    }

    /// Actuate the demands.
    ///
    /// The zero reference, if any, is redefined before the arm demand so a
    /// position demand issued on the same cycle uses the new reference.
    pub fn apply(&mut self, dems: &IntakeDems) {
        if let Some(angle_deg) = dems.zero_ref_deg {
            self.arm.set_zero_reference(angle_deg);
        }

        match dems.arm {
            ArmDem::Voltage { volts } => self.arm.set_voltage(volts),
            ArmDem::Position { angle_deg, slot, foc } => self.arm.set_position(angle_deg, slot, foc),
        }

        match dems.roller {
            RollerDem::Voltage { volts } => self.roller.set_voltage(volts),
            RollerDem::Stop => self.roller.stop(),
        }

        trace!("Applied intake demands {:?}", dems);
    }
}
