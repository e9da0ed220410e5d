//! # Simulated intake mechanism
//!
//! A very simple kinematic model, good enough to exercise homing and the intake tasks without
//! hardware:
//! - Voltage demands move a motor at a speed proportional to the voltage.
//! - Position demands move towards the target at a limited rate.
//! - Hard stops block motion. A motor driven into a stop stalls and draws current proportional to
//!   the applied voltage.
//! - The beam break detects coral after the rollers have been running forwards with the arm lowered
//!   for a while, and clears once they have been reversed for a while.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::lin_map;

use super::{BinarySensor, IntakeMech, Motor};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of one simulated motor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimMotorParams {
    /// Speed per volt of open-loop output.
    ///
    /// Units: (degrees/second)/volt
    pub free_speed_degs_per_v: f64,

    /// Current drawn when stalled per volt of open-loop output.
    ///
    /// Units: amps/volt
    pub stall_current_a_per_v: f64,

    /// Current drawn while moving freely.
    ///
    /// Units: amps
    pub running_current_a: f64,

    /// Maximum speed under position control.
    ///
    /// Units: degrees/second
    pub max_position_rate_degs: f64,

    /// Lower hard stop, in the mechanism's true frame.
    ///
    /// Units: degrees
    pub hard_stop_min_deg: Option<f64>,

    /// Upper hard stop, in the mechanism's true frame.
    ///
    /// Units: degrees
    pub hard_stop_max_deg: Option<f64>,

    /// True position at power up. The encoder reads zero here.
    ///
    /// Units: degrees
    pub initial_position_deg: f64,
}

/// Parameters of the simulated intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    pub arm: SimMotorParams,

    pub roller: SimMotorParams,

    /// The arm must be at or below this true angle for the rollers to pick up coral.
    ///
    /// Units: degrees
    pub coral_pickup_max_angle_deg: f64,

    /// Time the rollers must run forwards with the arm lowered to pick up coral.
    ///
    /// Units: seconds
    pub coral_intake_time_s: f64,

    /// Time the rollers must run in reverse to eject coral.
    ///
    /// Units: seconds
    pub coral_eject_time_s: f64,
}

/// A simulated motor.
#[derive(Debug, Clone)]
pub struct SimMotor {
    params: SimMotorParams,

    output: SimOutput,

    /// Position in the mechanism's true frame.
    true_pos_deg: f64,

    /// Encoder reading = true position - offset.
    offset_deg: f64,

    velocity_degs: f64,

    current_a: f64,
}

/// A simulated active-low beam break.
#[derive(Debug, Clone, Default)]
pub struct SimBeamBreak {
    coral: bool,

    /// Time the current pickup or eject condition has held for.
    dwell_s: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum SimOutput {
    Neutral,
    Voltage(f64),
    /// Target in the encoder frame
    Position(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            arm: SimMotorParams {
                free_speed_degs_per_v: 30.0,
                stall_current_a_per_v: 25.0,
                running_current_a: 4.0,
                max_position_rate_degs: 180.0,
                hard_stop_min_deg: Some(-40.0),
                hard_stop_max_deg: Some(118.0),
                initial_position_deg: 60.0,
            },
            roller: SimMotorParams {
                free_speed_degs_per_v: 500.0,
                stall_current_a_per_v: 10.0,
                running_current_a: 3.0,
                max_position_rate_degs: 0.0,
                hard_stop_min_deg: None,
                hard_stop_max_deg: None,
                initial_position_deg: 0.0,
            },
            coral_pickup_max_angle_deg: -25.0,
            coral_intake_time_s: 0.5,
            coral_eject_time_s: 0.3,
        }
    }
}

impl SimMotor {
    pub fn new(params: SimMotorParams) -> Self {
        Self {
            output: SimOutput::Neutral,
            true_pos_deg: params.initial_position_deg,
            offset_deg: params.initial_position_deg,
            velocity_degs: 0.0,
            current_a: 0.0,
            params,
        }
    }

    /// Position in the mechanism's true frame, independent of the encoder
    /// zero reference.
    pub fn true_position_deg(&self) -> f64 {
        self.true_pos_deg
    }

    /// The open-loop voltage currently applied, zero under position control
    /// or when stopped.
    pub fn applied_voltage(&self) -> f64 {
        match self.output {
            SimOutput::Voltage(v) => v,
            _ => 0.0,
        }
    }

    /// Advance the model by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }

        let demanded_vel_degs = match self.output {
            SimOutput::Neutral => 0.0,
            SimOutput::Voltage(v) => v * self.params.free_speed_degs_per_v,
            SimOutput::Position(target_deg) => {
                let error_deg = target_deg + self.offset_deg - self.true_pos_deg;
                let rate = self.params.max_position_rate_degs;
                (error_deg / dt).max(-rate).min(rate)
            }
        };

        let mut new_pos_deg = self.true_pos_deg + demanded_vel_degs * dt;
        let mut blocked = false;

        if let Some(max) = self.params.hard_stop_max_deg {
            if new_pos_deg >= max && demanded_vel_degs > 0.0 {
                new_pos_deg = max;
                blocked = self.true_pos_deg >= max;
            }
        }
        if let Some(min) = self.params.hard_stop_min_deg {
            if new_pos_deg <= min && demanded_vel_degs < 0.0 {
                new_pos_deg = min;
                blocked = self.true_pos_deg <= min;
            }
        }

        self.velocity_degs = (new_pos_deg - self.true_pos_deg) / dt;
        self.true_pos_deg = new_pos_deg;

        self.current_a = match self.output {
            SimOutput::Neutral => 0.0,
            SimOutput::Voltage(v) if blocked => v.abs() * self.params.stall_current_a_per_v,
            SimOutput::Voltage(v) => {
                // Current falls from stall towards the running current as the motor speeds up
                let free_speed = (v * self.params.free_speed_degs_per_v).abs();
                if free_speed > 0.0 {
                    lin_map(
                        (0.0, free_speed),
                        (v.abs() * self.params.stall_current_a_per_v, self.params.running_current_a),
                        self.velocity_degs.abs().min(free_speed),
                    )
                } else {
                    0.0
                }
            }
            SimOutput::Position(_) if self.velocity_degs.abs() > 0.0 => self.params.running_current_a,
            SimOutput::Position(_) => 0.5 * self.params.running_current_a,
        };
    }
}

impl Motor for SimMotor {
    fn set_voltage(&mut self, volts: f64) {
        self.output = SimOutput::Voltage(volts);
    }

    fn set_position(&mut self, angle_deg: f64, _slot: u8, _foc: bool) {
        self.output = SimOutput::Position(angle_deg);
    }

    fn stop(&mut self) {
        self.output = SimOutput::Neutral;
    }

    fn set_zero_reference(&mut self, angle_deg: f64) {
        self.offset_deg = self.true_pos_deg - angle_deg;
    }

    fn position_deg(&self) -> f64 {
        self.true_pos_deg - self.offset_deg
    }

    fn velocity_degs(&self) -> f64 {
        self.velocity_degs
    }

    fn stator_current_a(&self) -> f64 {
        self.current_a
    }
}

impl SimBeamBreak {
    pub fn new(coral: bool) -> Self {
        Self { coral, dwell_s: 0.0 }
    }

    pub fn has_coral(&self) -> bool {
        self.coral
    }

    fn update(&mut self, picking_up: bool, ejecting: bool, dt: f64, params: &SimParams) {
        let (active, required_s) = match (self.coral, picking_up, ejecting) {
            (false, true, _) => (true, params.coral_intake_time_s),
            (true, _, true) => (true, params.coral_eject_time_s),
            _ => (false, 0.0),
        };

        if !active {
            self.dwell_s = 0.0;
            return;
        }

        self.dwell_s += dt;
        if self.dwell_s >= required_s {
            self.coral = !self.coral;
            self.dwell_s = 0.0;
        }
    }
}

impl BinarySensor for SimBeamBreak {
    /// Active-low: reads low while coral breaks the beam.
    fn read(&self) -> bool {
        !self.coral
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build a simulated intake in its power up state.
pub fn new_sim_intake(params: &SimParams) -> IntakeMech<SimMotor, SimBeamBreak> {
    IntakeMech::new(
        SimMotor::new(params.arm),
        SimMotor::new(params.roller),
        SimBeamBreak::new(false),
    )
}

/// Advance the simulated intake by `dt` seconds.
pub fn step(mech: &mut IntakeMech<SimMotor, SimBeamBreak>, params: &SimParams, dt: f64) {
    mech.arm.step(dt);
    mech.roller.step(dt);

    let arm_lowered = mech.arm.true_position_deg() <= params.coral_pickup_max_angle_deg;
    let roller_v = mech.roller.applied_voltage();

    mech.beam_break
        .update(arm_lowered && roller_v > 0.0, roller_v < 0.0, dt, params);
}
