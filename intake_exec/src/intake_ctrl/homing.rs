//! Homing state machine
//!
//! The arm has no limit switch. Homing drives it into its hard stop with a fixed voltage and infers
//! that the stop has been reached from a stall signature: near zero velocity while the motor draws
//! a high current. At that point the encoder's zero reference is redefined to the known angle of
//! the stop.
//!
//! The transition function in this module is pure so the table can be tested without hardware.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::is_near;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The measurements the homing state machine is evaluated against.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HomingSnapshot {
    /// Units: degrees
    pub position_deg: f64,

    /// Units: degrees/second
    pub velocity_degs: f64,

    /// Units: amps
    pub current_a: f64,

    /// Time of this evaluation.
    ///
    /// Units: seconds
    pub now_s: f64,

    /// Time the current homing attempt was started.
    ///
    /// Units: seconds
    pub start_time_s: f64,
}

/// Thresholds used by the homing transitions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomingThresholds {
    /// Angle of the hard stop, the encoder is zeroed to this value.
    pub homing_angle_deg: f64,

    /// Distance from the hard stop within which homing may be re-armed.
    pub near_tolerance_deg: f64,

    /// Time after a homing attempt starts before it may be re-armed.
    pub timeout_s: f64,

    /// Velocity magnitude below which the arm is considered stalled.
    pub stall_velocity_degs: f64,

    /// Current at or above which the arm is considered to be pushing on the stop.
    pub current_threshold_a: f64,
}

/// The result of evaluating the state machine once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomingTransition {
    pub next: HomingStatus,
    pub effect: Option<HomingEffect>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Homing status of the arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HomingStatus {
    /// Not homing, the arm is under closed-loop position control.
    #[serde(rename = "IDLE")]
    Idle,

    /// Driving into the hard stop with the homing voltage.
    #[serde(rename = "HOMING")]
    Seeking,

    /// The stop was found on this evaluation. Only lasts until the next evaluation.
    #[serde(rename = "HOMED")]
    Homed,
}

/// Side effects the controller must apply after a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HomingEffect {
    /// Restart the homing timer at the given time (seconds).
    RestartTimer(f64),

    /// Redefine the encoder zero reference to the given angle (degrees).
    SetZeroReference(f64),

    /// Homing is complete and no longer needed.
    ClearNeedsHoming,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for HomingStatus {
    /// The arm position is unknown on power up.
    fn default() -> Self {
        HomingStatus::Seeking
    }
}

impl std::fmt::Display for HomingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HomingStatus::Idle => write!(f, "IDLE"),
            HomingStatus::Seeking => write!(f, "HOMING"),
            HomingStatus::Homed => write!(f, "HOMED"),
        }
    }
}

impl HomingTransition {
    fn stay(status: HomingStatus) -> Self {
        Self { next: status, effect: None }
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Evaluate the homing state machine once.
///
/// | From    | Guard                                      | To      | Effect              |
/// |---------|--------------------------------------------|---------|---------------------|
/// | Idle    | near the stop and the timeout has elapsed  | Seeking | restart the timer   |
/// | Seeking | stalled and current at/above the threshold | Homed   | zero to stop angle  |
/// | Homed   | always                                     | Idle    | clear needs homing  |
pub fn step(
    status: HomingStatus,
    snapshot: &HomingSnapshot,
    thresholds: &HomingThresholds,
) -> HomingTransition {
    match status {
        HomingStatus::Idle => {
            let timed_out = (snapshot.now_s - snapshot.start_time_s) > thresholds.timeout_s;
            let near_stop = is_near(
                snapshot.position_deg,
                thresholds.homing_angle_deg,
                thresholds.near_tolerance_deg,
            );

            if near_stop && timed_out {
                HomingTransition {
                    next: HomingStatus::Seeking,
                    effect: Some(HomingEffect::RestartTimer(snapshot.now_s)),
                }
            } else {
                HomingTransition::stay(status)
            }
        }
        HomingStatus::Seeking => {
            let stalled = snapshot.velocity_degs.abs() < thresholds.stall_velocity_degs;
            let current_high = snapshot.current_a >= thresholds.current_threshold_a;

            if stalled && current_high {
                HomingTransition {
                    next: HomingStatus::Homed,
                    effect: Some(HomingEffect::SetZeroReference(thresholds.homing_angle_deg)),
                }
            } else {
                HomingTransition::stay(status)
            }
        }
        HomingStatus::Homed => HomingTransition {
            next: HomingStatus::Idle,
            effect: Some(HomingEffect::ClearNeedsHoming),
        },
    }
}
