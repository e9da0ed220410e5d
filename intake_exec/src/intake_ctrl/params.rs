//! Parameters structure for IntakeCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

use super::{homing::HomingThresholds, IntakeCtrlError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for intake control.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    // ---- PRESETS ----

    /// Stowed arm position.
    ///
    /// Units: degrees
    pub retracted_angle_deg: f64,

    /// Lowered arm position used for ground intake.
    ///
    /// Units: degrees
    pub down_angle_deg: f64,

    /// Angle of the hard stop the arm homes against.
    ///
    /// Units: degrees
    pub homing_angle_deg: f64,

    // ---- HOMING ----

    /// Open-loop voltage applied while seeking the hard stop.
    ///
    /// Units: volts
    pub homing_voltage_v: f64,

    /// Stator current at or above which the arm is considered to be on the stop.
    ///
    /// Units: amps
    pub homing_current_threshold_a: f64,

    /// Velocity magnitude below which the arm is considered stalled.
    ///
    /// Units: degrees/second
    pub homing_stall_velocity_degs: f64,

    /// Time after which an idle arm resting near the stop re-arms homing.
    ///
    /// Units: seconds
    pub homing_timeout_s: f64,

    /// Distance from the stop within which homing may be re-armed.
    ///
    /// Units: degrees
    pub homing_near_tolerance_deg: f64,

    // ---- ROLLERS ----

    /// Roller intake voltage.
    ///
    /// Units: volts
    pub roller_forward_v: f64,

    /// Roller eject voltage.
    ///
    /// Units: volts
    pub roller_reverse_v: f64,

    // ---- POSITION CONTROL ----

    /// Gain slot used for closed-loop position demands.
    pub position_slot: u8,

    /// Use field oriented commutation for position demands.
    pub position_foc: bool,

    /// Distance from the target at which a move is considered complete.
    ///
    /// Units: degrees
    pub at_target_tolerance_deg: f64,

    // ---- CAPABILITIES ----

    /// Minimum angle of the arm's travel. Reported, not enforced.
    ///
    /// Units: degrees
    pub min_angle_deg: f64,

    /// Maximum angle of the arm's travel. Reported, not enforced.
    ///
    /// Units: degrees
    pub max_angle_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            retracted_angle_deg: 90.0,
            down_angle_deg: -32.0,
            homing_angle_deg: 118.0,
            homing_voltage_v: 2.0,
            homing_current_threshold_a: 40.0,
            homing_stall_velocity_degs: 0.5,
            homing_timeout_s: 10.0,
            homing_near_tolerance_deg: 5.0,
            roller_forward_v: 6.0,
            roller_reverse_v: -4.0,
            position_slot: 0,
            position_foc: true,
            at_target_tolerance_deg: 2.0,
            min_angle_deg: -95.0,
            max_angle_deg: 5.0,
        }
    }
}

impl Params {
    /// The subset of parameters used by the homing state machine.
    pub fn homing_thresholds(&self) -> HomingThresholds {
        HomingThresholds {
            homing_angle_deg: self.homing_angle_deg,
            near_tolerance_deg: self.homing_near_tolerance_deg,
            timeout_s: self.homing_timeout_s,
            stall_velocity_degs: self.homing_stall_velocity_degs,
            current_threshold_a: self.homing_current_threshold_a,
        }
    }

    /// Check the parameters are self consistent.
    pub fn validate(&self) -> Result<(), IntakeCtrlError> {
        let all = [
            self.retracted_angle_deg,
            self.down_angle_deg,
            self.homing_angle_deg,
            self.homing_voltage_v,
            self.homing_current_threshold_a,
            self.homing_stall_velocity_degs,
            self.homing_timeout_s,
            self.homing_near_tolerance_deg,
            self.roller_forward_v,
            self.roller_reverse_v,
            self.at_target_tolerance_deg,
            self.min_angle_deg,
            self.max_angle_deg,
        ];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(IntakeCtrlError::InvalidParams("all values must be finite"));
        }

        if self.homing_current_threshold_a <= 0.0 {
            return Err(IntakeCtrlError::InvalidParams(
                "homing_current_threshold_a must be positive",
            ));
        }
        if self.homing_stall_velocity_degs <= 0.0 {
            return Err(IntakeCtrlError::InvalidParams(
                "homing_stall_velocity_degs must be positive",
            ));
        }
        if self.homing_timeout_s <= 0.0 {
            return Err(IntakeCtrlError::InvalidParams("homing_timeout_s must be positive"));
        }
        if self.homing_near_tolerance_deg < 0.0 || self.at_target_tolerance_deg < 0.0 {
            return Err(IntakeCtrlError::InvalidParams("tolerances must not be negative"));
        }
        if self.min_angle_deg >= self.max_angle_deg {
            return Err(IntakeCtrlError::InvalidParams(
                "min_angle_deg must be less than max_angle_deg",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Params::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_params() {
        let p = Params { homing_timeout_s: 0.0, ..Default::default() };
        assert!(matches!(p.validate(), Err(IntakeCtrlError::InvalidParams(_))));

        let p = Params { min_angle_deg: 5.0, max_angle_deg: -95.0, ..Default::default() };
        assert!(matches!(p.validate(), Err(IntakeCtrlError::InvalidParams(_))));

        let p = Params { down_angle_deg: f64::NAN, ..Default::default() };
        assert!(matches!(p.validate(), Err(IntakeCtrlError::InvalidParams(_))));
    }

    #[test]
    fn test_shipped_param_file() {
        let p: Params = util::params::from_str(include_str!("../../../params/intake_ctrl.toml"))
            .unwrap();
        assert_eq!(p, Params::default());
    }
}
