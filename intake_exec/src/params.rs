//! # Intake Executable Parameters
//!
//! This module provides parameters for the intake executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mech::sim::SimParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeExecParams {
    /// Target period of one control cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Parameters of the simulated intake mechanism.
    pub sim: SimParams,
}

#[derive(Debug, Error)]
pub enum ExecParamsError {
    #[error("The cycle period must be finite and greater than zero, got {0} s")]
    InvalidCyclePeriod(f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl IntakeExecParams {
    /// Check the parameters can drive the main loop.
    pub fn validate(&self) -> Result<(), ExecParamsError> {
        if !self.cycle_period_s.is_finite() || self.cycle_period_s <= 0.0 {
            return Err(ExecParamsError::InvalidCyclePeriod(self.cycle_period_s));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_shipped_param_file() {
        let p: IntakeExecParams =
            util::params::from_str(include_str!("../../params/intake_exec.toml")).unwrap();

        assert_eq!(p.cycle_period_s, 0.02);
        assert_eq!(p.sim, SimParams::default());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_invalid_cycle_period() {
        let mut p: IntakeExecParams =
            util::params::from_str(include_str!("../../params/intake_exec.toml")).unwrap();

        for period in [-0.02, 0.0, f64::NAN, f64::INFINITY].iter() {
            p.cycle_period_s = *period;
            assert!(matches!(
                p.validate(),
                Err(ExecParamsError::InvalidCyclePeriod(_))
            ));
        }
    }
}
