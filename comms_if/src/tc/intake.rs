//! # Intake telecommands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use structopt::StructOpt;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command for the intake mechanism. Each command starts the matching intake task, replacing
/// whichever task was running before.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, StructOpt)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum IntakeCmd {
    /// Move the arm to an angle, finishing once the arm is within tolerance of it.
    #[structopt(name = "move-to")]
    MoveTo {
        /// Target arm angle in degrees.
        #[structopt(allow_hyphen_values = true)]
        angle_deg: f64,
    },

    /// Re-home the arm against its hard stop.
    #[structopt(name = "home")]
    Home,

    /// Lower the arm and start the rollers.
    #[structopt(name = "deploy")]
    Deploy,

    /// Retract the arm and stop the rollers.
    #[structopt(name = "stow")]
    Stow,

    /// Deploy, wait for a game piece to be detected, then stow.
    #[structopt(name = "auto")]
    AutoIntake,

    /// Run the rollers forwards (intake).
    #[structopt(name = "rollers-in")]
    RunRollers,

    /// Stop the rollers.
    #[structopt(name = "rollers-stop")]
    StopRollers,

    /// Run the rollers in reverse (eject).
    #[structopt(name = "rollers-out")]
    ReverseRollers,

    /// Move the arm to the retracted preset.
    #[structopt(name = "retract")]
    Retract,

    /// Move the arm to the lowered preset.
    #[structopt(name = "down")]
    GoDown,
}
