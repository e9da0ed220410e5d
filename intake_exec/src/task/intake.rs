//! # Intake tasks
//!
//! The named tasks that can be scheduled by telecommand.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{eqpt::mech::IntakeSens, tc::intake::IntakeCmd};
use util::maths::is_near;

use super::{Run, RunOnce, Sequence, Task, TaskExt, WaitUntil};
use crate::intake_ctrl::{IntakeCtrl, Preset};

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the task matching a telecommand.
pub fn from_cmd(cmd: IntakeCmd) -> Box<dyn Task> {
    match cmd {
        IntakeCmd::MoveTo { angle_deg } => move_to_angle(angle_deg),
        IntakeCmd::Home => homing(),
        IntakeCmd::Deploy => deploy(),
        IntakeCmd::Stow => stow(),
        IntakeCmd::AutoIntake => auto_intake(),
        IntakeCmd::RunRollers => run_rollers(),
        IntakeCmd::StopRollers => stop_rollers(),
        IntakeCmd::ReverseRollers => reverse_rollers(),
        IntakeCmd::Retract => retract(),
        IntakeCmd::GoDown => go_down(),
    }
}

/// Hold the arm target at `angle_deg`, finishing once the arm is within the completion tolerance.
pub fn move_to_angle(angle_deg: f64) -> Box<dyn Task> {
    Run::new("move_to_angle", move |c: &mut IntakeCtrl| c.set_target_angle(angle_deg))
        .until(move |c: &IntakeCtrl, s: &IntakeSens| {
            is_near(s.position_deg, angle_deg, c.params().at_target_tolerance_deg)
        })
        .boxed()
}

/// Hold the arm target at a preset, finishing once the arm is within the completion tolerance
/// of the preset angle.
pub fn move_to_preset(preset: Preset) -> Box<dyn Task> {
    let name = match preset {
        Preset::Retracted => "retract",
        Preset::Down => "go_down",
    };

    Run::new(name, move |c: &mut IntakeCtrl| c.set_target_preset(preset))
        .until(move |c: &IntakeCtrl, s: &IntakeSens| {
            is_near(s.position_deg, c.preset_deg(preset), c.params().at_target_tolerance_deg)
        })
        .boxed()
}

pub fn retract() -> Box<dyn Task> {
    move_to_preset(Preset::Retracted)
}

pub fn go_down() -> Box<dyn Task> {
    move_to_preset(Preset::Down)
}

/// Re-home the arm and wait for homing to complete.
pub fn homing() -> Box<dyn Task> {
    Sequence::new(
        "homing",
        vec![
            RunOnce::new("request_homing", |c: &mut IntakeCtrl| c.request_homing()).boxed(),
            WaitUntil::new("wait_homed", |c: &IntakeCtrl, _: &IntakeSens| c.is_homed()).boxed(),
        ],
    )
    .boxed()
}

pub fn deploy() -> Box<dyn Task> {
    RunOnce::new("deploy", |c: &mut IntakeCtrl| c.deploy()).boxed()
}

pub fn stow() -> Box<dyn Task> {
    RunOnce::new("stow", |c: &mut IntakeCtrl| c.stow()).boxed()
}

/// Deploy, wait for a game piece, then stow.
pub fn auto_intake() -> Box<dyn Task> {
    Sequence::new(
        "auto_intake",
        vec![
            deploy(),
            WaitUntil::new("wait_coral", |_: &IntakeCtrl, s: &IntakeSens| {
                crate::intake_ctrl::has_coral(s.beam_break_raw)
            })
            .boxed(),
            stow(),
        ],
    )
    .boxed()
}

/// Run the rollers forwards until cancelled.
pub fn run_rollers() -> Box<dyn Task> {
    Run::new("run_rollers", |c: &mut IntakeCtrl| c.start_rollers()).boxed()
}

/// Run the rollers in reverse until cancelled.
pub fn reverse_rollers() -> Box<dyn Task> {
    Run::new("reverse_rollers", |c: &mut IntakeCtrl| c.reverse_rollers()).boxed()
}

pub fn stop_rollers() -> Box<dyn Task> {
    RunOnce::new("stop_rollers", |c: &mut IntakeCtrl| c.stop_rollers()).boxed()
}
