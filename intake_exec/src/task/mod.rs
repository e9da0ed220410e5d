//! # Tasks
//!
//! A task is a unit of intake behaviour which runs over a number of cycles, for example moving the
//! arm to a preset and waiting until it gets there. Tasks are polled by the
//! [`TaskScheduler`](crate::scheduler::TaskScheduler) once per cycle before the controller's
//! cyclic processing, so anything a task commands takes effect on the same cycle.
//!
//! Larger behaviours are built from a small set of combinators:
//!
//! - [`RunOnce`] - perform an action once and finish
//! - [`Run`] - perform an action every cycle, never finishing on its own
//! - [`WaitUntil`] - do nothing until a condition holds
//! - [`Until`] - run another task until a condition holds
//! - [`Sequence`] - run tasks one after another

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// The named intake tasks.
pub mod intake;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::mech::IntakeSens;
use log::debug;

use crate::intake_ctrl::IntakeCtrl;

pub use intake::from_cmd;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A task run by the scheduler.
///
/// On each cycle the scheduler calls `init` (first cycle only), then `execute`, then
/// `is_finished`. A finished task is dropped and never polled again.
pub trait Task {
    /// Name used in logs.
    fn name(&self) -> &str;

    fn init(&mut self, _ctrl: &mut IntakeCtrl, _sens: &IntakeSens) {}

    fn execute(&mut self, ctrl: &mut IntakeCtrl, sens: &IntakeSens);

    fn is_finished(&self, ctrl: &IntakeCtrl, sens: &IntakeSens) -> bool;
}

/// Combinator methods available on every task.
pub trait TaskExt: Task + Sized + 'static {
    /// Run this task until it finishes or `pred` holds, whichever is first.
    fn until<P>(self, pred: P) -> Until<Self, P>
    where
        P: Fn(&IntakeCtrl, &IntakeSens) -> bool,
    {
        Until { task: self, pred }
    }

    fn boxed(self) -> Box<dyn Task> {
        Box::new(self)
    }
}

impl<T: Task + 'static> TaskExt for T {}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Perform an action on the first cycle, then finish.
pub struct RunOnce<F> {
    name: &'static str,
    action: F,
    done: bool,
}

/// Perform an action every cycle. Never finishes unless wrapped in [`Until`].
pub struct Run<F> {
    name: &'static str,
    action: F,
}

/// Do nothing until a condition holds.
pub struct WaitUntil<P> {
    name: &'static str,
    pred: P,
}

/// Run a task until it finishes or a condition holds.
pub struct Until<T, P> {
    task: T,
    pred: P,
}

/// Run a list of tasks in order. Each task is initialised on the cycle it becomes current and the
/// next task starts on the cycle after the current one finishes.
pub struct Sequence {
    name: &'static str,
    tasks: Vec<Box<dyn Task>>,
    index: usize,
    current_init: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<F> RunOnce<F>
where
    F: FnMut(&mut IntakeCtrl),
{
    pub fn new(name: &'static str, action: F) -> Self {
        Self {
            name,
            action,
            done: false,
        }
    }
}

impl<F> Task for RunOnce<F>
where
    F: FnMut(&mut IntakeCtrl),
{
    fn name(&self) -> &str {
        self.name
    }

    fn execute(&mut self, ctrl: &mut IntakeCtrl, _sens: &IntakeSens) {
        if !self.done {
            (self.action)(ctrl);
            self.done = true;
        }
    }

    fn is_finished(&self, _ctrl: &IntakeCtrl, _sens: &IntakeSens) -> bool {
        self.done
    }
}

impl<F> Run<F>
where
    F: FnMut(&mut IntakeCtrl),
{
    pub fn new(name: &'static str, action: F) -> Self {
        Self { name, action }
    }
}

impl<F> Task for Run<F>
where
    F: FnMut(&mut IntakeCtrl),
{
    fn name(&self) -> &str {
        self.name
    }

    fn execute(&mut self, ctrl: &mut IntakeCtrl, _sens: &IntakeSens) {
        (self.action)(ctrl);
    }

    fn is_finished(&self, _ctrl: &IntakeCtrl, _sens: &IntakeSens) -> bool {
        false
    }
}

impl<P> WaitUntil<P>
where
    P: Fn(&IntakeCtrl, &IntakeSens) -> bool,
{
    pub fn new(name: &'static str, pred: P) -> Self {
        Self { name, pred }
    }
}

impl<P> Task for WaitUntil<P>
where
    P: Fn(&IntakeCtrl, &IntakeSens) -> bool,
{
    fn name(&self) -> &str {
        self.name
    }

    fn execute(&mut self, _ctrl: &mut IntakeCtrl, _sens: &IntakeSens) {}

    fn is_finished(&self, ctrl: &IntakeCtrl, sens: &IntakeSens) -> bool {
        (self.pred)(ctrl, sens)
    }
}

impl<T, P> Task for Until<T, P>
where
    T: Task,
    P: Fn(&IntakeCtrl, &IntakeSens) -> bool,
{
    fn name(&self) -> &str {
        self.task.name()
    }

    fn init(&mut self, ctrl: &mut IntakeCtrl, sens: &IntakeSens) {
        self.task.init(ctrl, sens);
    }

    fn execute(&mut self, ctrl: &mut IntakeCtrl, sens: &IntakeSens) {
        self.task.execute(ctrl, sens);
    }

    fn is_finished(&self, ctrl: &IntakeCtrl, sens: &IntakeSens) -> bool {
        self.task.is_finished(ctrl, sens) || (self.pred)(ctrl, sens)
    }
}

impl Sequence {
    pub fn new(name: &'static str, tasks: Vec<Box<dyn Task>>) -> Self {
        Self {
            name,
            tasks,
            index: 0,
            current_init: false,
        }
    }

    /// Name of the task currently running in the sequence.
    pub fn current_name(&self) -> Option<&str> {
        self.tasks.get(self.index).map(|t| t.name())
    }
}

impl Task for Sequence {
    fn name(&self) -> &str {
        self.name
    }

    fn execute(&mut self, ctrl: &mut IntakeCtrl, sens: &IntakeSens) {
        let task = match self.tasks.get_mut(self.index) {
            Some(t) => t,
            None => return,
        };

        if !self.current_init {
            task.init(ctrl, sens);
            self.current_init = true;
        }

        task.execute(ctrl, sens);

        if task.is_finished(ctrl, sens) {
            debug!("{}: step {} ({}) complete", self.name, self.index, task.name());
            self.index += 1;
            self.current_init = false;
        }
    }

    fn is_finished(&self, _ctrl: &IntakeCtrl, _sens: &IntakeSens) -> bool {
        self.index >= self.tasks.len()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Poll a task the way the scheduler does, returning true once finished.
    fn poll(task: &mut dyn Task, ctrl: &mut IntakeCtrl, sens: &IntakeSens) -> bool {
        task.execute(ctrl, sens);
        task.is_finished(ctrl, sens)
    }

    #[test]
    fn test_run_once() {
        let mut ctrl = IntakeCtrl::default();
        let sens = IntakeSens::default();
        let mut count = 0;

        {
            let mut task = RunOnce::new("count", |_: &mut IntakeCtrl| count += 1);
            assert!(!task.is_finished(&ctrl, &sens));
            assert!(poll(&mut task, &mut ctrl, &sens));
            assert!(poll(&mut task, &mut ctrl, &sens));
        }

        assert_eq!(count, 1);
    }

    #[test]
    fn test_run_until() {
        let mut ctrl = IntakeCtrl::default();
        let mut task = Run::new("rollers", |c: &mut IntakeCtrl| c.start_rollers())
            .until(|_, s: &IntakeSens| s.time_s > 1.0);

        let mut sens = IntakeSens::default();
        assert!(!poll(&mut task, &mut ctrl, &sens));
        assert!(ctrl.rollers_running());

        // Re-applied every cycle
        ctrl.stop_rollers();
        sens.time_s = 0.5;
        assert!(!poll(&mut task, &mut ctrl, &sens));
        assert!(ctrl.rollers_running());

        sens.time_s = 1.5;
        assert!(poll(&mut task, &mut ctrl, &sens));
        assert_eq!(task.name(), "rollers");
    }

    #[test]
    fn test_sequence() {
        let mut ctrl = IntakeCtrl::default();
        let mut sens = IntakeSens { beam_break_raw: true, ..Default::default() };

        let mut seq = Sequence::new(
            "seq",
            vec![
                RunOnce::new("deploy", |c: &mut IntakeCtrl| c.deploy()).boxed(),
                WaitUntil::new("wait", |_: &IntakeCtrl, s: &IntakeSens| !s.beam_break_raw)
                    .boxed(),
                RunOnce::new("stow", |c: &mut IntakeCtrl| c.stow()).boxed(),
            ],
        );

        assert_eq!(seq.current_name(), Some("deploy"));
        assert!(!poll(&mut seq, &mut ctrl, &sens));
        assert!(ctrl.is_down());
        assert_eq!(seq.current_name(), Some("wait"));

        for _ in 0..10 {
            assert!(!poll(&mut seq, &mut ctrl, &sens));
        }
        assert_eq!(seq.current_name(), Some("wait"));

        sens.beam_break_raw = false;
        assert!(!poll(&mut seq, &mut ctrl, &sens));
        assert_eq!(seq.current_name(), Some("stow"));
        assert!(ctrl.rollers_running());

        assert!(poll(&mut seq, &mut ctrl, &sens));
        assert!(!ctrl.rollers_running());
        assert!(!ctrl.is_down());
        assert_eq!(seq.current_name(), None);
    }

    #[test]
    fn test_empty_sequence_finishes() {
        let mut ctrl = IntakeCtrl::default();
        let sens = IntakeSens::default();
        let mut seq = Sequence::new("empty", vec![]);
        assert!(poll(&mut seq, &mut ctrl, &sens));
    }
}
