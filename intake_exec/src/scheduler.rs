//! # Task scheduler
//!
//! Holds at most one active [`Task`] and polls it once per cycle. Scheduling a new task replaces
//! the active one immediately, the replaced task gets no chance to clean up.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::mech::IntakeSens;
use log::info;

use crate::{intake_ctrl::IntakeCtrl, task::Task};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Default)]
pub struct TaskScheduler {
    active: Option<Box<dyn Task>>,

    /// True once the active task's `init` has been called.
    initialised: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TaskScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `task` the active task, replacing any task already running.
    pub fn schedule(&mut self, task: Box<dyn Task>) {
        match self.active {
            Some(ref old) => info!("Task {} replaced by {}", old.name(), task.name()),
            None => info!("Task {} scheduled", task.name()),
        }

        self.active = Some(task);
        self.initialised = false;
    }

    /// Drop the active task, if any.
    pub fn cancel(&mut self) {
        if let Some(task) = self.active.take() {
            info!("Task {} cancelled", task.name());
        }
        self.initialised = false;
    }

    /// Poll the active task. Must be called once per cycle, before the
    /// controller's cyclic processing.
    pub fn poll(&mut self, ctrl: &mut IntakeCtrl, sens: &IntakeSens) {
        let task = match self.active.as_mut() {
            Some(t) => t,
            None => return,
        };

        if !self.initialised {
            task.init(ctrl, sens);
            self.initialised = true;
        }

        task.execute(ctrl, sens);

        if task.is_finished(ctrl, sens) {
            info!("Task {} finished at {:.3} s", task.name(), sens.time_s);
            self.active = None;
            self.initialised = false;
        }
    }

    /// Name of the active task.
    pub fn active_name(&self) -> Option<&str> {
        self.active.as_ref().map(|t| t.name())
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::task::{intake, Run, RunOnce, TaskExt};

    #[test]
    fn test_run_to_completion() {
        let mut ctrl = IntakeCtrl::default();
        let mut sched = TaskScheduler::new();
        assert!(sched.is_idle());

        sched.schedule(intake::deploy());
        assert_eq!(sched.active_name(), Some("deploy"));

        sched.poll(&mut ctrl, &IntakeSens::default());
        assert!(ctrl.is_down());
        assert!(sched.is_idle());

        // Polling with nothing scheduled is a no-op
        sched.poll(&mut ctrl, &IntakeSens::default());
        assert!(ctrl.is_down());
    }

    #[test]
    fn test_schedule_replaces_without_cleanup() {
        let mut ctrl = IntakeCtrl::default();
        let mut sched = TaskScheduler::new();
        let sens = IntakeSens::default();

        sched.schedule(intake::run_rollers());
        sched.poll(&mut ctrl, &sens);
        sched.poll(&mut ctrl, &sens);
        assert_eq!(sched.active_name(), Some("run_rollers"));
        assert!(ctrl.rollers_running());

        // The new task doesn't touch the rollers, so they stay as the old task left them
        sched.schedule(intake::move_to_angle(-10.0));
        sched.poll(&mut ctrl, &sens);
        assert_eq!(sched.active_name(), Some("move_to_angle"));
        assert!(ctrl.rollers_running());
        assert_eq!(ctrl.target_deg(), -10.0);
    }

    #[test]
    fn test_init_called_once_per_schedule() {
        struct CountInit {
            inits: std::rc::Rc<std::cell::Cell<u32>>,
        }

        impl Task for CountInit {
            fn name(&self) -> &str {
                "count_init"
            }
            fn init(&mut self, _: &mut IntakeCtrl, _: &IntakeSens) {
                self.inits.set(self.inits.get() + 1);
            }
            fn execute(&mut self, _: &mut IntakeCtrl, _: &IntakeSens) {}
            fn is_finished(&self, _: &IntakeCtrl, _: &IntakeSens) -> bool {
                false
            }
        }

        let inits = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut ctrl = IntakeCtrl::default();
        let mut sched = TaskScheduler::new();
        let sens = IntakeSens::default();

        sched.schedule(Box::new(CountInit { inits: inits.clone() }));
        for _ in 0..5 {
            sched.poll(&mut ctrl, &sens);
        }
        assert_eq!(inits.get(), 1);

        sched.cancel();
        assert!(sched.is_idle());
        sched.poll(&mut ctrl, &sens);
        assert_eq!(inits.get(), 1);
    }

    #[test]
    fn test_cancel_stops_reapplying() {
        let mut ctrl = IntakeCtrl::default();
        let mut sched = TaskScheduler::new();
        let sens = IntakeSens::default();

        sched.schedule(Run::new("hold", |c: &mut IntakeCtrl| c.set_target_angle(0.0)).boxed());
        sched.poll(&mut ctrl, &sens);
        sched.cancel();

        ctrl.set_target_angle(12.0);
        sched.poll(&mut ctrl, &sens);
        assert_eq!(ctrl.target_deg(), 12.0);

        sched.schedule(RunOnce::new("once", |c: &mut IntakeCtrl| c.stop_rollers()).boxed());
        sched.poll(&mut ctrl, &sens);
        assert!(sched.is_idle());
    }
}
