//! # Data Store
//!
//! Global data for the executable, and the ordering of one control cycle.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::mech::{IntakeDems, IntakeSens};
use log::trace;

use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
};

use crate::{
    intake_ctrl::{self, IntakeCtrl},
    mech::{BinarySensor, IntakeMech, Motor},
    scheduler::TaskScheduler,
    tm::{self, TmSink},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    /// Time of the current cycle since the start of execution
    pub time_s: f64,

    // IntakeCtrl
    pub intake_ctrl: IntakeCtrl,
    pub intake_sens: IntakeSens,
    pub intake_dems: Option<IntakeDems>,
    pub intake_status_rpt: intake_ctrl::StatusReport,

    // Tasks
    pub scheduler: TaskScheduler,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,

    /// Total number of telemetry entries which could not be published
    pub num_tm_failures: u64,

    /// Archive of the intake status reports, disabled until set up
    pub archiver: Archiver,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Sets the cycle time and the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_period_s: f64) {
        let cycles_per_s = ((1.0 / cycle_period_s).round() as u128).max(1);

        self.is_1_hz_cycle = self.num_cycles % cycles_per_s == 0;
        self.time_s = self.num_cycles as f64 * cycle_period_s;
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }

    /// Run one control cycle against the given mechanism.
    ///
    /// The order is fixed: acquire sensor data, poll the active task, run the
    /// controller, actuate the demands, then publish telemetry.
    pub fn step<M, S, T>(&mut self, mech: &mut IntakeMech<M, S>, tm_sink: &mut T)
    where
        M: Motor,
        S: BinarySensor,
        T: TmSink,
    {
        self.intake_sens = mech.read_sens(self.time_s);

        self.scheduler.poll(&mut self.intake_ctrl, &self.intake_sens);

        let (dems, rpt) = self
            .intake_ctrl
            .proc(&self.intake_sens)
            .unwrap_or_else(|e| match e {});

        mech.apply(&dems);

        self.intake_dems = Some(dems);
        self.intake_status_rpt = rpt;

        let num_failed = tm::publish_intake(tm_sink, &rpt, self.scheduler.active_name());
        self.num_tm_failures += num_failed as u64;

        trace!("Cycle {} complete", self.num_cycles);
    }
}

impl Archived for DataStore {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.archiver.serialise(&self.intake_status_rpt)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        intake_ctrl::HomingStatus,
        mech::sim::{self, SimBeamBreak, SimMotor, SimParams},
        task::intake,
        tm::{TmTable, TmValue, KEY_HOMING_STATE},
    };
    use comms_if::eqpt::mech::ArmDem;

    const PERIOD_S: f64 = 0.02;

    struct Harness {
        ds: DataStore,
        mech: IntakeMech<SimMotor, SimBeamBreak>,
        params: SimParams,
        tm: TmTable,
    }

    impl Harness {
        fn new() -> Self {
            let params = SimParams::default();
            Self {
                ds: DataStore::default(),
                mech: sim::new_sim_intake(&params),
                params,
                tm: TmTable::new(),
            }
        }

        fn cycle(&mut self) {
            self.ds.cycle_start(PERIOD_S);
            self.ds.step(&mut self.mech, &mut self.tm);
            sim::step(&mut self.mech, &self.params, PERIOD_S);
            self.ds.cycle_end();
        }

        /// Cycle until `pred` holds, returning the number of cycles taken.
        fn cycle_until<F: Fn(&Self) -> bool>(&mut self, max_cycles: usize, pred: F) -> Option<usize> {
            for i in 0..max_cycles {
                self.cycle();
                if pred(self) {
                    return Some(i + 1);
                }
            }
            None
        }
    }

    #[test]
    fn test_cycle_start() {
        let mut ds = DataStore::default();
        ds.cycle_start(PERIOD_S);
        assert!(ds.is_1_hz_cycle);
        assert_eq!(ds.time_s, 0.0);

        ds.cycle_end();
        ds.cycle_start(PERIOD_S);
        assert!(!ds.is_1_hz_cycle);

        ds.num_cycles = 50;
        ds.cycle_start(PERIOD_S);
        assert!(ds.is_1_hz_cycle);
        assert!((ds.time_s - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_power_up_homing() {
        let mut h = Harness::new();

        h.cycle();
        assert!(matches!(h.ds.intake_dems, Some(IntakeDems { arm: ArmDem::Voltage { .. }, .. })));
        assert_eq!(h.tm.get(KEY_HOMING_STATE), Some(&TmValue::Text("HOMING".into())));

        // 58 degrees to the stop at 60 deg/s
        let n = h
            .cycle_until(200, |h| !h.ds.intake_ctrl.needs_homing())
            .expect("homing never completed");
        assert!(n > 40);

        assert_eq!(h.ds.intake_ctrl.homing_status(), HomingStatus::Idle);

        // Zeroed on the stop, so the encoder now agrees with the true angle
        assert!((h.mech.arm.position_deg() - h.mech.arm.true_position_deg()).abs() < 1e-9);
        assert_eq!(h.tm.get(KEY_HOMING_STATE), Some(&TmValue::Text("IDLE".into())));

        // Now under position control, back down to the retracted preset
        h.cycle_until(100, |h| h.ds.intake_ctrl.is_at_target(h.mech.arm.position_deg()))
            .expect("never reached the retracted preset");
        assert!((h.mech.arm.true_position_deg() - 90.0).abs() <= 2.0);
    }

    #[test]
    fn test_auto_intake_with_sim() {
        let mut h = Harness::new();
        h.cycle_until(200, |h| !h.ds.intake_ctrl.needs_homing()).unwrap();

        h.ds.scheduler.schedule(intake::auto_intake());

        h.cycle_until(500, |h| h.ds.intake_ctrl.has_coral())
            .expect("coral never picked up");
        assert!(h.mech.beam_break.has_coral());
        assert!(h.ds.intake_status_rpt.is_down);

        h.cycle_until(10, |h| h.ds.scheduler.is_idle())
            .expect("auto intake never finished");
        assert!(!h.ds.intake_ctrl.rollers_running());
        assert_eq!(h.ds.intake_ctrl.target_deg(), 90.0);

        // Eject
        h.ds.scheduler.schedule(intake::reverse_rollers());
        h.cycle_until(100, |h| !h.mech.beam_break.has_coral())
            .expect("coral never ejected");
        assert_eq!(h.ds.scheduler.active_name(), Some("reverse_rollers"));
        assert_eq!(h.ds.num_tm_failures, 0);
    }

    #[test]
    fn test_rehoming_task() {
        let mut h = Harness::new();
        h.cycle_until(200, |h| !h.ds.intake_ctrl.needs_homing()).unwrap();

        h.ds.scheduler.schedule(intake::go_down());
        h.cycle_until(200, |h| h.ds.scheduler.is_idle()).expect("never got down");

        h.ds.scheduler.schedule(intake::homing());
        h.cycle();
        assert!(h.ds.intake_ctrl.needs_homing());

        h.cycle_until(400, |h| h.ds.scheduler.is_idle()).expect("rehoming never finished");
        assert!(!h.ds.intake_ctrl.needs_homing());
        assert_eq!(h.ds.intake_ctrl.homing_status(), HomingStatus::Idle);
        assert_eq!(h.ds.intake_status_rpt.target_deg, -32.0);
    }

    #[test]
    fn test_archive_rows() {
        let path = std::env::temp_dir()
            .join(format!("intake_exec_ds_archive_{}.csv", std::process::id()));
        let mut h = Harness::new();
        h.ds.archiver = Archiver::from_abs_path(&path).unwrap();

        for _ in 0..3 {
            h.cycle();
            h.ds.write().unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("time_s,position_deg,target_deg,homing_status"));
        assert!(lines[1].starts_with("0.0,0.0,90.0,HOMING"));

        std::fs::remove_file(path).ok();
    }
}
