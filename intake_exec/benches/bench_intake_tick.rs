//! # Intake Control Cycle Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use comms_if::eqpt::mech::IntakeSens;
use intake_lib::{
    data_store::DataStore,
    intake_ctrl::IntakeCtrl,
    mech::sim::{self, SimParams},
    task::intake,
    tm::TmTable,
};
use util::module::State;

fn intake_tick_benchmark(c: &mut Criterion) {
    // ---- Controller alone ----

    // Seeking, the homing state machine is evaluated every cycle
    let sens = IntakeSens {
        time_s: 1.0,
        position_deg: 60.0,
        velocity_degs: 60.0,
        current_a: 4.0,
        beam_break_raw: true,
    };
    let mut ctrl = IntakeCtrl::default();

    c.bench_function("IntakeCtrl::proc::seeking", |b| {
        b.iter(|| ctrl.proc(&sens).unwrap_or_else(|e| match e {}))
    });

    // ---- Full cycle against the simulation ----

    let params = SimParams::default();
    let mut mech = sim::new_sim_intake(&params);
    let mut tm = TmTable::new();
    let mut ds = DataStore::default();

    // Get through power up homing so the cycle runs under position control
    while ds.intake_ctrl.needs_homing() {
        ds.cycle_start(0.02);
        ds.step(&mut mech, &mut tm);
        sim::step(&mut mech, &params, 0.02);
        ds.cycle_end();
    }

    ds.scheduler.schedule(intake::run_rollers());

    c.bench_function("DataStore::step::sim", |b| {
        b.iter(|| {
            ds.cycle_start(0.02);
            ds.step(&mut mech, &mut tm);
            sim::step(&mut mech, &params, 0.02);
            ds.cycle_end();
        })
    });
}

criterion_group!(benches, intake_tick_benchmark);
criterion_main!(benches);
