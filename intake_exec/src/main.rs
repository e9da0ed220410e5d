//! Main intake executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Telecommand processing, scheduling the matching intake task
//!         - Actuator sensing
//!         - Task polling
//!         - Intake control processing
//!         - Actuation of the demands
//!         - Telemetry and archiving
//!         - Simulation step
//!
//! Telecommands are read from a script of timed TCs if one is given on the
//! command line, otherwise from the console, for example `intake move-to -32`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod tc_processor;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{debug, info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use comms_if::tc::Tc;
use intake_lib::{
    data_store::DataStore,
    mech::sim,
    params::IntakeExecParams,
    tm::JsonTmSink,
};
use util::{
    archive::{Archived, Archiver},
    logger::{logger_init, LevelFilter},
    module::State,
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Prompt shown by the console.
#[cfg(feature = "console")]
const PROMPT: &str = "intake $ ";

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Command line options.
#[derive(Debug, StructOpt)]
#[structopt(name = "intake_exec", about = "Intake arm control executable")]
struct Opt {
    /// Script of timed telecommands to execute. If not given telecommands are
    /// read from the console.
    #[structopt(parse(from_os_str))]
    script: Option<PathBuf>,

    /// Log every cycle's processing, not just debug output.
    #[structopt(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Various sources for the telecommands incoming to the exec.
enum TcSource {
    Script(ScriptInterpreter),
    Console(mpsc::Receiver<Tc>),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("intake_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    let level = match opt.verbose {
        true => LevelFilter::Trace,
        false => LevelFilter::Debug,
    };
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Intake Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    debug!("CLI options: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let params: IntakeExecParams = util::params::load("intake_exec.toml")
        .wrap_err("Could not load exec params")?;
    params.validate().wrap_err("Invalid exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    let mut tc_source = match opt.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} TCs\n",
                si.get_duration(),
                si.get_num_tcs()
            );

            TcSource::Script(si)
        }
        None => {
            info!("No script provided, telecommands will be read from the console\n");
            TcSource::Console(spawn_console()?)
        }
    };

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    ds.intake_ctrl
        .init("intake_ctrl.toml")
        .wrap_err("Failed to initialise IntakeCtrl")?;
    info!("IntakeCtrl init complete");

    ds.archiver = Archiver::from_path(&session, "intake_ctrl.csv")
        .wrap_err("Failed to initialise the IntakeCtrl archive")?;

    let tm_file = File::create(session.session_root.join("tm.jsonl"))
        .wrap_err("Failed to create the telemetry file")?;
    let mut tm_sink = JsonTmSink::new(BufWriter::new(tm_file));

    let mut mech = sim::new_sim_intake(&params.sim);
    info!("Simulated intake initialised");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Beginning main loop\n");

    'main: loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        ds.cycle_start(params.cycle_period_s);

        // ---- TELECOMMAND PROCESSING ----

        match tc_source {
            TcSource::Script(ref mut si) => match si.get_pending_tcs(ds.time_s) {
                PendingTcs::None => (),
                PendingTcs::Some(tc_vec) => {
                    for tc in tc_vec.iter() {
                        tc_processor::exec(&mut ds, tc);
                    }
                }
                // Exit if end of script reached
                PendingTcs::EndOfScript => {
                    info!("End of TC script reached, stopping");
                    break 'main;
                }
            },
            TcSource::Console(ref rx) => loop {
                match rx.try_recv() {
                    Ok(tc) => tc_processor::exec(&mut ds, &tc),
                    Err(mpsc::TryRecvError::Empty) => break,
                    Err(mpsc::TryRecvError::Disconnected) => {
                        info!("Console closed, stopping");
                        break 'main;
                    }
                }
            },
        }

        // ---- CONTROL PROCESSING ----

        tm_sink.set_time(ds.time_s);
        ds.step(&mut mech, &mut tm_sink);

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.write() {
            warn!("Could not archive the intake status: {}", e);
        }

        if ds.is_1_hz_cycle {
            let rpt = &ds.intake_status_rpt;
            info!(
                "{} at {:.1} deg (target {:.1} deg), coral: {}, task: {}",
                rpt.homing_status,
                rpt.position_deg,
                rpt.target_deg,
                rpt.has_coral,
                ds.scheduler.active_name().unwrap_or("none")
            );
        }

        // ---- SIMULATION ----

        sim::step(&mut mech, &params.sim, params.cycle_period_s);

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;
        let cycle_period = Duration::from_secs_f64(params.cycle_period_s);

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        ds.cycle_end();
    }

    // ---- SHUTDOWN ----

    if ds.num_tm_failures > 0 {
        warn!("{} telemetry entries could not be published", ds.num_tm_failures);
    }

    info!("End of execution");

    Ok(())
}

/// Start reading telecommands from the console on a background thread.
///
/// The returned channel disconnects when the console is closed (Ctrl-C or
/// Ctrl-D).
#[cfg(feature = "console")]
fn spawn_console() -> Result<mpsc::Receiver<Tc>, Report> {
    use rustyline::{error::ReadlineError, DefaultEditor};

    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name(String::from("console"))
        .spawn(move || {
            let mut rl = match DefaultEditor::new() {
                Ok(rl) => rl,
                Err(e) => {
                    warn!("Could not start the console: {}", e);
                    return;
                }
            };

            loop {
                match rl.readline(PROMPT) {
                    Ok(line) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        rl.add_history_entry(line.as_str()).ok();

                        match Tc::from_line(&line) {
                            Ok(tc) => {
                                if tx.send(tc).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("{}", e),
                        }
                    }
                    Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                    Err(e) => {
                        warn!("Console error: {}", e);
                        break;
                    }
                }
            }
        })
        .wrap_err("Failed to spawn the console thread")?;

    Ok(rx)
}

/// Without the console only scripts can be run.
#[cfg(not(feature = "console"))]
fn spawn_console() -> Result<mpsc::Receiver<Tc>, Report> {
    Err(color_eyre::eyre::eyre!(
        "No script provided and the console is not available, rebuild with the \"console\" feature"
    ))
}
