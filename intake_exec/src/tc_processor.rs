//! # Telecommand processor module
//!
//! The telecommand processor handles TCs coming from any source.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;

// Internal
use comms_if::tc::Tc;
use intake_lib::{data_store::DataStore, task};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Intake commands replace the active task with the matching one.
pub(crate) fn exec(ds: &mut DataStore, tc: &Tc) {
    match tc {
        Tc::Intake(cmd) => {
            debug!("Received intake command {:?}", cmd);
            ds.scheduler.schedule(task::from_cmd(*cmd));
        }
        Tc::Cancel => {
            debug!("Received cancel command");
            ds.scheduler.cancel();
        }
    }
}
