//! # Telemetry
//!
//! Intake telemetry is published as individual key/value entries to a [`TmSink`]. Publishing is
//! best effort: failures are logged and never interrupt the control cycle.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{collections::BTreeMap, io::Write};

use log::{trace, warn};
use serde::{Deserialize, Serialize};

use crate::intake_ctrl::StatusReport;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

pub const KEY_POSITION: &str = "Intake/Position";
pub const KEY_HOMING_STATE: &str = "Intake/HomingState";
pub const KEY_GOAL_DEG: &str = "Intake/Goal_Deg";
pub const KEY_HAS_CORAL: &str = "Intake/HasCoral";
pub const KEY_ROLLERS_RUNNING: &str = "Intake/RollersRunning";
pub const KEY_ACTIVE_TASK: &str = "Intake/ActiveTask";

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Somewhere telemetry can be published to.
pub trait TmSink {
    fn publish(&mut self, key: &str, value: TmValue) -> Result<(), TmError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sink which keeps the latest value of each key.
#[derive(Debug, Default)]
pub struct TmTable {
    entries: BTreeMap<String, TmValue>,
}

/// Sink which writes each entry as a line of JSON.
pub struct JsonTmSink<W: Write> {
    writer: W,

    /// Time stamped onto each entry.
    time_s: f64,
}

/// A single line written by [`JsonTmSink`].
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TmEntry {
    pub time_s: f64,
    pub key: String,
    pub value: TmValue,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TmValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

#[derive(Debug, thiserror::Error)]
pub enum TmError {
    #[error("Could not serialize the telemetry: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not write the telemetry: {0}")]
    WriteError(std::io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TmTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&TmValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TmSink for TmTable {
    fn publish(&mut self, key: &str, value: TmValue) -> Result<(), TmError> {
        trace!("TM {} = {:?}", key, value);
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

impl<W: Write> JsonTmSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, time_s: 0.0 }
    }

    /// Set the time stamped onto subsequent entries.
    pub fn set_time(&mut self, time_s: f64) {
        self.time_s = time_s;
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TmSink for JsonTmSink<W> {
    fn publish(&mut self, key: &str, value: TmValue) -> Result<(), TmError> {
        let entry = TmEntry {
            time_s: self.time_s,
            key: key.to_string(),
            value,
        };

        let line = serde_json::to_string(&entry).map_err(TmError::SerializationError)?;

        writeln!(self.writer, "{}", line).map_err(TmError::WriteError)
    }
}

impl From<f64> for TmValue {
    fn from(v: f64) -> Self {
        TmValue::Number(v)
    }
}

impl From<bool> for TmValue {
    fn from(v: bool) -> Self {
        TmValue::Bool(v)
    }
}

impl From<String> for TmValue {
    fn from(v: String) -> Self {
        TmValue::Text(v)
    }
}

impl From<&str> for TmValue {
    fn from(v: &str) -> Self {
        TmValue::Text(v.to_string())
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Publish the intake telemetry for this cycle.
///
/// Each entry is published independently, a failure is logged and the
/// remaining entries are still attempted. Returns the number of failures.
pub fn publish_intake<S: TmSink>(
    sink: &mut S,
    report: &StatusReport,
    active_task: Option<&str>,
) -> usize {
    let entries: [(&str, TmValue); 6] = [
        (KEY_POSITION, report.position_deg.into()),
        (KEY_HOMING_STATE, report.homing_status.to_string().into()),
        (KEY_GOAL_DEG, report.target_deg.into()),
        (KEY_HAS_CORAL, report.has_coral.into()),
        (KEY_ROLLERS_RUNNING, report.rollers_running.into()),
        (KEY_ACTIVE_TASK, active_task.unwrap_or("none").into()),
    ];

    let mut num_failed = 0;

    for (key, value) in entries.iter() {
        if let Err(e) = sink.publish(key, value.clone()) {
            warn!("Could not publish {}: {}", key, e);
            num_failed += 1;
        }
    }

    num_failed
}
