//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications 
//! interface. Telecommands arrive either as JSON (from scripts) or as
//! whitespace separated words (from the console).

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod intake;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Serialize, Deserialize};
use structopt::StructOpt;
use thiserror::Error;

// Internal
use intake::IntakeCmd;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the intake executable by an
/// operator or a script.
///
/// The JSON representation is `{"type": "<TYPE>", "payload": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, StructOpt)]
#[serde(tag = "type", content = "payload")]
pub enum Tc {
    /// Command the intake mechanism.
    #[serde(rename = "INTAKE")]
    #[structopt(name = "intake")]
    Intake(IntakeCmd),

    /// Cancel the currently running intake task. The mechanism holds its last
    /// demands.
    #[serde(rename = "CANCEL")]
    #[structopt(name = "cancel")]
    Cancel,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC is not a valid command: {0}")]
    InvalidCommand(String),

    #[error("TC is empty")]
    Empty,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {

    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)
    }

    /// Parse a new TC from a line of console input, for example
    /// `intake move-to -32`.
    pub fn from_line(line: &str) -> Result<Self, TcParseError> {
        let words: Vec<&str> = line.split_whitespace().collect();

        if words.is_empty() {
            return Err(TcParseError::Empty)
        }

        // StructOpt expects the binary name as the first argument
        Tc::from_iter_safe(std::iter::once("tc").chain(words))
            .map_err(|e| TcParseError::InvalidCommand(e.message))
    }
}
