//! Module interfaces
//!
//! Cyclic control modules (for example `IntakeCtrl`) implement [`State`] so
//! the executable can initialise them from a parameter file and then drive
//! them once per cycle.

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A cyclic control module.
pub trait State {
    /// Passed to `init`, usually the parameter file name.
    type InitData;
    type InitError;

    /// Sensor data for one cycle.
    type InputData;
    /// Demands produced by one cycle.
    type OutputData;
    /// Summary of one cycle, for telemetry and archiving.
    type StatusReport;
    /// Modules which cannot fail during processing use
    /// `std::convert::Infallible`.
    type ProcError;

    /// Load parameters and reset the module to its power up state.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError>;

    /// Process one cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
