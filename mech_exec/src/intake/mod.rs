//! # Intake module
//!
//! The intake pivots between a stowed and a deployed position and runs a set of rollers to pick
//! up and eject notes.
//!
//! The pivot is driven by two mirrored motors. A single PID loop tracks the right motor's
//! position and its output is applied positively to the right motor and negatively to the left.
//! The stowed setpoint is captured from the right encoder on the first control cycle, the
//! deployed setpoint sits `deployed_offset` below it. The operator toggles between the two with a
//! held button which is debounced before its rising edge flips the setpoint.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod io;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use io::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during Intake operation.
#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("Invalid intake parameters: {0}")]
    InvalidParams(String),
}
