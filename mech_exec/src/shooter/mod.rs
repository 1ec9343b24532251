//! # Shooter module
//!
//! The shooter launches notes with a flywheel fed by a guide wheel, from one of two elevations
//! set by a double solenoid. A beam-break sensor detects a loaded note.
//!
//! The shooter raises LED notifications for the driver: an orange blink when a note arrives, a
//! solid white while raised and a green chase while shooting. Each is cleared by restoring the
//! persistent pattern.

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

/// Possible errors that can occur during Shooter operation.
#[derive(Debug, thiserror::Error)]
pub enum ShooterError {
    #[error("Invalid shooter parameters: {0}")]
    InvalidParams(String),
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Whether a note is loaded given the raw beam-break level. The sensor is active-low.
pub fn note_loaded_from_raw(note_beam_raw: bool) -> bool {
    !note_beam_raw
}
