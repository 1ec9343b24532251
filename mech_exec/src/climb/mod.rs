//! # Climb module
//!
//! The climber has two independent arms, each with a motor, a clutch which locks the arm in
//! place and a limit switch at the top of its travel. Every operation names the side it acts on
//! and never touches the other arm.
//!
//! While nothing else owns an arm it follows the operator's triggers, see
//! [`Climb::drive_default`].

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

/// Possible errors that can occur during Climb operation.
#[derive(Debug, thiserror::Error)]
pub enum ClimbError {
    #[error("Invalid climb parameters: {0}")]
    InvalidParams(String),
}
