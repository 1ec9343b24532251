//! # Choreography
//!
//! Composes the atomic mechanism [`Action`]s into timed, sensor-gated sequences which span
//! several mechanisms. A [`Sequence`] is a stateless template. Each invocation makes a fresh
//! [`SeqTask`] which the scheduler runs like any other task, so a sequence is interrupted by
//! anything which needs one of the mechanisms it drives.
//!
//! Named sequences are kept in a [`Registry`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod registry;
mod sequence;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

pub use registry::*;
pub use sequence::*;

use comms_if::tc::action::{Action, Condition};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something sequences can act on.
pub trait ActionSink {
    /// Apply an action. Actions complete immediately.
    fn apply(&mut self, action: &Action);

    /// Evaluate a condition against the current sensor state.
    fn check(&self, cond: &Condition) -> bool;
}
