//! # Control primitives
//!
//! Small, reusable filters and controllers used by the mechanism controllers. None of these read
//! a clock themselves, the current time is always passed in so that they can be driven by a
//! controllable clock in tests.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod debounce;
pub mod edge;
pub mod pid;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use debounce::Debouncer;
pub use edge::{Edge, EdgeDetector};
pub use pid::{PidController, PidGains};
