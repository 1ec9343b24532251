//! # Mechanisms library.
//!
//! Control software for the end-effector mechanisms of the robot: the intake, the shooter and
//! the climber. The executable `mech_exec` is built on this library, which also allows other
//! crates in the workspace to drive the mechanisms.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Choreography - timed, sensor gated sequences of mechanism actions and the registry of named
/// operations
pub mod choreo;

/// Climb module - two independent arms with clutches and limit switches
pub mod climb;

/// Control primitives - debounce, edge detection and PID
pub mod ctrl;

/// Data store for the executable
pub mod data_store;

/// Hardware devices and backends
pub mod hw;

/// Intake module - the pivoting intake holding its angle with a PID loop
pub mod intake;

/// Hardware IO bindings of the mechanisms
pub mod io;

pub mod leds;

/// Set of all mechanisms, the context scheduled tasks act on
pub mod mechs;

/// Parameters for the mechanisms executable
pub mod params;

/// Cooperative task scheduler
pub mod sched;

/// Shooter module - flywheel, guide wheel, elevation and note detection
pub mod shooter;

/// Telemetry sinks
pub mod tm;
