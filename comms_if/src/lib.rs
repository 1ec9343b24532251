//! # Communications interface crate.
//!
//! Provides all common interface data for the mechanisms software: the sensor snapshots and
//! demands exchanged with the hardware bindings, and the telecommands which drive the
//! mechanisms.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod tc;

/// Sensor and demand definitions for equipment (like mechanisms)
pub mod eqpt;
