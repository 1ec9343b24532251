//! # Intake Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::MotorDem;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sensor data read from the intake each cycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct IntakeSens {
    /// Upper limit switch of the intake pivot
    pub top_limit: bool,

    /// Lower limit switch of the intake pivot
    pub bottom_limit: bool,

    /// Position of the left angle motor in encoder units
    pub angle_left_pos: f64,

    /// Position of the right angle motor in encoder units
    pub angle_right_pos: f64,

    /// Output currently applied to the left angle motor
    pub angle_left_out: f64,

    /// Output currently applied to the right angle motor
    pub angle_right_out: f64,

    /// Output currently applied to the roller motor
    pub rollers_out: f64,
}

/// Demands applied to the intake motors.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct IntakeDems {
    pub rollers: MotorDem,
    pub angle_left: MotorDem,
    pub angle_right: MotorDem,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The two setpoints of the intake pivot.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeAngle {
    /// Stowed inside the frame, at the position captured on startup
    In,

    /// Deployed to the floor
    Out,
}
