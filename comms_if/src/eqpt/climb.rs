//! # Climb Equipment Interface
//!
//! The climber has two independent arms. All per-arm data is stored in `[T; 2]` arrays indexed
//! by [`Side::index`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{MechId, MotorDem};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ArmSens {
    /// Limit switch at the top of the arm's travel
    pub limit: bool,

    pub motor_out: f64,

    pub clutch_engaged: bool,
}

/// Sensor data read from both climb arms each cycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimbSens {
    pub arms: [ArmSens; 2],
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ArmDems {
    pub motor: MotorDem,
    pub clutch_engaged: bool,
}

/// Demands applied to both climb arms.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimbDems {
    pub arms: [ArmDems; 2],
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Raise,
    Lower,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Side {
    pub const ALL: [Side; 2] = [Side::Left, Side::Right];

    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    /// The schedulable resource which owns this side's arm.
    pub fn mech_id(self) -> MechId {
        match self {
            Side::Left => MechId::ClimbLeft,
            Side::Right => MechId::ClimbRight,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl Direction {
    /// Sign of the motor output which moves the arm in this direction.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Raise => 1.0,
            Direction::Lower => -1.0,
        }
    }
}

impl ClimbSens {
    pub fn arm(&self, side: Side) -> &ArmSens {
        &self.arms[side.index()]
    }
}

impl ClimbDems {
    pub fn arm(&self, side: Side) -> &ArmDems {
        &self.arms[side.index()]
    }

    pub fn arm_mut(&mut self, side: Side) -> &mut ArmDems {
        &mut self.arms[side.index()]
    }
}
