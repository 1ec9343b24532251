//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged between the mechanism
//! controllers and their hardware bindings.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod climb;
pub mod intake;
pub mod leds;
pub mod shooter;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Demand for a single motor.
///
/// `Stop` is a one-shot request: the binding halts the motor and then replaces the demand with
/// `Speed(0.0)`, so the stop is not re-issued on the next cycle unless it is requested again.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum MotorDem {
    /// Normalised open-loop output in [-1, 1]
    Speed(f64),

    /// Halt the motor
    Stop,
}

/// Identifiers of the mechanisms which can be exclusively owned by a running operation.
#[derive(Serialize, Deserialize, Debug, Hash, Eq, PartialEq, Copy, Clone)]
pub enum MechId {
    Intake,
    Shooter,
    ClimbLeft,
    ClimbRight,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for MotorDem {
    fn default() -> Self {
        MotorDem::Speed(0.0)
    }
}

impl MotorDem {
    /// The output this demand will drive the motor at.
    pub fn speed(&self) -> f64 {
        match self {
            MotorDem::Speed(s) => *s,
            MotorDem::Stop => 0.0,
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, MotorDem::Stop)
    }
}

impl MechId {
    pub const ALL: [MechId; 4] = [
        MechId::Intake,
        MechId::Shooter,
        MechId::ClimbLeft,
        MechId::ClimbRight,
    ];

    /// Index of this mechanism, used for bitsets and lookup tables.
    pub fn index(&self) -> usize {
        match self {
            MechId::Intake => 0,
            MechId::Shooter => 1,
            MechId::ClimbLeft => 2,
            MechId::ClimbRight => 3,
        }
    }
}
