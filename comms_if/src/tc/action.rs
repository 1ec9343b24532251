//! # Atomic mechanism actions
//!
//! An [`Action`] is the smallest unit of mechanism control. Actions are instantaneous: they set,
//! start or stop something and complete in the cycle they are applied. A [`Condition`] is a
//! predicate over the mechanisms' state which a sequence can wait on.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::eqpt::{
    climb::{Direction, Side},
    intake::IntakeAngle,
    shooter::Elevation,
    MechId,
};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Intake(IntakeAction),
    Shooter(ShooterAction),
    Climb(ClimbAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IntakeAction {
    /// Run the rollers open loop at the given speed
    RunRollers(f64),

    /// Run the rollers at the eject speed
    Eject,

    StopRollers,

    /// Stop the rollers and both angle motors
    StopMotors,

    SetAngle(IntakeAngle),

    ToggleAngle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShooterAction {
    /// Run the flywheel at the given speed, with the guide following at its ratio
    Run(f64),

    RunGuide(f64),

    /// Full speed, with the shooting notification
    StartShooting,

    Stop,

    SetElevation(Elevation),

    ToggleElevation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ClimbAction {
    MoveArm {
        side: Side,
        direction: Direction,
        speed: f64,
    },

    StopArm(Side),

    SetClutch {
        side: Side,
        engaged: bool,
    },

    /// Enable or disable the operator's default arm drive
    ToggleControls,
}

/// Predicates which a sequence can wait on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    NoteLoaded,
    ArmAtLimit(Side),

    /// Both arms at their limit
    ArmsAtLimit,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Action {
    /// The mechanisms this action drives.
    pub fn mech_ids(&self) -> Vec<MechId> {
        match self {
            Action::Intake(_) => vec![MechId::Intake],
            Action::Shooter(_) => vec![MechId::Shooter],
            Action::Climb(a) => match a {
                ClimbAction::MoveArm { side, .. }
                | ClimbAction::StopArm(side)
                | ClimbAction::SetClutch { side, .. } => vec![side.mech_id()],
                // Toggling the controls changes a flag only, it doesn't drive either arm
                ClimbAction::ToggleControls => vec![],
            },
        }
    }
}
