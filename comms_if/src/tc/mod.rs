//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications interface. Telecommands
//! are instructions sent to the mechanisms by the operator (or an autonomy routine), encoded as
//! JSON objects with a `type` and an optional `payload`:
//!
//! ```text
//! {"type": "MAKE_SAFE"}
//! {"type": "NAMED_OP", "payload": "Score_In_Speaker"}
//! {"type": "ACTION", "payload": {"Shooter": {"Run": 0.5}}}
//! {"type": "OPERATOR", "payload": {"intake_toggle": true}}
//! ```

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod action;
pub mod operator;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use serde::{Serialize, Deserialize};
use thiserror::Error;

// Internal
pub use action::{Action, ClimbAction, Condition, IntakeAction, ShooterAction};
pub use operator::{ArmDriveInput, OperatorInput};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand.
///
/// The type is used to identify the purpose of the telecommand, and is used by the telecommand
/// processor to determine where to send the command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tc {
    Heartbeat,

    /// Cancel all running operations, stop all motors and reject further operations
    MakeSafe,

    /// Allow operations to run again
    MakeUnsafe,

    /// Invoke an operation from the named registry
    NamedOp(String),

    /// Schedule a single atomic action
    Action(Action),

    /// Update the latest operator input
    Operator(OperatorInput),

    /// Cancel all running operations without entering safe mode
    CancelAll,
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {

    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        let tc = serde_json::from_str(json_str)
            .map_err(TcParseError::InvalidJson)?;

        trace!("Parsed TC: {:?}", tc);

        Ok(tc)
    }

    /// Encode the TC as a JSON packet
    pub fn to_json(&self) -> Result<String, TcParseError> {
        serde_json::to_string(self).map_err(TcParseError::InvalidJson)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::eqpt::climb::{Direction, Side};

    #[test]
    fn test_from_json() {
        assert_eq!(Tc::from_json(r#"{"type": "MAKE_SAFE"}"#).unwrap(), Tc::MakeSafe);
        assert_eq!(Tc::from_json(r#"{"type": "CANCEL_ALL"}"#).unwrap(), Tc::CancelAll);

        assert_eq!(
            Tc::from_json(r#"{"type": "NAMED_OP", "payload": "Load_Note_For_Amp"}"#).unwrap(),
            Tc::NamedOp(String::from("Load_Note_For_Amp"))
        );

        assert_eq!(
            Tc::from_json(r#"{"type": "ACTION", "payload": {"Intake": "Eject"}}"#).unwrap(),
            Tc::Action(Action::Intake(IntakeAction::Eject))
        );

        assert_eq!(
            Tc::from_json(
                r#"{"type": "ACTION", "payload": {"Climb": {"MoveArm": {
                    "side": "Left", "direction": "Raise", "speed": 0.4
                }}}}"#
            ).unwrap(),
            Tc::Action(Action::Climb(ClimbAction::MoveArm {
                side: Side::Left,
                direction: Direction::Raise,
                speed: 0.4
            }))
        );

        // Missing operator fields take their defaults
        match Tc::from_json(r#"{"type": "OPERATOR", "payload": {"intake_toggle": true}}"#) {
            Ok(Tc::Operator(op)) => {
                assert!(op.intake_toggle);
                assert_eq!(op.climb_left, ArmDriveInput::default());
            },
            other => panic!("Expected an operator TC, got {:?}", other)
        }
    }

    #[test]
    fn test_invalid_json() {
        assert!(Tc::from_json("not json").is_err());
        assert!(Tc::from_json(r#"{"type": "SELF_DESTRUCT"}"#).is_err());
        assert!(Tc::from_json(r#"{"type": "NAMED_OP"}"#).is_err());
    }

    #[test]
    fn test_json_is_stable() {
        let tc = Tc::Action(Action::Shooter(ShooterAction::Run(0.5)));
        let json = tc.to_json().unwrap();
        assert_eq!(json, r#"{"type":"ACTION","payload":{"Shooter":{"Run":0.5}}}"#);
    }
}
