//! # Operator input
//!
//! The latest state of the operator's controller, as far as the mechanisms are concerned. Button
//! mapping happens outside of the mechanisms software, so only already-mapped signals arrive
//! here.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::eqpt::climb::Side;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorInput {
    /// Held state of the intake toggle button
    pub intake_toggle: bool,

    pub climb_left: ArmDriveInput,

    pub climb_right: ArmDriveInput,
}

/// Signals driving one climb arm.
///
/// Enables are held buttons, magnitudes are trigger axes normalised to [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmDriveInput {
    pub raise_enable: bool,
    pub raise_magnitude: f64,
    pub lower_enable: bool,
    pub lower_magnitude: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OperatorInput {
    pub fn arm(&self, side: Side) -> &ArmDriveInput {
        match side {
            Side::Left => &self.climb_left,
            Side::Right => &self.climb_right,
        }
    }
}

impl ArmDriveInput {
    /// Signed drive for the arm, positive raising.
    pub fn drive(&self) -> f64 {
        let raise = if self.raise_enable { self.raise_magnitude } else { 0.0 };
        let lower = if self.lower_enable { self.lower_magnitude } else { 0.0 };

        raise - lower
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_drive() {
        let mut i = ArmDriveInput {
            raise_enable: true,
            raise_magnitude: 0.8,
            lower_enable: false,
            lower_magnitude: 0.5,
        };
        assert_eq!(i.drive(), 0.8);

        i.lower_enable = true;
        assert!((i.drive() - 0.3).abs() < 1e-12);

        i.raise_enable = false;
        assert_eq!(i.drive(), -0.5);

        assert_eq!(ArmDriveInput::default().drive(), 0.0);
    }
}
