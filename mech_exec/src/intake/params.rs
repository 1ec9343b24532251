//! Parameters structure for the Intake

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::ctrl::PidGains;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the Intake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {

    /// Distance of the deployed setpoint below the stowed one.
    ///
    /// Units: encoder units, must be positive
    pub deployed_offset: f64,

    /// Gains of the angle hold loop
    pub angle_pid: PidGains,

    /// Magnitude limit on the angle loop's output
    pub angle_output_limit: f64,

    /// Time the toggle button must be held stable before it is accepted.
    ///
    /// Units: seconds
    pub toggle_hold_s: f64,

    /// Roller speed used to eject a note
    pub eject_speed: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            deployed_offset: 50.0,
            angle_pid: PidGains {
                k_p: 0.05,
                k_i: 0.0,
                k_d: 0.0,
            },
            angle_output_limit: 1.0,
            toggle_hold_s: 0.1,
            eject_speed: -0.7,
        }
    }
}

impl Params {
    /// Check the parameters are usable, returning a description of the first problem.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.deployed_offset > 0.0) {
            return Err(format!(
                "deployed_offset must be positive, got {}", self.deployed_offset
            ));
        }
        if !(self.toggle_hold_s >= 0.0) {
            return Err(format!(
                "toggle_hold_s must not be negative, got {}", self.toggle_hold_s
            ));
        }
        if !(self.angle_output_limit > 0.0) {
            return Err(format!(
                "angle_output_limit must be positive, got {}", self.angle_output_limit
            ));
        }

        Ok(())
    }
}
