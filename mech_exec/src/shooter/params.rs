//! Parameters structure for the Shooter

use serde::{Deserialize, Serialize};

/// Parameters for the Shooter.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Guide wheel output per unit of flywheel output.
    ///
    /// The guide demand is not clamped, at full flywheel output it exceeds the motor's range and
    /// saturates in the motor controller.
    pub guide_speed_ratio: f64,

    /// Flywheel output used by `start_shooting`
    pub shoot_speed: f64,

    /// Blink interval of the note detected notification
    pub note_blink_interval_s: f64,

    /// Chase interval of the shooting notification
    pub shoot_chase_interval_s: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            guide_speed_ratio: 3.0,
            shoot_speed: 1.0,
            note_blink_interval_s: 0.2,
            shoot_chase_interval_s: 0.25,
        }
    }
}
