//! Parameters structure for the Climb

use serde::{Deserialize, Serialize};

/// Parameters for the Climb.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Scale applied to the operator's trigger drive
    pub drive_scale: f64,

    /// Whether the operator's drive is enabled on startup
    pub controls_enabled: bool,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            drive_scale: 1.0,
            controls_enabled: true,
        }
    }
}
