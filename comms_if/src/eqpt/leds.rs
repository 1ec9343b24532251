//! # LED Notification Interface
//!
//! Mechanisms raise notifications to the driver through the robot's LED strip. A notification is
//! either a temporary pattern, shown until restored, or a request to restore the persistent
//! (baseline) pattern.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Off,
    White,
    Red,
    Orange,
    Green,
    Blue,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum LedPattern {
    Solid(Color),

    Blink {
        color: Color,
        interval_s: f64,
    },

    Chase {
        color: Color,
        interval_s: f64,
        reversed: bool,
    },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum LedCmd {
    /// Show a pattern until the persistent pattern is restored
    Temporary(LedPattern),

    /// Return to the baseline pattern
    RestorePersistent,
}

impl Default for LedPattern {
    fn default() -> Self {
        LedPattern::Solid(Color::Off)
    }
}
