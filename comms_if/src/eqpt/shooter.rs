//! # Shooter Equipment Interface

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::MotorDem;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sensor data read from the shooter each cycle.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ShooterSens {
    /// Raw level of the beam-break note sensor. The sensor is active-low, so `false` means a
    /// note is interrupting the beam.
    pub note_beam_raw: bool,

    pub flywheel_out: f64,

    pub guide_out: f64,

    /// Position reported by the elevation actuator
    pub elevation: Elevation,
}

/// Demands applied to the shooter.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
pub struct ShooterDems {
    pub flywheel: MotorDem,
    pub guide: MotorDem,
    pub elevation: Elevation,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Position of the 2-state shooter elevation actuator.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elevation {
    Down,
    Up,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ShooterSens {
    fn default() -> Self {
        Self {
            note_beam_raw: true,
            flywheel_out: 0.0,
            guide_out: 0.0,
            elevation: Elevation::Down,
        }
    }
}

impl Default for Elevation {
    fn default() -> Self {
        Elevation::Down
    }
}

impl Elevation {
    /// The other stable position.
    pub fn toggled(self) -> Self {
        match self {
            Elevation::Down => Elevation::Up,
            Elevation::Up => Elevation::Down,
        }
    }

    /// Actuator level for this position, `true` being up.
    pub fn as_bool(self) -> bool {
        self == Elevation::Up
    }

    pub fn from_bool(up: bool) -> Self {
        if up {
            Elevation::Up
        } else {
            Elevation::Down
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_toggle_is_two_cycle() {
        for start in [Elevation::Down, Elevation::Up].iter().copied() {
            let mut e = start;
            for n in 1..=6 {
                e = e.toggled();
                if n % 2 == 0 {
                    assert_eq!(e, start);
                } else {
                    assert_ne!(e, start);
                }
            }
        }
    }
}
