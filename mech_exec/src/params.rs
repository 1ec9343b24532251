//! # Mechanisms Executable Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::leds::{Color, LedPattern};
use serde::{Deserialize, Serialize};

use crate::{
    choreo::ChoreoParams,
    climb::ClimbHwMap,
    hw::HwParams,
    intake::IntakeHwMap,
    shooter::ShooterHwMap,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MechExecParams {
    /// Target period of one cycle
    pub cycle_period_s: f64,

    /// Pattern shown on the LEDs when no notification is active
    pub persistent_leds: LedPattern,

    /// Starting position of the simulated intake pivot
    pub sim_intake_start_pos: f64,

    pub hw: HwParams,

    pub intake_hw: IntakeHwMap,
    pub shooter_hw: ShooterHwMap,
    pub climb_hw: ClimbHwMap,

    pub choreo: ChoreoParams,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for MechExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.02,
            persistent_leds: LedPattern::Solid(Color::Blue),
            sim_intake_start_pos: 0.0,
            hw: HwParams::default(),
            intake_hw: IntakeHwMap::default(),
            shooter_hw: ShooterHwMap::default(),
            climb_hw: ClimbHwMap::default(),
            choreo: ChoreoParams::default(),
        }
    }
}

impl MechExecParams {
    pub fn cycle_frequency_hz(&self) -> f64 {
        1.0 / self.cycle_period_s
    }
}
