//! # Hardware parameters
//!
//! Mapping of the mechanisms' devices onto the physical hardware.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the hardware backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HwParams {
    /// 7-bit I2C address of the PCA9685 board
    pub pca9685_address: u8,

    /// Prescale value of the PCA9685 oscillator. 121 gives the 50 Hz used by motor controllers.
    pub pca9685_prescale: u8,

    pub pulse: PwmPulseParams,
}

/// Shape of the PWM pulse expected by the motor controllers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PwmPulseParams {
    /// Pulse width commanding full reverse
    pub min_pulse_ms: f64,

    /// Pulse width commanding full forward
    pub max_pulse_ms: f64,

    pub period_ms: f64,
}

/// A motor controller on a PWM channel.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MotorMap {
    pub channel: u8,

    #[serde(default)]
    pub inverted: bool,
}

/// A digital input on a GPIO pin (BCM numbering).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct InputMap {
    pub pin: u8,

    /// Invert the level read from the pin
    #[serde(default)]
    pub inverted: bool,
}

/// A double solenoid valve on two GPIO pins.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActuatorMap {
    pub forward_pin: u8,
    pub reverse_pin: u8,
}

/// A quadrature encoder on two GPIO pins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EncoderMap {
    pub pin_a: u8,
    pub pin_b: u8,

    /// Position units per encoder count
    #[serde(default = "default_units_per_count")]
    pub units_per_count: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for HwParams {
    fn default() -> Self {
        Self {
            pca9685_address: 0x40,
            pca9685_prescale: 121,
            pulse: PwmPulseParams::default(),
        }
    }
}

impl Default for PwmPulseParams {
    fn default() -> Self {
        Self {
            min_pulse_ms: 1.0,
            max_pulse_ms: 2.0,
            period_ms: 20.0,
        }
    }
}

impl Default for EncoderMap {
    fn default() -> Self {
        Self {
            pin_a: 0,
            pin_b: 0,
            units_per_count: default_units_per_count(),
        }
    }
}

fn default_units_per_count() -> f64 {
    1.0
}
