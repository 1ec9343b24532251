//! # Hardware Module
//!
//! This module provides the device primitives the physical mechanism bindings are built from:
//!
//! - [`Motor`] - an open-loop motor controller taking a normalised output,
//! - [`DigitalIn`] - a digital input such as a limit switch or beam-break,
//! - [`PositionEncoder`] - a position feedback sensor,
//! - [`Actuator2`] - a 2-state actuator such as a double solenoid valve.
//!
//! Devices are created by a [`HwBackend`]. On the Raspberry Pi the backend drives motor
//! controllers through a PCA9685 PWM board and reads/writes GPIO pins with `rppal`. On any other
//! target no backend is available and the physical bindings stay inert.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// [`ServoDriver`] implementation for the Adafruit PCA9685 16 channel PWM driver board.
pub mod pca9685;

pub mod params;

/// Raspberry Pi backend
#[cfg(all(target_arch = "arm", target_os = "linux"))]
pub mod rpi;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};
use embedded_hal::digital::v2::{InputPin, OutputPin};
use log::warn;
use util::maths::{clamp, lin_map};

pub use params::*;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait to provide a unified API for accessing PWM driver boards.
pub trait ServoDriver {

    /// The type that the underlying driver uses for channel identification
    type Channel: Copy;

    /// Set the duty cycle of a channel.
    ///
    /// ## Arguments
    /// - `channel` - The channel to set the duty cycle for
    /// - `duty_cycle` - The duty cycle to set. Must be a value between 0.0 and 1.0. Values outside
    ///   this range will be rejected.
    fn set_duty_cycle(&mut self, channel: Self::Channel, duty_cycle: f64) -> Result<(), HwError>;
}

/// An open-loop motor controller.
pub trait Motor {
    /// Drive the motor at a normalised output in [-1, 1]. Values outside the range saturate.
    fn set(&mut self, output: f64) -> Result<(), HwError>;

    /// Halt the motor.
    fn stop(&mut self) -> Result<(), HwError>;

    /// The output last applied to the motor.
    fn get(&self) -> f64;
}

pub trait DigitalIn {
    fn is_high(&mut self) -> Result<bool, HwError>;
}

pub trait PositionEncoder {
    /// Current position in the encoder's configured units.
    fn position(&mut self) -> Result<f64, HwError>;
}

/// An actuator with exactly two stable positions.
pub trait Actuator2 {
    /// Command the actuator, `true` being the forward position.
    fn set(&mut self, forward: bool) -> Result<(), HwError>;

    /// The last commanded position.
    fn get(&self) -> bool;
}

/// Factory for physical devices.
pub trait HwBackend {
    fn motor(&mut self, map: &MotorMap) -> Result<Box<dyn Motor>, HwError>;

    fn input(&mut self, map: &InputMap) -> Result<Box<dyn DigitalIn>, HwError>;

    fn actuator(&mut self, map: &ActuatorMap) -> Result<Box<dyn Actuator2>, HwError>;

    fn encoder(&mut self, map: &EncoderMap) -> Result<Box<dyn PositionEncoder>, HwError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A motor controller driven by a PWM pulse from a [`ServoDriver`] board.
pub struct PwmMotor<D: ServoDriver> {
    driver: Rc<RefCell<D>>,
    channel: D::Channel,
    inverted: bool,
    pulse: PwmPulseParams,
    output: f64,
}

/// A digital input backed by an `embedded-hal` input pin.
pub struct HalInput<P: InputPin> {
    pin: P,
    inverted: bool,
}

/// A double solenoid valve driven by two output pins.
pub struct PinSolenoid<P: OutputPin> {
    forward: P,
    reverse: P,
    state: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum HwError {
    #[error("An I2C error occured")]
    I2c,

    #[error("Duty cycle must be between 0.0 and 1.0")]
    InvalidDutyCycle,

    #[error("Pin error: {0}")]
    Pin(String),

    #[error("Hardware is unavailable: {0}")]
    Unavailable(String),
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Open the hardware backend for this target.
#[cfg(all(target_arch = "arm", target_os = "linux"))]
pub fn open_backend(params: &HwParams) -> Result<Box<dyn HwBackend>, HwError> {
    Ok(Box::new(rpi::RpiBackend::new(params)?))
}

/// Open the hardware backend for this target.
#[cfg(not(all(target_arch = "arm", target_os = "linux")))]
pub fn open_backend(_params: &HwParams) -> Result<Box<dyn HwBackend>, HwError> {
    Err(HwError::Unavailable(format!(
        "no hardware backend for target {}",
        util::host::get_target()
    )))
}

/// Create a device from an optional backend, warning and returning `None` if it can't be made.
///
/// Used by the physical bindings so that a missing device leaves the mechanism inert rather than
/// failing initialisation.
pub fn open_device<T, F>(
    backend: &mut Option<&mut dyn HwBackend>,
    name: &str,
    make: F
) -> Option<T>
where
    F: FnOnce(&mut dyn HwBackend) -> Result<T, HwError>
{
    match backend {
        Some(b) => match make(&mut **b) {
            Ok(d) => Some(d),
            Err(e) => {
                warn!("Could not open {}, it will be inert: {}", name, e);
                None
            }
        },
        None => {
            warn!("No hardware backend, {} will be inert", name);
            None
        }
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<D: ServoDriver> PwmMotor<D> {
    pub fn new(
        driver: Rc<RefCell<D>>,
        channel: D::Channel,
        inverted: bool,
        pulse: PwmPulseParams
    ) -> Self {
        Self {
            driver,
            channel,
            inverted,
            pulse,
            output: 0.0,
        }
    }

    /// Duty cycle of the pulse which commands the given output.
    fn duty_cycle(&self, output: f64) -> f64 {
        let pulse_ms = lin_map(
            (-1.0, 1.0),
            (self.pulse.min_pulse_ms, self.pulse.max_pulse_ms),
            output
        );

        pulse_ms / self.pulse.period_ms
    }
}

impl<D: ServoDriver> Motor for PwmMotor<D> {
    fn set(&mut self, output: f64) -> Result<(), HwError> {
        let output = clamp(&output, &-1.0, &1.0);
        let signed = if self.inverted { -output } else { output };

        let duty = self.duty_cycle(signed);
        self.driver
            .borrow_mut()
            .set_duty_cycle(self.channel, duty)?;

        self.output = output;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), HwError> {
        self.set(0.0)
    }

    fn get(&self) -> f64 {
        self.output
    }
}

impl<P: InputPin> HalInput<P> {
    pub fn new(pin: P, inverted: bool) -> Self {
        Self { pin, inverted }
    }
}

impl<P> DigitalIn for HalInput<P>
where
    P: InputPin,
    P::Error: std::fmt::Debug
{
    fn is_high(&mut self) -> Result<bool, HwError> {
        let level = self.pin
            .is_high()
            .map_err(|e| HwError::Pin(format!("{:?}", e)))?;

        Ok(level != self.inverted)
    }
}

impl<P: OutputPin> PinSolenoid<P> {
    pub fn new(forward: P, reverse: P) -> Self {
        Self {
            forward,
            reverse,
            state: false,
        }
    }
}

impl<P> Actuator2 for PinSolenoid<P>
where
    P: OutputPin,
    P::Error: std::fmt::Debug
{
    fn set(&mut self, forward: bool) -> Result<(), HwError> {
        let pin_err = |e: P::Error| HwError::Pin(format!("{:?}", e));

        // Release the opposing coil before energising, never both at once
        if forward {
            self.reverse.set_low().map_err(pin_err)?;
            self.forward.set_high().map_err(pin_err)?;
        }
        else {
            self.forward.set_low().map_err(pin_err)?;
            self.reverse.set_high().map_err(pin_err)?;
        }

        self.state = forward;
        Ok(())
    }

    fn get(&self) -> bool {
        self.state
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Records the last duty cycle set on each channel
    #[derive(Default)]
    struct FakeBoard {
        duty: [f64; 4],
    }

    impl ServoDriver for FakeBoard {
        type Channel = usize;

        fn set_duty_cycle(&mut self, channel: usize, duty_cycle: f64) -> Result<(), HwError> {
            if !(0.0..=1.0).contains(&duty_cycle) {
                return Err(HwError::InvalidDutyCycle);
            }
            self.duty[channel] = duty_cycle;
            Ok(())
        }
    }

    #[test]
    fn test_pwm_motor() {
        let board = Rc::new(RefCell::new(FakeBoard::default()));
        let pulse = PwmPulseParams::default();

        let mut fwd = PwmMotor::new(board.clone(), 0, false, pulse);
        let mut inv = PwmMotor::new(board.clone(), 1, true, pulse);

        // Neutral is a 1.5 ms pulse in a 20 ms period
        fwd.stop().unwrap();
        assert!((board.borrow().duty[0] - 0.075).abs() < 1e-12);

        // Saturates at full forward, 2 ms
        fwd.set(3.0).unwrap();
        assert_eq!(fwd.get(), 1.0);
        assert!((board.borrow().duty[0] - 0.1).abs() < 1e-12);

        // Inverted motors get the opposite pulse but report the commanded output
        inv.set(1.0).unwrap();
        assert_eq!(inv.get(), 1.0);
        assert!((board.borrow().duty[1] - 0.05).abs() < 1e-12);
    }
}
