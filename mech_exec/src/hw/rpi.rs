//! # Raspberry Pi hardware backend
//!
//! Motor controllers are driven from a PCA9685 board on the I2C bus, limit switches, beam-breaks,
//! solenoid valves and encoders use the GPIO header.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{
    cell::RefCell,
    rc::Rc,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
};

use log::info;
use pwm_pca9685::{Address, Pca9685};
use rppal::{
    gpio::{Gpio, InputPin, Level, Trigger},
    i2c::I2c,
};

use super::{
    pca9685::channel_from_index, Actuator2, ActuatorMap, DigitalIn, EncoderMap, HalInput,
    HwBackend, HwError, HwParams, InputMap, Motor, MotorMap, PinSolenoid, PositionEncoder,
    PwmMotor, PwmPulseParams,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct RpiBackend {
    gpio: Gpio,
    pwm: Rc<RefCell<Pca9685<I2c>>>,
    pulse: PwmPulseParams,
}

/// A quadrature encoder decoded from GPIO interrupts.
struct GpioEncoder {
    count: Arc<AtomicI64>,
    units_per_count: f64,

    // Channel A must be kept alive for its interrupt to keep firing
    _pin_a: InputPin,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RpiBackend {
    pub fn new(params: &HwParams) -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(|e| HwError::Unavailable(format!("GPIO: {}", e)))?;

        let i2c = I2c::new().map_err(|e| HwError::Unavailable(format!("I2C: {}", e)))?;

        let address = Address::from(params.pca9685_address);
        let mut pwm = Pca9685::new(i2c, address).map_err(|_| HwError::I2c)?;
        pwm.set_prescale(params.pca9685_prescale).map_err(|_| HwError::I2c)?;
        pwm.enable().map_err(|_| HwError::I2c)?;

        info!(
            "PCA9685 opened at 0x{:02x} with prescale {}",
            params.pca9685_address,
            params.pca9685_prescale
        );

        Ok(Self {
            gpio,
            pwm: Rc::new(RefCell::new(pwm)),
            pulse: params.pulse,
        })
    }

    fn input_pin(&self, pin: u8) -> Result<InputPin, HwError> {
        Ok(self.gpio
            .get(pin)
            .map_err(|e| HwError::Pin(format!("{}", e)))?
            .into_input_pullup())
    }
}

impl HwBackend for RpiBackend {
    fn motor(&mut self, map: &MotorMap) -> Result<Box<dyn Motor>, HwError> {
        let channel = channel_from_index(map.channel)?;

        let mut motor = PwmMotor::new(self.pwm.clone(), channel, map.inverted, self.pulse);

        // Start from neutral
        motor.stop()?;

        Ok(Box::new(motor))
    }

    fn input(&mut self, map: &InputMap) -> Result<Box<dyn DigitalIn>, HwError> {
        Ok(Box::new(HalInput::new(self.input_pin(map.pin)?, map.inverted)))
    }

    fn actuator(&mut self, map: &ActuatorMap) -> Result<Box<dyn Actuator2>, HwError> {
        let output = |pin: u8| -> Result<_, HwError> {
            Ok(self.gpio
                .get(pin)
                .map_err(|e| HwError::Pin(format!("{}", e)))?
                .into_output_low())
        };

        let mut sol = PinSolenoid::new(output(map.forward_pin)?, output(map.reverse_pin)?);
        sol.set(false)?;

        Ok(Box::new(sol))
    }

    fn encoder(&mut self, map: &EncoderMap) -> Result<Box<dyn PositionEncoder>, HwError> {
        let count = Arc::new(AtomicI64::new(0));

        let mut pin_a = self.input_pin(map.pin_a)?;
        let pin_b = self.input_pin(map.pin_b)?;

        // Sample channel B on each edge of A to get the direction. B is owned by the interrupt
        // callback from here on.
        let c = count.clone();
        pin_a
            .set_async_interrupt(Trigger::Both, move |level| {
                let forward = (level == Level::High) != pin_b.is_high();
                c.fetch_add(if forward { 1 } else { -1 }, Ordering::Relaxed);
            })
            .map_err(|e| HwError::Pin(format!("{}", e)))?;

        Ok(Box::new(GpioEncoder {
            count,
            units_per_count: map.units_per_count,
            _pin_a: pin_a,
        }))
    }
}

impl PositionEncoder for GpioEncoder {
    fn position(&mut self) -> Result<f64, HwError> {
        Ok(self.count.load(Ordering::Relaxed) as f64 * self.units_per_count)
    }
}
