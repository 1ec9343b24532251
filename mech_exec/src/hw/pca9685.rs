//! [`ServoDriver`] implementation for the PCA9685 driver

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use pwm_pca9685::{Channel, Pca9685};
use embedded_hal::blocking::i2c::{Write, WriteRead};

use super::{HwError, ServoDriver};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Largest off count of the 12 bit PWM counter
const MAX_PWM: u16 = 4095;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<I2C, E> ServoDriver for Pca9685<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>
{
    type Channel = Channel;

    fn set_duty_cycle(
        &mut self,
        channel: Self::Channel,
        duty_cycle: f64
    ) -> Result<(), HwError> {

        // If the duty cycle is out of range return an error
        if !(0.0..=1.0).contains(&duty_cycle) {
            return Err(HwError::InvalidDutyCycle)
        }

        // The pulse starts at the beginning of the period and ends at the duty cycle
        let off = (duty_cycle * MAX_PWM as f64).round() as u16;

        match self.set_channel_on_off(channel, 0, off) {
            Ok(_) => Ok(()),
            Err(pwm_pca9685::Error::I2C(_)) => Err(HwError::I2c),
            Err(pwm_pca9685::Error::InvalidInputData) => Err(HwError::InvalidDutyCycle)
        }
    }
}

/// Map a channel index onto the driver's channel.
pub fn channel_from_index(index: u8) -> Result<Channel, HwError> {
    let ch = match index {
        0 => Channel::C0,
        1 => Channel::C1,
        2 => Channel::C2,
        3 => Channel::C3,
        4 => Channel::C4,
        5 => Channel::C5,
        6 => Channel::C6,
        7 => Channel::C7,
        8 => Channel::C8,
        9 => Channel::C9,
        10 => Channel::C10,
        11 => Channel::C11,
        12 => Channel::C12,
        13 => Channel::C13,
        14 => Channel::C14,
        15 => Channel::C15,
        i => return Err(HwError::Unavailable(format!("PCA9685 has no channel {}", i)))
    };

    Ok(ch)
}
