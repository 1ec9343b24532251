//! # Mechanism IO bindings
//!
//! Every mechanism controller talks to its hardware through a binding implementing [`MechIo`].
//! Each mechanism provides two bindings, a physical one built on the [`crate::hw`] devices and a
//! simulated one, which are selected when the mechanisms are composed. The controllers don't
//! know which one they are driving.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::MotorDem;
use log::debug;

use crate::hw::{Actuator2, DigitalIn, Motor, PositionEncoder};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

pub trait MechIo {
    /// Snapshot of the mechanism's sensors
    type Sens;

    /// Demands on the mechanism's actuators
    type Dems;

    /// Read the sensors. This has no side effects on the mechanism.
    fn read_sens(&mut self) -> Self::Sens;

    /// Apply the demands to the actuators.
    ///
    /// One-shot `MotorDem::Stop` demands are honoured and then replaced by `Speed(0.0)`.
    fn apply_dems(&mut self, dems: &mut Self::Dems);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// In-memory model of a motor used by the simulated bindings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimMotor {
    /// Output currently applied
    pub output: f64,

    /// Number of stop requests honoured
    pub stops: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimMotor {
    /// Apply a demand, saturating the output like a real motor controller.
    pub fn apply(&mut self, dem: &mut MotorDem) {
        match *dem {
            MotorDem::Speed(s) => self.output = s.max(-1.0).min(1.0),
            MotorDem::Stop => {
                self.output = 0.0;
                self.stops += 1;
                *dem = MotorDem::Speed(0.0);
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Apply a demand to an optional physical motor.
///
/// A missing motor drops the demand. A stop is cleared even if the motor failed to stop, the next
/// cycle's demand will be written again anyway.
pub fn apply_motor(motor: &mut Option<Box<dyn Motor>>, dem: &mut MotorDem, name: &str) {
    let result = match (motor.as_mut(), *dem) {
        (Some(m), MotorDem::Speed(s)) => m.set(s),
        (Some(m), MotorDem::Stop) => m.stop(),
        (None, _) => Ok(()),
    };

    if let Err(e) = result {
        debug!("Could not drive {}: {}", name, e);
    }

    if dem.is_stop() {
        *dem = MotorDem::Speed(0.0);
    }
}

/// Output of an optional motor, zero if it is missing.
pub fn motor_output(motor: &Option<Box<dyn Motor>>) -> f64 {
    motor.as_ref().map(|m| m.get()).unwrap_or(0.0)
}

/// Read an optional digital input, keeping `last` if it is missing or the read fails.
pub fn read_input(input: &mut Option<Box<dyn DigitalIn>>, last: bool) -> bool {
    match input.as_mut().map(|i| i.is_high()) {
        Some(Ok(v)) => v,
        _ => last,
    }
}

/// Read an optional encoder, keeping `last` if it is missing or the read fails.
pub fn read_encoder(encoder: &mut Option<Box<dyn PositionEncoder>>, last: f64) -> f64 {
    match encoder.as_mut().map(|e| e.position()) {
        Some(Ok(v)) => v,
        _ => last,
    }
}

/// Command an optional 2-state actuator.
pub fn apply_actuator(actuator: &mut Option<Box<dyn Actuator2>>, forward: bool, name: &str) {
    if let Some(a) = actuator.as_mut() {
        if a.get() != forward {
            if let Err(e) = a.set(forward) {
                debug!("Could not set {}: {}", name, e);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hw::HwError;

    struct BrokenMotor;

    impl Motor for BrokenMotor {
        fn set(&mut self, _: f64) -> Result<(), HwError> {
            Err(HwError::I2c)
        }
        fn stop(&mut self) -> Result<(), HwError> {
            Err(HwError::I2c)
        }
        fn get(&self) -> f64 {
            0.0
        }
    }

    #[test]
    fn test_stop_is_one_shot() {
        let mut m = SimMotor::default();

        let mut dem = MotorDem::Speed(0.5);
        m.apply(&mut dem);
        assert_eq!(m.output, 0.5);

        dem = MotorDem::Stop;
        m.apply(&mut dem);
        assert_eq!(m.output, 0.0);
        assert_eq!(dem, MotorDem::Speed(0.0));

        // Not re-triggered on the next cycle
        m.apply(&mut dem);
        assert_eq!(m.stops, 1);
    }

    #[test]
    fn test_missing_and_failing_devices() {
        let mut missing: Option<Box<dyn Motor>> = None;
        let mut dem = MotorDem::Stop;
        apply_motor(&mut missing, &mut dem, "missing");
        assert_eq!(dem, MotorDem::Speed(0.0));
        assert_eq!(motor_output(&missing), 0.0);

        let mut broken: Option<Box<dyn Motor>> = Some(Box::new(BrokenMotor));
        let mut dem = MotorDem::Stop;
        apply_motor(&mut broken, &mut dem, "broken");
        assert_eq!(dem, MotorDem::Speed(0.0));

        let mut no_input: Option<Box<dyn DigitalIn>> = None;
        assert!(read_input(&mut no_input, true));
        assert!(!read_input(&mut no_input, false));

        let mut no_enc: Option<Box<dyn PositionEncoder>> = None;
        assert_eq!(read_encoder(&mut no_enc, 12.5), 12.5);
    }
}
