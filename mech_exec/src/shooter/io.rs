//! Shooter hardware bindings

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};

use comms_if::eqpt::shooter::{Elevation, ShooterDems, ShooterSens};
use serde::{Deserialize, Serialize};

use crate::{
    hw::{open_device, Actuator2, ActuatorMap, DigitalIn, HwBackend, InputMap, Motor, MotorMap},
    io::{apply_actuator, apply_motor, motor_output, read_input, MechIo, SimMotor},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Where the shooter's devices are connected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterHwMap {
    pub flywheel: MotorMap,
    pub guide: MotorMap,
    pub elevation: ActuatorMap,
    pub note_detector: InputMap,
}

/// Shooter binding using the physical devices.
pub struct PhysShooter {
    flywheel: Option<Box<dyn Motor>>,
    guide: Option<Box<dyn Motor>>,
    elevation: Option<Box<dyn Actuator2>>,
    note_detector: Option<Box<dyn DigitalIn>>,

    last: ShooterSens,
}

/// State of the simulated shooter.
#[derive(Debug, Clone)]
pub struct SimShooterHw {
    pub flywheel: SimMotor,
    pub guide: SimMotor,
    pub elevation: Elevation,

    /// Raw beam-break level, `false` while a note is present
    pub note_beam_raw: bool,
}

/// Shooter binding using an in-memory model.
pub struct SimShooter {
    hw: Rc<RefCell<SimShooterHw>>,
}

/// The binding selected for the shooter.
pub enum ShooterIo {
    Phys(PhysShooter),
    Sim(SimShooter),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PhysShooter {
    pub fn open(mut backend: Option<&mut dyn HwBackend>, map: &ShooterHwMap) -> Self {
        Self {
            flywheel: open_device(&mut backend, "shooter flywheel", |b| b.motor(&map.flywheel)),
            guide: open_device(&mut backend, "shooter guide", |b| b.motor(&map.guide)),
            elevation: open_device(&mut backend, "shooter elevation solenoid", |b| {
                b.actuator(&map.elevation)
            }),
            note_detector: open_device(&mut backend, "shooter note detector", |b| {
                b.input(&map.note_detector)
            }),
            last: ShooterSens::default(),
        }
    }
}

impl MechIo for PhysShooter {
    type Sens = ShooterSens;
    type Dems = ShooterDems;

    fn read_sens(&mut self) -> ShooterSens {
        let elevation = match self.elevation {
            Some(ref a) => Elevation::from_bool(a.get()),
            None => self.last.elevation,
        };

        let sens = ShooterSens {
            note_beam_raw: read_input(&mut self.note_detector, self.last.note_beam_raw),
            flywheel_out: motor_output(&self.flywheel),
            guide_out: motor_output(&self.guide),
            elevation,
        };

        self.last = sens;
        sens
    }

    fn apply_dems(&mut self, dems: &mut ShooterDems) {
        apply_motor(&mut self.flywheel, &mut dems.flywheel, "shooter flywheel");
        apply_motor(&mut self.guide, &mut dems.guide, "shooter guide");
        apply_actuator(&mut self.elevation, dems.elevation.as_bool(), "shooter elevation");
    }
}

impl Default for SimShooterHw {
    fn default() -> Self {
        Self {
            flywheel: SimMotor::default(),
            guide: SimMotor::default(),
            elevation: Elevation::Down,
            note_beam_raw: true,
        }
    }
}

impl SimShooter {
    pub fn new() -> Self {
        Self {
            hw: Rc::new(RefCell::new(SimShooterHw::default())),
        }
    }

    pub fn handle(&self) -> Rc<RefCell<SimShooterHw>> {
        self.hw.clone()
    }
}

impl Default for SimShooter {
    fn default() -> Self {
        Self::new()
    }
}

impl MechIo for SimShooter {
    type Sens = ShooterSens;
    type Dems = ShooterDems;

    fn read_sens(&mut self) -> ShooterSens {
        let hw = self.hw.borrow();

        ShooterSens {
            note_beam_raw: hw.note_beam_raw,
            flywheel_out: hw.flywheel.output,
            guide_out: hw.guide.output,
            elevation: hw.elevation,
        }
    }

    fn apply_dems(&mut self, dems: &mut ShooterDems) {
        let mut hw = self.hw.borrow_mut();

        hw.flywheel.apply(&mut dems.flywheel);
        hw.guide.apply(&mut dems.guide);
        hw.elevation = dems.elevation;
    }
}

impl MechIo for ShooterIo {
    type Sens = ShooterSens;
    type Dems = ShooterDems;

    fn read_sens(&mut self) -> ShooterSens {
        match self {
            ShooterIo::Phys(io) => io.read_sens(),
            ShooterIo::Sim(io) => io.read_sens(),
        }
    }

    fn apply_dems(&mut self, dems: &mut ShooterDems) {
        match self {
            ShooterIo::Phys(io) => io.apply_dems(dems),
            ShooterIo::Sim(io) => io.apply_dems(dems),
        }
    }
}
