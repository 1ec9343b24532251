//! Intake hardware bindings

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};

use comms_if::eqpt::intake::{IntakeDems, IntakeSens};
use serde::{Deserialize, Serialize};

use crate::{
    hw::{open_device, DigitalIn, EncoderMap, HwBackend, InputMap, Motor, MotorMap, PositionEncoder},
    io::{apply_motor, motor_output, read_encoder, read_input, MechIo, SimMotor},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Where the intake's devices are connected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntakeHwMap {
    pub rollers: MotorMap,
    pub angle_left: MotorMap,
    pub angle_right: MotorMap,
    pub angle_left_enc: EncoderMap,
    pub angle_right_enc: EncoderMap,
    pub top_limit: InputMap,
    pub bottom_limit: InputMap,
}

/// Intake binding using the physical devices.
pub struct PhysIntake {
    rollers: Option<Box<dyn Motor>>,
    angle_left: Option<Box<dyn Motor>>,
    angle_right: Option<Box<dyn Motor>>,
    angle_left_enc: Option<Box<dyn PositionEncoder>>,
    angle_right_enc: Option<Box<dyn PositionEncoder>>,
    top_limit: Option<Box<dyn DigitalIn>>,
    bottom_limit: Option<Box<dyn DigitalIn>>,

    /// Last snapshot, returned for devices which can't be read
    last: IntakeSens,
}

/// State of the simulated intake.
#[derive(Debug, Clone)]
pub struct SimIntakeHw {
    pub rollers: SimMotor,
    pub angle_left: SimMotor,
    pub angle_right: SimMotor,
    pub angle_left_pos: f64,
    pub angle_right_pos: f64,
    pub top_limit: bool,
    pub bottom_limit: bool,

    /// Encoder units the pivot moves per cycle at full output
    pub units_per_cycle: f64,
}

/// Intake binding using an in-memory model.
pub struct SimIntake {
    hw: Rc<RefCell<SimIntakeHw>>,
}

/// The binding selected for the intake.
pub enum IntakeIo {
    Phys(PhysIntake),
    Sim(SimIntake),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PhysIntake {
    /// Open the intake's devices. Devices which can't be opened are left out and the intake
    /// stays inert on them.
    pub fn open(mut backend: Option<&mut dyn HwBackend>, map: &IntakeHwMap) -> Self {
        Self {
            rollers: open_device(&mut backend, "intake rollers", |b| b.motor(&map.rollers)),
            angle_left: open_device(&mut backend, "intake left angle motor", |b| {
                b.motor(&map.angle_left)
            }),
            angle_right: open_device(&mut backend, "intake right angle motor", |b| {
                b.motor(&map.angle_right)
            }),
            angle_left_enc: open_device(&mut backend, "intake left encoder", |b| {
                b.encoder(&map.angle_left_enc)
            }),
            angle_right_enc: open_device(&mut backend, "intake right encoder", |b| {
                b.encoder(&map.angle_right_enc)
            }),
            top_limit: open_device(&mut backend, "intake top limit switch", |b| {
                b.input(&map.top_limit)
            }),
            bottom_limit: open_device(&mut backend, "intake bottom limit switch", |b| {
                b.input(&map.bottom_limit)
            }),
            last: IntakeSens::default(),
        }
    }
}

impl MechIo for PhysIntake {
    type Sens = IntakeSens;
    type Dems = IntakeDems;

    fn read_sens(&mut self) -> IntakeSens {
        let sens = IntakeSens {
            top_limit: read_input(&mut self.top_limit, self.last.top_limit),
            bottom_limit: read_input(&mut self.bottom_limit, self.last.bottom_limit),
            angle_left_pos: read_encoder(&mut self.angle_left_enc, self.last.angle_left_pos),
            angle_right_pos: read_encoder(&mut self.angle_right_enc, self.last.angle_right_pos),
            angle_left_out: motor_output(&self.angle_left),
            angle_right_out: motor_output(&self.angle_right),
            rollers_out: motor_output(&self.rollers),
        };

        self.last = sens;
        sens
    }

    fn apply_dems(&mut self, dems: &mut IntakeDems) {
        apply_motor(&mut self.angle_left, &mut dems.angle_left, "intake left angle motor");
        apply_motor(&mut self.angle_right, &mut dems.angle_right, "intake right angle motor");
        apply_motor(&mut self.rollers, &mut dems.rollers, "intake rollers");
    }
}

impl SimIntakeHw {
    pub fn new(initial_pos: f64) -> Self {
        Self {
            rollers: SimMotor::default(),
            angle_left: SimMotor::default(),
            angle_right: SimMotor::default(),
            // The left encoder is mirrored
            angle_left_pos: -initial_pos,
            angle_right_pos: initial_pos,
            top_limit: false,
            bottom_limit: false,
            units_per_cycle: 10.0,
        }
    }
}

impl SimIntake {
    pub fn new(initial_pos: f64) -> Self {
        Self {
            hw: Rc::new(RefCell::new(SimIntakeHw::new(initial_pos))),
        }
    }

    /// Handle onto the simulated hardware, used to inspect outputs and inject sensor values.
    pub fn handle(&self) -> Rc<RefCell<SimIntakeHw>> {
        self.hw.clone()
    }
}

impl MechIo for SimIntake {
    type Sens = IntakeSens;
    type Dems = IntakeDems;

    fn read_sens(&mut self) -> IntakeSens {
        let hw = self.hw.borrow();

        IntakeSens {
            top_limit: hw.top_limit,
            bottom_limit: hw.bottom_limit,
            angle_left_pos: hw.angle_left_pos,
            angle_right_pos: hw.angle_right_pos,
            angle_left_out: hw.angle_left.output,
            angle_right_out: hw.angle_right.output,
            rollers_out: hw.rollers.output,
        }
    }

    fn apply_dems(&mut self, dems: &mut IntakeDems) {
        let mut hw = self.hw.borrow_mut();

        hw.rollers.apply(&mut dems.rollers);
        hw.angle_left.apply(&mut dems.angle_left);
        hw.angle_right.apply(&mut dems.angle_right);

        // Integrate the angle motors into the encoder positions
        let k = hw.units_per_cycle;
        hw.angle_left_pos += hw.angle_left.output * k;
        hw.angle_right_pos += hw.angle_right.output * k;
    }
}

impl MechIo for IntakeIo {
    type Sens = IntakeSens;
    type Dems = IntakeDems;

    fn read_sens(&mut self) -> IntakeSens {
        match self {
            IntakeIo::Phys(io) => io.read_sens(),
            IntakeIo::Sim(io) => io.read_sens(),
        }
    }

    fn apply_dems(&mut self, dems: &mut IntakeDems) {
        match self {
            IntakeIo::Phys(io) => io.apply_dems(dems),
            IntakeIo::Sim(io) => io.apply_dems(dems),
        }
    }
}
