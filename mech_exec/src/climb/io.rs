//! Climb hardware bindings

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};

use comms_if::eqpt::climb::{ArmSens, ClimbDems, ClimbSens, Side};
use serde::{Deserialize, Serialize};

use crate::{
    hw::{open_device, Actuator2, ActuatorMap, DigitalIn, HwBackend, InputMap, Motor, MotorMap},
    io::{apply_actuator, apply_motor, motor_output, read_input, MechIo, SimMotor},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Where one arm's devices are connected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmHwMap {
    pub motor: MotorMap,
    pub clutch: ActuatorMap,
    pub limit: InputMap,
}

/// Where the climber's devices are connected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbHwMap {
    pub left: ArmHwMap,
    pub right: ArmHwMap,
}

struct PhysArm {
    motor: Option<Box<dyn Motor>>,
    clutch: Option<Box<dyn Actuator2>>,
    limit: Option<Box<dyn DigitalIn>>,
}

/// Climb binding using the physical devices.
pub struct PhysClimb {
    arms: [PhysArm; 2],
    last: ClimbSens,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SimArmHw {
    pub motor: SimMotor,
    pub clutch_engaged: bool,
    pub limit: bool,
}

/// State of the simulated climber.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimClimbHw {
    pub arms: [SimArmHw; 2],
}

/// Climb binding using an in-memory model.
pub struct SimClimb {
    hw: Rc<RefCell<SimClimbHw>>,
}

/// The binding selected for the climber.
pub enum ClimbIo {
    Phys(PhysClimb),
    Sim(SimClimb),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ArmHwMap {
    fn open(&self, backend: &mut Option<&mut dyn HwBackend>, side: Side) -> PhysArm {
        PhysArm {
            motor: open_device(backend, &format!("climb {} motor", side.name()), |b| {
                b.motor(&self.motor)
            }),
            clutch: open_device(backend, &format!("climb {} clutch", side.name()), |b| {
                b.actuator(&self.clutch)
            }),
            limit: open_device(backend, &format!("climb {} limit switch", side.name()), |b| {
                b.input(&self.limit)
            }),
        }
    }
}

impl PhysClimb {
    pub fn open(mut backend: Option<&mut dyn HwBackend>, map: &ClimbHwMap) -> Self {
        let left = map.left.open(&mut backend, Side::Left);
        let right = map.right.open(&mut backend, Side::Right);

        Self {
            arms: [left, right],
            last: ClimbSens::default(),
        }
    }
}

impl MechIo for PhysClimb {
    type Sens = ClimbSens;
    type Dems = ClimbDems;

    fn read_sens(&mut self) -> ClimbSens {
        let mut sens = ClimbSens::default();

        for side in Side::ALL.iter() {
            let i = side.index();
            let arm = &mut self.arms[i];
            let last = self.last.arms[i];

            sens.arms[i] = ArmSens {
                limit: read_input(&mut arm.limit, last.limit),
                motor_out: motor_output(&arm.motor),
                clutch_engaged: match arm.clutch {
                    Some(ref c) => c.get(),
                    None => last.clutch_engaged,
                },
            };
        }

        self.last = sens;
        sens
    }

    fn apply_dems(&mut self, dems: &mut ClimbDems) {
        for side in Side::ALL.iter() {
            let arm = &mut self.arms[side.index()];
            let dem = dems.arm_mut(*side);

            apply_motor(&mut arm.motor, &mut dem.motor, side.name());
            apply_actuator(&mut arm.clutch, dem.clutch_engaged, side.name());
        }
    }
}

impl SimClimb {
    pub fn new() -> Self {
        Self {
            hw: Rc::new(RefCell::new(SimClimbHw::default())),
        }
    }

    pub fn handle(&self) -> Rc<RefCell<SimClimbHw>> {
        self.hw.clone()
    }
}

impl Default for SimClimb {
    fn default() -> Self {
        Self::new()
    }
}

impl MechIo for SimClimb {
    type Sens = ClimbSens;
    type Dems = ClimbDems;

    fn read_sens(&mut self) -> ClimbSens {
        let hw = self.hw.borrow();
        let mut sens = ClimbSens::default();

        for (s, a) in sens.arms.iter_mut().zip(hw.arms.iter()) {
            *s = ArmSens {
                limit: a.limit,
                motor_out: a.motor.output,
                clutch_engaged: a.clutch_engaged,
            };
        }

        sens
    }

    fn apply_dems(&mut self, dems: &mut ClimbDems) {
        let mut hw = self.hw.borrow_mut();

        for (a, d) in hw.arms.iter_mut().zip(dems.arms.iter_mut()) {
            a.motor.apply(&mut d.motor);
            a.clutch_engaged = d.clutch_engaged;
        }
    }
}

impl MechIo for ClimbIo {
    type Sens = ClimbSens;
    type Dems = ClimbDems;

    fn read_sens(&mut self) -> ClimbSens {
        match self {
            ClimbIo::Phys(io) => io.read_sens(),
            ClimbIo::Sim(io) => io.read_sens(),
        }
    }

    fn apply_dems(&mut self, dems: &mut ClimbDems) {
        match self {
            ClimbIo::Phys(io) => io.apply_dems(dems),
            ClimbIo::Sim(io) => io.apply_dems(dems),
        }
    }
}
