//! Implementations for the Climb state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::{
    eqpt::{
        climb::{ClimbDems, ClimbSens, Direction, Side},
        MotorDem,
    },
    tc::operator::ArmDriveInput,
};
use log::{debug, info, trace};
use serde::Serialize;

// Internal
use super::{ClimbError, ClimbIo, Params};
use crate::{
    io::MechIo,
    tm::{TmSink, TmValue},
};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Climb module state
pub struct Climb {
    pub(crate) params: Params,

    io: ClimbIo,

    sens: ClimbSens,

    dems: ClimbDems,

    /// If false the operator's drive is ignored
    controls_enabled: bool,
}

pub struct InitData {
    pub params: Params,
    pub io: ClimbIo,
}

/// Input data to the Climb.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    pub now_s: f64,
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    pub at_limit: [bool; 2],
    pub controls_enabled: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for Climb {
    type InitData = InitData;
    type InitError = ClimbError;

    type InputData = InputData;
    type OutputData = ClimbDems;
    type StatusReport = StatusReport;
    type ProcError = ClimbError;

    fn init(init_data: Self::InitData) -> Result<Self, Self::InitError> {
        let params = init_data.params;

        if !(params.drive_scale >= 0.0) {
            return Err(ClimbError::InvalidParams(format!(
                "drive_scale must not be negative, got {}", params.drive_scale
            )));
        }

        Ok(Self {
            io: init_data.io,
            sens: ClimbSens::default(),
            dems: ClimbDems::default(),
            controls_enabled: params.controls_enabled,
            params,
        })
    }

    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.sens = self.io.read_sens();

        let mut report = StatusReport {
            controls_enabled: self.controls_enabled,
            ..Default::default()
        };
        for side in Side::ALL.iter() {
            report.at_limit[side.index()] = self.arm_at_limit(*side);
        }

        trace!("Climb dems at {:.3} s: {:?}", input_data.now_s, self.dems);

        let dems = self.dems;
        self.io.apply_dems(&mut self.dems);

        Ok((dems, report))
    }
}

impl Climb {
    pub fn sens(&self) -> &ClimbSens {
        &self.sens
    }

    /// Drive one arm, leaving the other untouched.
    pub fn move_arm(&mut self, side: Side, direction: Direction, speed: f64) {
        self.dems.arm_mut(side).motor = MotorDem::Speed(direction.sign() * speed.abs());
    }

    pub fn stop_arm(&mut self, side: Side) {
        self.dems.arm_mut(side).motor = MotorDem::Stop;
    }

    pub fn set_clutch(&mut self, side: Side, engaged: bool) {
        if self.dems.arm(side).clutch_engaged != engaged {
            debug!("Climb {} clutch {}", side.name(), if engaged { "engaged" } else { "released" });
        }
        self.dems.arm_mut(side).clutch_engaged = engaged;
    }

    /// Drive one arm from the operator's triggers.
    ///
    /// This is what an arm does while nothing else owns it. Outputs zero while the controls are
    /// disabled.
    pub fn drive_default(&mut self, side: Side, input: &ArmDriveInput) {
        let drive = if self.controls_enabled {
            input.drive() * self.params.drive_scale
        } else {
            0.0
        };

        self.dems.arm_mut(side).motor = MotorDem::Speed(drive);
    }

    pub fn toggle_controls(&mut self) {
        self.controls_enabled = !self.controls_enabled;
        info!(
            "Climb controls {}",
            if self.controls_enabled { "enabled" } else { "disabled" }
        );
    }

    pub fn controls_enabled(&self) -> bool {
        self.controls_enabled
    }

    pub fn arm_at_limit(&self, side: Side) -> bool {
        self.sens.arm(side).limit
    }

    pub fn publish_tm(&self, tm: &mut dyn TmSink) {
        for side in Side::ALL.iter() {
            let arm = self.sens.arm(*side);
            tm.publish(
                &format!("climb/{}/limit", side.name()),
                TmValue::Bool(arm.limit)
            );
            tm.publish(
                &format!("climb/{}/clutch_engaged", side.name()),
                TmValue::Bool(arm.clutch_engaged)
            );
            tm.publish(
                &format!("climb/{}/motor_out", side.name()),
                TmValue::Number(arm.motor_out)
            );
        }
    }
}
