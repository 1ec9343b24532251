//! Implementations for the Intake state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::{
    intake::{IntakeAngle, IntakeDems, IntakeSens},
    MotorDem,
};
use log::{debug, trace};
use serde::Serialize;

// Internal
use super::{IntakeError, IntakeIo, Params};
use crate::{
    ctrl::{Debouncer, Edge, EdgeDetector, PidController},
    io::MechIo,
    tm::{TmSink, TmValue},
};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Intake module state
pub struct Intake {
    pub(crate) params: Params,

    io: IntakeIo,

    /// Last sensor snapshot
    sens: IntakeSens,

    /// Current demands, persisting between cycles until superseded
    dems: IntakeDems,

    /// Stowed setpoint, captured on the first cycle
    stored_pos: Option<f64>,

    /// Selects the stowed (true) or deployed (false) setpoint
    toggled_in: bool,

    toggle_debounce: Debouncer,
    toggle_edge: EdgeDetector,

    angle_pid: PidController,

    report: StatusReport,
}

/// Data required to build the intake.
pub struct InitData {
    pub params: Params,
    pub io: IntakeIo,
}

/// Input data to the Intake.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// Current time
    pub now_s: f64,

    /// Held state of the operator's angle toggle button
    pub toggle_request: bool,

    /// Holds the angle motors at zero output, the setpoint selection still follows the operator
    pub safe: bool,
}

/// Status report for Intake processing.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    /// Setpoint of the angle loop, `None` until the stowed position is known
    pub target_pos: Option<f64>,

    pub angle_error: f64,

    pub pid_output: f64,

    pub toggled_in: bool,

    /// True if the setpoint was toggled by the operator this cycle
    pub toggled: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for Intake {
    type InitData = InitData;
    type InitError = IntakeError;

    type InputData = InputData;
    type OutputData = IntakeDems;
    type StatusReport = StatusReport;
    type ProcError = IntakeError;

    /// Initialise the Intake module.
    fn init(init_data: Self::InitData) -> Result<Self, Self::InitError> {
        let params = init_data.params;
        params.validate().map_err(IntakeError::InvalidParams)?;

        let angle_pid = PidController::new(params.angle_pid)
            .with_output_limits(-params.angle_output_limit, params.angle_output_limit);

        Ok(Self {
            io: init_data.io,
            sens: IntakeSens::default(),
            dems: IntakeDems::default(),
            stored_pos: None,
            toggled_in: true,
            toggle_debounce: Debouncer::new(params.toggle_hold_s, false),
            toggle_edge: EdgeDetector::new(false),
            angle_pid,
            report: StatusReport::default(),
            params,
        })
    }

    /// Perform cyclic processing of the Intake.
    ///
    /// Reads the sensors, updates the setpoint selection, runs the angle loop and applies the
    /// demands.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.report = StatusReport::default();

        self.sens = self.io.read_sens();

        // Capture the stowed position on the first cycle
        if self.stored_pos.is_none() {
            debug!("Intake stowed position captured at {}", self.sens.angle_right_pos);
            self.stored_pos = Some(self.sens.angle_right_pos);
        }

        // Debounce the operator toggle, flipping the setpoint on each accepted press
        let request = self.toggle_debounce.update(input_data.toggle_request, input_data.now_s);
        if let Some(Edge::Rising) = self.toggle_edge.update(request) {
            self.toggled_in = !self.toggled_in;
            self.report.toggled = true;
            debug!("Intake toggled {}", if self.toggled_in { "in" } else { "out" });
        }

        // Angle loop, tracking the right motor
        if let Some(target) = self.target_pos() {
            let out = if input_data.safe {
                self.angle_pid.reset();
                0.0
            } else {
                self.angle_pid.calculate(self.sens.angle_right_pos, target, input_data.now_s)
            };

            // Pending stops are honoured before the loop drives the motors again
            if !self.dems.angle_right.is_stop() {
                self.dems.angle_right = MotorDem::Speed(out);
            }
            if !self.dems.angle_left.is_stop() {
                self.dems.angle_left = MotorDem::Speed(-out);
            }

            self.report.target_pos = Some(target);
            self.report.angle_error = target - self.sens.angle_right_pos;
            self.report.pid_output = out;
        }
        self.report.toggled_in = self.toggled_in;

        trace!("Intake dems: {:?}", self.dems);

        let output = self.dems;
        self.io.apply_dems(&mut self.dems);

        Ok((output, self.report))
    }
}

impl Intake {
    /// The setpoint currently selected, or `None` before the first cycle.
    pub fn target_pos(&self) -> Option<f64> {
        self.stored_pos.map(|stored| {
            if self.toggled_in {
                stored
            } else {
                stored - self.params.deployed_offset
            }
        })
    }

    pub fn toggled_in(&self) -> bool {
        self.toggled_in
    }

    pub fn sens(&self) -> &IntakeSens {
        &self.sens
    }

    /// Run the rollers open loop.
    pub fn run_rollers(&mut self, speed: f64) {
        self.dems.rollers = MotorDem::Speed(speed);
    }

    /// Run the rollers at the eject speed.
    pub fn eject(&mut self) {
        self.run_rollers(self.params.eject_speed);
    }

    pub fn stop_rollers(&mut self) {
        self.dems.rollers = MotorDem::Stop;
    }

    /// Stop the rollers and both angle motors for one cycle.
    pub fn stop_motors(&mut self) {
        self.dems.rollers = MotorDem::Stop;
        self.dems.angle_left = MotorDem::Stop;
        self.dems.angle_right = MotorDem::Stop;
    }

    pub fn set_angle(&mut self, angle: IntakeAngle) {
        self.toggled_in = angle == IntakeAngle::In;
    }

    pub fn toggle_angle(&mut self) {
        self.toggled_in = !self.toggled_in;
    }

    /// Publish the intake's telemetry.
    pub fn publish_tm(&self, tm: &mut dyn TmSink) {
        tm.publish("intake/top_limit", TmValue::Bool(self.sens.top_limit));
        tm.publish("intake/bottom_limit", TmValue::Bool(self.sens.bottom_limit));
        tm.publish("intake/angle_left_pos", TmValue::Number(self.sens.angle_left_pos));
        tm.publish("intake/angle_right_pos", TmValue::Number(self.sens.angle_right_pos));
        tm.publish("intake/rollers_out", TmValue::Number(self.sens.rollers_out));
        tm.publish("intake/pid_output", TmValue::Number(self.report.pid_output));
        tm.publish("intake/toggled_in", TmValue::Bool(self.toggled_in));
        if let Some(t) = self.report.target_pos {
            tm.publish("intake/target_pos", TmValue::Number(t));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::intake::SimIntake;

    const DT: f64 = 0.02;

    fn sim_intake(initial_pos: f64) -> (Intake, std::rc::Rc<std::cell::RefCell<crate::intake::SimIntakeHw>>) {
        let sim = SimIntake::new(initial_pos);
        let hw = sim.handle();
        let intake = Intake::init(InitData {
            params: Params::default(),
            io: IntakeIo::Sim(sim),
        }).unwrap();

        (intake, hw)
    }

    fn step(intake: &mut Intake, i: usize, toggle: bool) -> (IntakeDems, StatusReport) {
        intake.proc(&InputData {
            now_s: i as f64 * DT,
            toggle_request: toggle,
            safe: false,
        }).unwrap()
    }

    #[test]
    fn test_target_selection() {
        let (mut intake, _) = sim_intake(120.0);

        assert_eq!(intake.target_pos(), None);
        step(&mut intake, 0, false);

        assert!(intake.toggled_in());
        assert_eq!(intake.target_pos(), Some(120.0));

        intake.set_angle(IntakeAngle::Out);
        assert_eq!(intake.target_pos(), Some(70.0));

        intake.toggle_angle();
        assert_eq!(intake.target_pos(), Some(120.0));
    }

    #[test]
    fn test_mirrored_drive_converges() {
        let (mut intake, hw) = sim_intake(0.0);
        step(&mut intake, 0, false);
        intake.set_angle(IntakeAngle::Out);

        let (dems, _) = step(&mut intake, 1, false);

        // Deployed is below stowed, so the right motor drives negative and the left mirrors it
        assert!(dems.angle_right.speed() < 0.0);
        assert_eq!(dems.angle_left.speed(), -dems.angle_right.speed());

        for i in 2..100 {
            step(&mut intake, i, false);
        }
        let hw = hw.borrow();
        assert!((hw.angle_right_pos + 50.0).abs() < 1e-3);
        assert!((hw.angle_left_pos - 50.0).abs() < 1e-3);
    }

    #[test]
    fn test_rapid_toggles_rejected() {
        let (mut intake, _) = sim_intake(0.0);

        // Chatter on the button for less than the hold time, several times over
        let mut i = 0;
        for _ in 0..4 {
            for toggle in [true, false, true, false].iter() {
                step(&mut intake, i, *toggle);
                i += 1;
            }
        }
        assert!(intake.toggled_in());

        // A proper press is accepted exactly once
        let mut transitions = 0;
        for _ in 0..20 {
            let (_, rpt) = step(&mut intake, i, true);
            if rpt.toggled {
                transitions += 1;
            }
            i += 1;
        }
        assert_eq!(transitions, 1);
        assert!(!intake.toggled_in());

        // Releasing doesn't toggle back
        for _ in 0..20 {
            step(&mut intake, i, false);
            i += 1;
        }
        assert!(!intake.toggled_in());
    }

    #[test]
    fn test_rollers_independent_of_angle() {
        let (mut intake, hw) = sim_intake(0.0);
        step(&mut intake, 0, false);

        intake.eject();
        let (dems, rpt) = step(&mut intake, 1, false);
        assert_eq!(dems.rollers, MotorDem::Speed(-0.7));
        assert_eq!(rpt.pid_output, 0.0);

        intake.stop_rollers();
        let (dems, _) = step(&mut intake, 2, false);
        assert_eq!(dems.rollers, MotorDem::Stop);

        // The stop has cleared itself
        let (dems, _) = step(&mut intake, 3, false);
        assert_eq!(dems.rollers, MotorDem::Speed(0.0));
        assert_eq!(hw.borrow().rollers.stops, 1);
    }

    #[test]
    fn test_stop_motors_is_one_shot() {
        let (mut intake, hw) = sim_intake(0.0);
        step(&mut intake, 0, false);
        intake.set_angle(IntakeAngle::Out);

        intake.stop_motors();
        let (dems, _) = step(&mut intake, 1, false);
        assert!(dems.angle_left.is_stop() && dems.angle_right.is_stop() && dems.rollers.is_stop());
        assert_eq!(hw.borrow().angle_right.output, 0.0);

        // The angle loop takes over again on the next cycle
        let (dems, _) = step(&mut intake, 2, false);
        assert!(dems.angle_right.speed() < 0.0);
        assert_eq!(hw.borrow().angle_right.stops, 1);
    }

    #[test]
    fn test_safe_holds_angle_motors() {
        let (mut intake, hw) = sim_intake(0.0);
        step(&mut intake, 0, false);
        intake.set_angle(IntakeAngle::Out);
        step(&mut intake, 1, false);

        intake.stop_motors();
        for i in 2..10 {
            let (dems, rpt) = intake.proc(&InputData {
                now_s: i as f64 * DT,
                toggle_request: false,
                safe: true,
            }).unwrap();

            assert_eq!(dems.angle_left.speed(), 0.0);
            assert_eq!(dems.angle_right.speed(), 0.0);
            assert_eq!(rpt.pid_output, 0.0);
            assert_eq!(hw.borrow().angle_right.output, 0.0);
        }

        let (dems, _) = step(&mut intake, 10, false);
        assert!(dems.angle_right.speed() < 0.0);
    }
}
