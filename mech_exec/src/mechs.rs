//! # Mechanisms
//!
//! Owns the three mechanism controllers and the latest operator input. This is the context the
//! scheduler's tasks act on: sequences reach the controllers through its [`ActionSink`]
//! implementation, and the climb arms' default tasks drive them from the operator input.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::climb::Side,
    tc::{
        action::{Action, ClimbAction, Condition, IntakeAction, ShooterAction},
        operator::{ArmDriveInput, OperatorInput},
    },
};
use log::trace;
use util::module::State;

use crate::{
    choreo::ActionSink,
    climb::{self, Climb, ClimbError},
    intake::{self, Intake, IntakeError},
    leds::LedSink,
    sched::{Reqs, Task, TaskStatus},
    shooter::{self, Shooter, ShooterError},
    tm::TmSink,
};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum MechsError {
    #[error("Intake error: {0}")]
    Intake(#[from] IntakeError),

    #[error("Shooter error: {0}")]
    Shooter(#[from] ShooterError),

    #[error("Climb error: {0}")]
    Climb(#[from] ClimbError),
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct Mechanisms {
    pub intake: Intake,
    pub shooter: Shooter,
    pub climb: Climb,

    /// Latest operator input
    pub operator: OperatorInput,

    /// Holds the intake's angle loop off while set
    safe: bool,
}

/// Status reports from the last cycle.
#[derive(Debug, Default, Clone, Copy)]
pub struct MechsReport {
    pub intake: intake::StatusReport,
    pub shooter: shooter::StatusReport,
    pub climb: climb::StatusReport,
}

/// Default task of a climb arm, driving it from the operator's triggers.
pub struct ArmDefaultDrive {
    side: Side,
    name: String,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Mechanisms {
    pub fn init(
        intake: intake::InitData,
        shooter: shooter::InitData,
        climb: climb::InitData,
    ) -> Result<Self, MechsError> {
        Ok(Self {
            intake: Intake::init(intake)?,
            shooter: Shooter::init(shooter)?,
            climb: Climb::init(climb)?,
            operator: OperatorInput::default(),
            safe: false,
        })
    }

    /// Run one control cycle of every mechanism.
    ///
    /// The shooter's notifications are forwarded to `leds` and every mechanism's telemetry is
    /// published to `tm`.
    pub fn proc(
        &mut self,
        now_s: f64,
        tm: &mut dyn TmSink,
        leds: &mut dyn LedSink,
    ) -> Result<MechsReport, MechsError> {
        let (_, intake_rpt) = self.intake.proc(&intake::InputData {
            now_s,
            toggle_request: self.operator.intake_toggle,
            safe: self.safe,
        })?;

        let (shooter_out, shooter_rpt) = self.shooter.proc(&shooter::InputData { now_s })?;
        for cmd in shooter_out.led_cmds.iter() {
            leds.apply(cmd);
        }

        let (_, climb_rpt) = self.climb.proc(&climb::InputData { now_s })?;

        self.intake.publish_tm(tm);
        self.shooter.publish_tm(tm);
        self.climb.publish_tm(tm);

        Ok(MechsReport {
            intake: intake_rpt,
            shooter: shooter_rpt,
            climb: climb_rpt,
        })
    }

    /// Stop every motor and keep the intake's angle loop from driving them again.
    pub fn make_safe(&mut self) {
        self.safe = true;
        self.intake.stop_motors();
        self.shooter.stop();
        for side in Side::ALL.iter() {
            self.climb.stop_arm(*side);
        }
    }

    /// Let the intake's angle loop drive again.
    pub fn make_unsafe(&mut self) {
        self.safe = false;
    }
}

impl ActionSink for Mechanisms {
    fn apply(&mut self, action: &Action) {
        trace!("Applying {:?}", action);

        match *action {
            Action::Intake(a) => match a {
                IntakeAction::RunRollers(s) => self.intake.run_rollers(s),
                IntakeAction::Eject => self.intake.eject(),
                IntakeAction::StopRollers => self.intake.stop_rollers(),
                IntakeAction::StopMotors => self.intake.stop_motors(),
                IntakeAction::SetAngle(angle) => self.intake.set_angle(angle),
                IntakeAction::ToggleAngle => self.intake.toggle_angle(),
            },
            Action::Shooter(a) => match a {
                ShooterAction::Run(s) => self.shooter.run(s),
                ShooterAction::RunGuide(s) => self.shooter.run_guide(s),
                ShooterAction::StartShooting => self.shooter.start_shooting(),
                ShooterAction::Stop => self.shooter.stop(),
                ShooterAction::SetElevation(e) => self.shooter.set_elevation(e),
                ShooterAction::ToggleElevation => self.shooter.toggle_elevation(),
            },
            Action::Climb(a) => match a {
                ClimbAction::MoveArm { side, direction, speed } => {
                    self.climb.move_arm(side, direction, speed)
                }
                ClimbAction::StopArm(side) => self.climb.stop_arm(side),
                ClimbAction::SetClutch { side, engaged } => self.climb.set_clutch(side, engaged),
                ClimbAction::ToggleControls => self.climb.toggle_controls(),
            },
        }
    }

    fn check(&self, cond: &Condition) -> bool {
        match *cond {
            Condition::NoteLoaded => self.shooter.is_note_loaded(),
            Condition::ArmAtLimit(side) => self.climb.arm_at_limit(side),
            Condition::ArmsAtLimit => Side::ALL.iter().all(|s| self.climb.arm_at_limit(*s)),
        }
    }
}

impl ArmDefaultDrive {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            name: format!("Climb_Default_Drive_{}", side.name()),
        }
    }
}

impl Task<Mechanisms> for ArmDefaultDrive {
    fn name(&self) -> &str {
        &self.name
    }

    fn reqs(&self) -> Reqs {
        Reqs::empty().with(self.side.mech_id())
    }

    fn exec(&mut self, ctx: &mut Mechanisms, _now_s: f64) -> TaskStatus {
        let input = *ctx.operator.arm(self.side);
        ctx.climb.drive_default(self.side, &input);
        TaskStatus::Running
    }

    fn end(&mut self, ctx: &mut Mechanisms, _interrupted: bool, _now_s: f64) {
        // Release the triggers' hold on the arm
        ctx.climb.drive_default(self.side, &ArmDriveInput::default());
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use crate::{
        climb::{ClimbIo, SimClimb, SimClimbHw},
        intake::{IntakeIo, SimIntake, SimIntakeHw},
        leds::LogLeds,
        shooter::{ShooterIo, SimShooter, SimShooterHw},
        tm::NullTm,
    };
    use comms_if::eqpt::{
        intake::IntakeAngle,
        leds::{Color, LedPattern},
        MotorDem,
    };
    use std::{cell::RefCell, rc::Rc};

    /// Handles onto the simulated hardware behind a set of mechanisms.
    pub(crate) struct SimHw {
        pub intake: Rc<RefCell<SimIntakeHw>>,
        pub shooter: Rc<RefCell<SimShooterHw>>,
        pub climb: Rc<RefCell<SimClimbHw>>,
    }

    pub(crate) fn sim_mechs() -> (Mechanisms, SimHw) {
        let intake = SimIntake::new(0.0);
        let shooter = SimShooter::new();
        let climb = SimClimb::new();

        let hw = SimHw {
            intake: intake.handle(),
            shooter: shooter.handle(),
            climb: climb.handle(),
        };

        let mechs = Mechanisms::init(
            intake::InitData { params: Default::default(), io: IntakeIo::Sim(intake) },
            shooter::InitData { params: Default::default(), io: ShooterIo::Sim(shooter) },
            climb::InitData { params: Default::default(), io: ClimbIo::Sim(climb) },
        ).unwrap();

        (mechs, hw)
    }

    #[test]
    fn test_actions_and_conditions() {
        let (mut mechs, hw) = sim_mechs();
        let mut leds = LogLeds::new(LedPattern::Solid(Color::Blue));

        mechs.apply(&Action::Shooter(ShooterAction::Run(0.2)));
        mechs.apply(&Action::Intake(IntakeAction::RunRollers(0.4)));
        mechs.proc(0.0, &mut NullTm, &mut leds).unwrap();

        assert_eq!(hw.shooter.borrow().flywheel.output, 0.2);
        assert_eq!(hw.intake.borrow().rollers.output, 0.4);

        assert!(!mechs.check(&Condition::NoteLoaded));
        hw.shooter.borrow_mut().note_beam_raw = false;
        hw.climb.borrow_mut().arms[0].limit = true;
        mechs.proc(0.02, &mut NullTm, &mut leds).unwrap();

        assert!(mechs.check(&Condition::NoteLoaded));
        assert!(mechs.check(&Condition::ArmAtLimit(Side::Left)));
        assert!(!mechs.check(&Condition::ArmsAtLimit));

        // The note notification reached the LEDs
        assert!(matches!(leds.current(), LedPattern::Blink { color: Color::Orange, .. }));
    }

    #[test]
    fn test_make_safe() {
        let (mut mechs, hw) = sim_mechs();
        let mut leds = LogLeds::new(LedPattern::Solid(Color::Blue));

        mechs.apply(&Action::Shooter(ShooterAction::Run(0.2)));
        mechs.climb.move_arm(Side::Right, comms_if::eqpt::climb::Direction::Raise, 0.5);
        mechs.proc(0.0, &mut NullTm, &mut leds).unwrap();

        mechs.make_safe();
        mechs.proc(0.02, &mut NullTm, &mut leds).unwrap();

        assert_eq!(hw.shooter.borrow().flywheel.output, 0.0);
        assert_eq!(hw.climb.borrow().arms[1].motor.output, 0.0);
        assert_eq!(hw.climb.borrow().arms[1].motor.stops, 1);
        assert_eq!(hw.intake.borrow().rollers.stops, 1);
    }

    #[test]
    fn test_make_safe_holds_intake_deployed() {
        let (mut mechs, hw) = sim_mechs();
        let mut leds = LogLeds::new(LedPattern::Solid(Color::Blue));

        mechs.proc(0.0, &mut NullTm, &mut leds).unwrap();
        mechs.apply(&Action::Intake(IntakeAction::SetAngle(IntakeAngle::Out)));
        mechs.proc(0.02, &mut NullTm, &mut leds).unwrap();
        assert!(hw.intake.borrow().angle_right.output < 0.0);

        mechs.make_safe();
        for n in 2..8 {
            let rpt = mechs.proc(n as f64 * 0.02, &mut NullTm, &mut leds).unwrap();
            assert_eq!(rpt.intake.pid_output, 0.0);
            assert_eq!(hw.intake.borrow().angle_right.output, 0.0);
            assert_eq!(hw.intake.borrow().angle_left.output, 0.0);
        }
        assert_eq!(hw.intake.borrow().angle_right.stops, 1);

        mechs.make_unsafe();
        mechs.proc(0.16, &mut NullTm, &mut leds).unwrap();
        assert!(hw.intake.borrow().angle_right.output < 0.0);
    }

    #[test]
    fn test_arm_default_drive() {
        let (mut mechs, hw) = sim_mechs();
        let mut task = ArmDefaultDrive::new(Side::Left);

        mechs.operator.climb_left = ArmDriveInput {
            raise_enable: false,
            raise_magnitude: 0.0,
            lower_enable: true,
            lower_magnitude: 0.25,
        };
        assert_eq!(task.exec(&mut mechs, 0.0), TaskStatus::Running);
        let (dems, _) = mechs.climb.proc(&climb::InputData::default()).unwrap();

        assert_eq!(dems.arm(Side::Left).motor, MotorDem::Speed(-0.25));
        assert_eq!(dems.arm(Side::Right).motor, MotorDem::Speed(0.0));
        assert_eq!(hw.climb.borrow().arms[0].motor.output, -0.25);
    }
}
