//! Registry of named sequences

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;

use comms_if::{
    eqpt::{
        climb::{Direction, Side},
        shooter::Elevation,
    },
    tc::action::{Action, ClimbAction, Condition, IntakeAction, ShooterAction},
};
use serde::{Deserialize, Serialize};

use super::{Sequence, Step};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

pub const SCORE_IN_SPEAKER: &str = "Score_In_Speaker";
pub const LOAD_NOTE_FOR_AMP: &str = "Load_Note_For_Amp";
pub const STOP_SHOOTER_AND_INTAKE: &str = "Stop_Shooter_And_Intake";
pub const SET_ELEVATION_UP: &str = "Set_Elevation_Up";
pub const SET_ELEVATION_DOWN: &str = "Set_Elevation_Down";
pub const START_SHOOTING: &str = "Start_Shooting";
pub const STOP_SHOOTING: &str = "Stop_Shooting";
pub const TOGGLE_ELEVATION: &str = "Toggle_Elevation";
pub const EJECT_NOTE: &str = "Eject_Note";
pub const STOP_ROLLERS: &str = "Stop_Rollers";
pub const TOGGLE_INTAKE_ANGLE: &str = "Toggle_Intake_Angle";
pub const CLIMB_ARMS_UP: &str = "Climb_Arms_Up";
pub const TOGGLE_CLIMB_CONTROLS: &str = "Toggle_Climb_Controls";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Timings and speeds used by the named sequences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChoreoParams {
    /// Time for the flywheel to spin up before the note is fed in
    pub score_spin_up_s: f64,

    /// Time for the note to leave the shooter
    pub score_eject_s: f64,

    /// Roller speed pushing the note from the intake into the shooter
    pub load_roller_speed: f64,

    pub load_shooter_speed: f64,

    pub load_timeout_s: f64,

    /// Time for the note to settle into the shooter once detected
    pub load_settle_s: f64,

    pub climb_raise_speed: f64,

    pub climb_timeout_s: f64,
}

/// Named sequence templates.
pub struct Registry {
    templates: BTreeMap<String, Sequence>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ChoreoParams {
    fn default() -> Self {
        Self {
            score_spin_up_s: 0.75,
            score_eject_s: 0.75,
            load_roller_speed: -0.7,
            load_shooter_speed: 0.1,
            load_timeout_s: 1.0,
            load_settle_s: 0.045,
            climb_raise_speed: 0.5,
            climb_timeout_s: 5.0,
        }
    }
}

impl Registry {
    pub fn new(params: &ChoreoParams) -> Self {
        use Action::{Climb, Intake, Shooter};

        let stop_shooter_and_intake = vec![
            Shooter(ShooterAction::Stop),
            Intake(IntakeAction::StopRollers),
        ];
        let stop_arms = vec![
            Climb(ClimbAction::StopArm(Side::Left)),
            Climb(ClimbAction::StopArm(Side::Right)),
        ];

        let templates = vec![
            Sequence::new(SCORE_IN_SPEAKER)
                .then_do(Shooter(ShooterAction::StartShooting))
                .then_wait(params.score_spin_up_s)
                .then_do(Intake(IntakeAction::Eject))
                .then_wait(params.score_eject_s)
                .then_do(Shooter(ShooterAction::Stop))
                .then_do(Intake(IntakeAction::StopRollers))
                .on_cancel(stop_shooter_and_intake.clone()),
            Sequence::new(LOAD_NOTE_FOR_AMP)
                .then(Step::Parallel(vec![
                    Step::Do(Intake(IntakeAction::RunRollers(params.load_roller_speed))),
                    Step::Do(Shooter(ShooterAction::Run(params.load_shooter_speed))),
                ]))
                .then_wait_until(Condition::NoteLoaded, params.load_timeout_s)
                .then_wait(params.load_settle_s)
                .then_do(Shooter(ShooterAction::Stop))
                .then_do(Intake(IntakeAction::StopRollers))
                .on_cancel(stop_shooter_and_intake.clone()),
            Sequence::new(STOP_SHOOTER_AND_INTAKE)
                .then_do(Shooter(ShooterAction::Stop))
                .then_do(Intake(IntakeAction::StopRollers)),
            Sequence::new(SET_ELEVATION_UP)
                .then_do(Shooter(ShooterAction::SetElevation(Elevation::Up))),
            Sequence::new(SET_ELEVATION_DOWN)
                .then_do(Shooter(ShooterAction::SetElevation(Elevation::Down))),
            Sequence::new(START_SHOOTING).then_do(Shooter(ShooterAction::StartShooting)),
            Sequence::new(STOP_SHOOTING).then_do(Shooter(ShooterAction::Stop)),
            Sequence::new(TOGGLE_ELEVATION).then_do(Shooter(ShooterAction::ToggleElevation)),
            Sequence::new(EJECT_NOTE).then_do(Intake(IntakeAction::Eject)),
            Sequence::new(STOP_ROLLERS).then_do(Intake(IntakeAction::StopRollers)),
            Sequence::new(TOGGLE_INTAKE_ANGLE).then_do(Intake(IntakeAction::ToggleAngle)),
            Sequence::new(CLIMB_ARMS_UP)
                .then(Step::Parallel(
                    Side::ALL
                        .iter()
                        .flat_map(|&side| {
                            vec![
                                Step::Do(Climb(ClimbAction::SetClutch { side, engaged: false })),
                                Step::Do(Climb(ClimbAction::MoveArm {
                                    side,
                                    direction: Direction::Raise,
                                    speed: params.climb_raise_speed,
                                })),
                            ]
                        })
                        .collect(),
                ))
                .then_wait_until(Condition::ArmsAtLimit, params.climb_timeout_s)
                .then_do(stop_arms[0])
                .then_do(stop_arms[1])
                .on_cancel(stop_arms.clone()),
            Sequence::new(TOGGLE_CLIMB_CONTROLS).then_do(Climb(ClimbAction::ToggleControls)),
        ];

        Self {
            templates: templates
                .into_iter()
                .map(|s| (s.name().to_string(), s))
                .collect(),
        }
    }

    /// Build the sequence with the given name.
    pub fn build(&self, name: &str) -> Option<Sequence> {
        self.templates.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.keys().map(|k| k.as_str()).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        choreo::sequence::test::{exec_at, TraceSink},
        sched::{Reqs, Task, TaskStatus},
    };
    use comms_if::eqpt::MechId;

    /// Exactly representable cycle period, so that timings can be checked exactly
    const DT: f64 = 0.015625;

    fn registry() -> Registry {
        Registry::new(&ChoreoParams::default())
    }

    #[test]
    fn test_names() {
        let reg = registry();

        for name in [
            SCORE_IN_SPEAKER,
            LOAD_NOTE_FOR_AMP,
            STOP_SHOOTER_AND_INTAKE,
            SET_ELEVATION_UP,
            SET_ELEVATION_DOWN,
            START_SHOOTING,
            STOP_SHOOTING,
        ].iter() {
            assert!(reg.build(name).is_some(), "{} missing", name);
        }
        assert_eq!(reg.names().len(), 13);
        assert!(reg.build("Do_A_Backflip").is_none());
    }

    #[test]
    fn test_score_in_speaker_trace() {
        let seq = registry().build(SCORE_IN_SPEAKER).unwrap();
        assert_eq!(seq.reqs(), Reqs::of(&[MechId::Intake, MechId::Shooter]));

        let mut task = seq.instantiate();
        let mut sink = TraceSink::default();
        Task::<TraceSink>::init(&mut task, &mut sink, 0.0);

        let mut n = 0;
        while exec_at(&mut task, &mut sink, n as f64 * DT) == TaskStatus::Running {
            n += 1;
            assert!(n < 1000);
        }

        assert_eq!(
            sink.applied,
            vec![
                (0.0, Action::Shooter(ShooterAction::StartShooting)),
                (0.75, Action::Intake(IntakeAction::Eject)),
                (1.5, Action::Shooter(ShooterAction::Stop)),
                (1.5, Action::Intake(IntakeAction::StopRollers)),
            ]
        );
    }

    #[test]
    fn test_load_note_advances_on_detection() {
        let seq = registry().build(LOAD_NOTE_FOR_AMP).unwrap();
        let mut task = seq.instantiate();
        let mut sink = TraceSink::default();
        Task::<TraceSink>::init(&mut task, &mut sink, 0.0);

        assert_eq!(exec_at(&mut task, &mut sink, 0.0), TaskStatus::Running);
        assert_eq!(
            sink.applied,
            vec![
                (0.0, Action::Intake(IntakeAction::RunRollers(-0.7))),
                (0.0, Action::Shooter(ShooterAction::Run(0.1))),
            ]
        );

        for &t in &[0.1, 0.2] {
            assert_eq!(exec_at(&mut task, &mut sink, t), TaskStatus::Running);
        }

        // Detected well before the timeout, the settle time then runs from detection
        sink.note_loaded = true;
        assert_eq!(exec_at(&mut task, &mut sink, 0.3), TaskStatus::Running);
        assert_eq!(exec_at(&mut task, &mut sink, 0.34), TaskStatus::Running);
        assert_eq!(sink.applied.len(), 2);

        assert_eq!(exec_at(&mut task, &mut sink, 0.345), TaskStatus::Done);
        assert_eq!(
            &sink.applied[2..],
            &[
                (0.345, Action::Shooter(ShooterAction::Stop)),
                (0.345, Action::Intake(IntakeAction::StopRollers)),
            ]
        );
    }

    #[test]
    fn test_load_note_times_out() {
        let seq = registry().build(LOAD_NOTE_FOR_AMP).unwrap();
        let mut task = seq.instantiate();
        let mut sink = TraceSink::default();
        Task::<TraceSink>::init(&mut task, &mut sink, 0.0);

        let mut n = 0;
        while exec_at(&mut task, &mut sink, n as f64 * DT) == TaskStatus::Running {
            n += 1;
            assert!(n < 1000);
        }

        // Timeout then settle time, rounded up to the cycle
        let (t_stop, _) = sink.applied[2];
        assert!(t_stop >= 1.045 && t_stop < 1.045 + DT);
    }

    #[test]
    fn test_climb_reqs() {
        let seq = registry().build(CLIMB_ARMS_UP).unwrap();
        assert_eq!(seq.reqs(), Reqs::of(&[MechId::ClimbLeft, MechId::ClimbRight]));

        let seq = registry().build(TOGGLE_CLIMB_CONTROLS).unwrap();
        assert!(seq.reqs().is_empty());
    }
}
