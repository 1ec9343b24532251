//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::{eqpt::climb::Side, tc::action::Action};
use log::{info, warn};

use crate::{
    choreo::{Registry, Sequence, SeqTask},
    leds::LedSink,
    mechs::{ArmDefaultDrive, Mechanisms, MechsError, MechsReport},
    sched::{Scheduler, Task},
    tm::TmSink,
};

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

/// Gives the reason the mechanisms have been put into safe mode
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum SafeModeCause {
    MakeSafeTc,
    EndOfScript,
}

#[derive(Debug, thiserror::Error)]
pub enum InvokeError {
    #[error("No named operation called \"{0}\"")]
    UnknownOperation(String),

    #[error("Cannot start \"{0}\" while in safe mode")]
    Safe(String),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    // Safe mode variables
    /// Determines if the mechanisms are in safe mode.
    pub safe: bool,

    /// Gives the reason for the mechanisms being in safe mode.
    pub safe_cause: Option<SafeModeCause>,

    // Control
    pub mechs: Mechanisms,
    pub mechs_rpt: MechsReport,
    pub sched: Scheduler<Mechanisms>,
    pub registry: Registry,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Create the data store around the given mechanisms, with the climb arms' default tasks
    /// installed.
    pub fn new(mechs: Mechanisms, registry: Registry) -> Self {
        let mut sched: Scheduler<Mechanisms> = Scheduler::new();

        for &side in Side::ALL.iter() {
            sched.set_default(side.mech_id(), move || {
                Box::new(ArmDefaultDrive::new(side)) as Box<dyn Task<Mechanisms>>
            });
        }

        Self {
            num_cycles: 0,
            is_1_hz_cycle: false,
            safe: false,
            safe_cause: None,
            mechs,
            mechs_rpt: MechsReport::default(),
            sched,
            registry,
            num_consec_cycle_overruns: 0,
        }
    }

    /// Puts the mechanisms into safe mode with the given cause.
    ///
    /// Every task is cancelled and every motor stopped.
    pub fn make_safe(&mut self, cause: SafeModeCause, now_s: f64) {
        if !self.safe {
            warn!("Make safe requested, cause: {:?}", cause);
            self.safe = true;
            self.safe_cause = Some(cause);

            self.sched.cancel_all(&mut self.mechs, now_s);
            self.mechs.make_safe();
        }
    }

    /// Attempts to disable the safe mode by clearing the given cause.
    ///
    /// Returns `Ok(())` if this cause was cleared and safe mode was disabled, or `Err(())`
    /// otherwise. To remove safe mode the provided cause must match the initial reason for safe
    /// mode being enabled.
    ///
    /// If safe mode was not enabled `Ok(())` is returned
    pub fn make_unsafe(&mut self, cause: SafeModeCause) -> Result<(), ()> {
        if !self.safe {
            return Ok(());
        }

        match self.safe_cause {
            Some(root_cause) if cause != root_cause => Err(()),
            _ => {
                self.safe = false;
                self.safe_cause = None;
                self.mechs.make_unsafe();
                info!("Make unsafe requested, root cause match, safe mode disabled");
                Ok(())
            }
        }
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Sets the 1Hz cycle flag.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        let cycles_per_s = (cycle_frequency_hz.round() as u128).max(1);
        self.is_1_hz_cycle = self.num_cycles % cycles_per_s == 0;
    }

    /// Run one control cycle: the mechanisms themselves, then the scheduled tasks.
    ///
    /// Tasks see this cycle's sensor readings, their demands are applied on the next cycle. Tasks
    /// are not run in safe mode, so the arms' default drive is inactive as well.
    pub fn step(
        &mut self,
        now_s: f64,
        tm: &mut dyn TmSink,
        leds: &mut dyn LedSink,
    ) -> Result<(), MechsError> {
        self.mechs_rpt = self.mechs.proc(now_s, tm, leds)?;

        if !self.safe {
            self.sched.step(&mut self.mechs, now_s);
        }

        Ok(())
    }

    /// Start the named operation.
    pub fn invoke(&mut self, name: &str) -> Result<(), InvokeError> {
        let seq = self
            .registry
            .build(name)
            .ok_or_else(|| InvokeError::UnknownOperation(name.to_string()))?;

        self.schedule_seq(&seq)
    }

    /// Start a single action as a one-step task, so that it interrupts whatever owns the
    /// mechanisms it drives.
    pub fn invoke_action(&mut self, action: Action) -> Result<(), InvokeError> {
        let name = format!("{:?}", action);
        let seq = Sequence::new(&name).then_do(action);

        self.schedule_seq(&seq)
    }

    fn schedule_seq(&mut self, seq: &Sequence) -> Result<(), InvokeError> {
        if self.safe {
            return Err(InvokeError::Safe(seq.name().to_string()));
        }

        let task: SeqTask = seq.instantiate();
        self.sched.schedule(Box::new(task));

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        choreo::{ChoreoParams, LOAD_NOTE_FOR_AMP, SCORE_IN_SPEAKER, TOGGLE_INTAKE_ANGLE},
        leds::LogLeds,
        mechs::test::sim_mechs,
        tm::NullTm,
    };
    use comms_if::{
        eqpt::leds::{Color, LedPattern},
        tc::{action::ShooterAction, operator::ArmDriveInput},
    };

    const DT: f64 = 0.015625;

    fn sim_ds() -> (DataStore, crate::mechs::test::SimHw) {
        let (mechs, hw) = sim_mechs();
        (DataStore::new(mechs, Registry::new(&ChoreoParams::default())), hw)
    }

    fn run(ds: &mut DataStore, leds: &mut LogLeds, from: usize, to: usize) {
        for n in from..to {
            ds.step(n as f64 * DT, &mut NullTm, leds).unwrap();
        }
    }

    #[test]
    fn test_score_in_speaker() {
        let (mut ds, hw) = sim_ds();
        let mut leds = LogLeds::new(LedPattern::Solid(Color::Blue));

        ds.invoke(SCORE_IN_SPEAKER).unwrap();
        run(&mut ds, &mut leds, 0, 10);
        assert!(ds.sched.is_running(SCORE_IN_SPEAKER));
        assert_eq!(hw.shooter.borrow().flywheel.output, 1.0);
        assert_eq!(hw.intake.borrow().rollers.output, 0.0);

        // Fed in after the spin up
        run(&mut ds, &mut leds, 10, 50);
        assert_eq!(hw.intake.borrow().rollers.output, -0.7);

        run(&mut ds, &mut leds, 50, 100);
        assert!(!ds.sched.is_running(SCORE_IN_SPEAKER));
        assert_eq!(hw.shooter.borrow().flywheel.output, 0.0);
        assert_eq!(hw.intake.borrow().rollers.output, 0.0);
    }

    #[test]
    fn test_conflict_cancels_with_cleanup() {
        let (mut ds, hw) = sim_ds();
        let mut leds = LogLeds::new(LedPattern::Solid(Color::Blue));

        ds.invoke(LOAD_NOTE_FOR_AMP).unwrap();
        run(&mut ds, &mut leds, 0, 5);
        assert_eq!(hw.intake.borrow().rollers.output, -0.7);

        // Needs the shooter, so the load is interrupted and cleans up the intake
        ds.invoke_action(Action::Shooter(ShooterAction::SetElevation(
            comms_if::eqpt::shooter::Elevation::Up,
        ))).unwrap();
        run(&mut ds, &mut leds, 5, 7);

        assert!(!ds.sched.is_running(LOAD_NOTE_FOR_AMP));
        assert_eq!(hw.intake.borrow().rollers.output, 0.0);
        assert_eq!(hw.shooter.borrow().flywheel.output, 0.0);
        assert_eq!(hw.shooter.borrow().elevation, comms_if::eqpt::shooter::Elevation::Up);
    }

    #[test]
    fn test_safe_mode() {
        let (mut ds, hw) = sim_ds();
        let mut leds = LogLeds::new(LedPattern::Solid(Color::Blue));

        ds.mechs.operator.climb_right = ArmDriveInput {
            raise_enable: true,
            raise_magnitude: 0.5,
            ..Default::default()
        };
        ds.invoke(SCORE_IN_SPEAKER).unwrap();
        run(&mut ds, &mut leds, 0, 2);
        assert_eq!(hw.climb.borrow().arms[1].motor.output, 0.5);

        ds.make_safe(SafeModeCause::MakeSafeTc, 2.0 * DT);
        run(&mut ds, &mut leds, 2, 4);

        assert!(ds.sched.running_names().is_empty());
        assert_eq!(hw.climb.borrow().arms[1].motor.output, 0.0);
        assert_eq!(hw.shooter.borrow().flywheel.output, 0.0);
        assert!(matches!(ds.invoke(SCORE_IN_SPEAKER), Err(InvokeError::Safe(_))));

        // Only the cause that made it safe can clear it
        assert!(ds.make_unsafe(SafeModeCause::EndOfScript).is_err());
        assert!(ds.make_unsafe(SafeModeCause::MakeSafeTc).is_ok());

        // The default drive resumes
        run(&mut ds, &mut leds, 4, 6);
        assert_eq!(hw.climb.borrow().arms[1].motor.output, 0.5);
    }

    #[test]
    fn test_safe_mode_holds_intake_angle() {
        let (mut ds, hw) = sim_ds();
        let mut leds = LogLeds::new(LedPattern::Solid(Color::Blue));

        // Deploy the intake and let the angle loop start driving
        ds.invoke(TOGGLE_INTAKE_ANGLE).unwrap();
        run(&mut ds, &mut leds, 0, 3);
        assert!(hw.intake.borrow().angle_right.output < 0.0);

        ds.make_safe(SafeModeCause::MakeSafeTc, 3.0 * DT);
        for n in 3..13 {
            ds.step(n as f64 * DT, &mut NullTm, &mut leds).unwrap();
            assert_eq!(hw.intake.borrow().angle_right.output, 0.0);
            assert_eq!(hw.intake.borrow().angle_left.output, 0.0);
        }

        // The loop resumes once safe mode is cleared
        ds.make_unsafe(SafeModeCause::MakeSafeTc).unwrap();
        run(&mut ds, &mut leds, 13, 15);
        assert!(hw.intake.borrow().angle_right.output < 0.0);
    }

    #[test]
    fn test_load_note_sees_same_cycle_detection() {
        // 50 Hz, the note arrives just before the cycle at 0.3 s
        const DT_50HZ: f64 = 0.02;

        let (mut ds, hw) = sim_ds();
        let mut leds = LogLeds::new(LedPattern::Solid(Color::Blue));
        let mut step_at = |ds: &mut DataStore, n: usize| {
            ds.step(n as f64 * DT_50HZ, &mut NullTm, &mut leds).unwrap();
        };

        ds.invoke(LOAD_NOTE_FOR_AMP).unwrap();
        for n in 0..15 {
            step_at(&mut ds, n);
        }
        assert_eq!(hw.intake.borrow().rollers.output, -0.7);

        hw.shooter.borrow_mut().note_beam_raw = false;

        // Settles for 0.045 s from detection at 0.3 s, so it finishes on the 0.36 s cycle
        for n in 15..18 {
            step_at(&mut ds, n);
            assert!(ds.sched.is_running(LOAD_NOTE_FOR_AMP), "stopped early at cycle {}", n);
        }
        step_at(&mut ds, 18);
        assert!(!ds.sched.is_running(LOAD_NOTE_FOR_AMP));

        // Demands from the 0.36 s cycle reach the motors on the next one
        assert_eq!(hw.intake.borrow().rollers.output, -0.7);
        step_at(&mut ds, 19);
        assert_eq!(hw.intake.borrow().rollers.output, 0.0);
        assert_eq!(hw.shooter.borrow().flywheel.output, 0.0);
    }

    #[test]
    fn test_unknown_operation() {
        let (mut ds, _) = sim_ds();
        assert!(matches!(ds.invoke("Nope"), Err(InvokeError::UnknownOperation(_))));
    }
}
