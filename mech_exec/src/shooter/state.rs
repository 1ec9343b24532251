//! Implementations for the Shooter state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use comms_if::eqpt::{
    leds::{Color, LedCmd, LedPattern},
    shooter::{Elevation, ShooterDems, ShooterSens},
    MotorDem,
};
use log::{debug, trace, warn};
use serde::Serialize;

// Internal
use super::{note_loaded_from_raw, Params, ShooterError, ShooterIo};
use crate::{
    ctrl::{Edge, EdgeDetector},
    io::MechIo,
    tm::{TmSink, TmValue},
};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Shooter module state
pub struct Shooter {
    pub(crate) params: Params,

    io: ShooterIo,

    sens: ShooterSens,

    dems: ShooterDems,

    note_edge: EdgeDetector,
    elevation_edge: EdgeDetector,

    /// Notifications raised by operations since the last cycle
    pending_leds: Vec<LedCmd>,

    report: StatusReport,
}

pub struct InitData {
    pub params: Params,
    pub io: ShooterIo,
}

/// Input data to the Shooter.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    pub now_s: f64,
}

/// Output of the Shooter processing.
#[derive(Debug, Default, Clone)]
pub struct OutputData {
    /// Demands applied this cycle
    pub dems: ShooterDems,

    /// Notifications raised this cycle, in order
    pub led_cmds: Vec<LedCmd>,
}

/// Status report for Shooter processing.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct StatusReport {
    pub note_loaded: bool,

    /// A note arrived this cycle
    pub note_detected: bool,

    /// The guide demand is beyond the motor's range and will saturate
    pub guide_saturated: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for Shooter {
    type InitData = InitData;
    type InitError = ShooterError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ShooterError;

    fn init(init_data: Self::InitData) -> Result<Self, Self::InitError> {
        let params = init_data.params;

        if !(params.guide_speed_ratio > 0.0) {
            return Err(ShooterError::InvalidParams(format!(
                "guide_speed_ratio must be positive, got {}", params.guide_speed_ratio
            )));
        }

        Ok(Self {
            params,
            io: init_data.io,
            sens: ShooterSens::default(),
            dems: ShooterDems::default(),
            note_edge: EdgeDetector::new(false),
            elevation_edge: EdgeDetector::new(false),
            pending_leds: Vec::new(),
            report: StatusReport::default(),
        })
    }

    /// Perform cyclic processing of the Shooter.
    ///
    /// Reads the sensors, raises notifications on note and elevation changes and applies the
    /// demands.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.report = StatusReport::default();

        self.sens = self.io.read_sens();

        // Notifications from operations come first, then those from sensor changes
        let mut led_cmds: Vec<LedCmd> = self.pending_leds.drain(..).collect();

        let note_loaded = self.is_note_loaded();
        match self.note_edge.update(note_loaded) {
            Some(Edge::Rising) => {
                debug!("Note detected at {:.3} s", input_data.now_s);
                self.report.note_detected = true;
                led_cmds.push(LedCmd::Temporary(LedPattern::Blink {
                    color: Color::Orange,
                    interval_s: self.params.note_blink_interval_s,
                }));
            },
            Some(Edge::Falling) => {
                debug!("Note cleared at {:.3} s", input_data.now_s);
                led_cmds.push(LedCmd::RestorePersistent);
            },
            None => ()
        }

        match self.elevation_edge.update(self.sens.elevation == Elevation::Up) {
            Some(Edge::Rising) => {
                led_cmds.push(LedCmd::Temporary(LedPattern::Solid(Color::White)))
            },
            Some(Edge::Falling) => led_cmds.push(LedCmd::RestorePersistent),
            None => ()
        }

        self.report.note_loaded = note_loaded;
        self.report.guide_saturated = self.dems.guide.speed().abs() > 1.0;

        trace!("Shooter dems: {:?}", self.dems);

        let dems = self.dems;
        self.io.apply_dems(&mut self.dems);

        Ok((OutputData { dems, led_cmds }, self.report))
    }
}

impl Shooter {
    /// True while a note is interrupting the beam-break.
    pub fn is_note_loaded(&self) -> bool {
        note_loaded_from_raw(self.sens.note_beam_raw)
    }

    pub fn sens(&self) -> &ShooterSens {
        &self.sens
    }

    /// The elevation most recently commanded.
    pub fn elevation(&self) -> Elevation {
        self.dems.elevation
    }

    /// Run the flywheel at `speed` with the guide following at its ratio.
    pub fn run(&mut self, speed: f64) {
        let guide = speed * self.params.guide_speed_ratio;

        if guide.abs() > 1.0 {
            warn!(
                "Guide demand {:.2} (flywheel {:.2}) is beyond the motor's range and will saturate",
                guide,
                speed
            );
        }

        self.dems.flywheel = MotorDem::Speed(speed);
        self.dems.guide = MotorDem::Speed(guide);
    }

    /// Run the guide wheel alone.
    pub fn run_guide(&mut self, speed: f64) {
        self.dems.guide = MotorDem::Speed(speed);
    }

    /// Stop both motors and clear any notification.
    pub fn stop(&mut self) {
        self.dems.flywheel = MotorDem::Stop;
        self.dems.guide = MotorDem::Stop;
        self.pending_leds.push(LedCmd::RestorePersistent);
    }

    /// Spin up to shooting speed and show the shooting notification.
    pub fn start_shooting(&mut self) {
        self.run(self.params.shoot_speed);
        self.pending_leds.push(LedCmd::Temporary(LedPattern::Chase {
            color: Color::Green,
            interval_s: self.params.shoot_chase_interval_s,
            reversed: self.is_note_loaded(),
        }));
    }

    pub fn set_elevation(&mut self, elevation: Elevation) {
        if elevation != self.dems.elevation {
            debug!("Shooter elevation {:?}", elevation);
        }
        self.dems.elevation = elevation;
    }

    /// Command the opposite of the current elevation.
    pub fn toggle_elevation(&mut self) {
        self.set_elevation(self.dems.elevation.toggled());
    }

    pub fn publish_tm(&self, tm: &mut dyn TmSink) {
        tm.publish("shooter/flywheel_out", TmValue::Number(self.sens.flywheel_out));
        tm.publish("shooter/guide_out", TmValue::Number(self.sens.guide_out));
        tm.publish("shooter/note_detected", TmValue::Bool(self.is_note_loaded()));
        tm.publish(
            "shooter/elevation",
            TmValue::Text(format!("{:?}", self.sens.elevation))
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shooter::{SimShooter, SimShooterHw};
    use std::{cell::RefCell, rc::Rc};

    fn sim_shooter() -> (Shooter, Rc<RefCell<SimShooterHw>>) {
        let sim = SimShooter::new();
        let hw = sim.handle();
        let shooter = Shooter::init(InitData {
            params: Params::default(),
            io: ShooterIo::Sim(sim),
        }).unwrap();

        (shooter, hw)
    }

    fn step(shooter: &mut Shooter) -> OutputData {
        shooter.proc(&InputData::default()).unwrap().0
    }

    #[test]
    fn test_note_loaded_is_inverted_raw() {
        assert!(note_loaded_from_raw(false));
        assert!(!note_loaded_from_raw(true));

        let (mut shooter, hw) = sim_shooter();
        for &raw in &[true, false, false, true] {
            hw.borrow_mut().note_beam_raw = raw;
            step(&mut shooter);
            assert_eq!(shooter.is_note_loaded(), !raw);
        }
    }

    #[test]
    fn test_run_and_stop() {
        let (mut shooter, hw) = sim_shooter();

        shooter.run(0.1);
        let out = step(&mut shooter);
        assert_eq!(out.dems.flywheel, MotorDem::Speed(0.1));
        assert!((out.dems.guide.speed() - 0.3).abs() < 1e-12);

        // The guide demand is not clamped, only the motor saturates
        shooter.run(1.0);
        let out = step(&mut shooter);
        assert_eq!(out.dems.guide, MotorDem::Speed(3.0));
        assert_eq!(hw.borrow().guide.output, 1.0);

        for &speed in &[1.0, -0.4, 0.0] {
            shooter.run(speed);
            step(&mut shooter);
            shooter.stop();
            let out = step(&mut shooter);

            assert_eq!(out.dems.flywheel.speed(), 0.0);
            assert_eq!(out.dems.guide.speed(), 0.0);
            assert_eq!(out.led_cmds, vec![LedCmd::RestorePersistent]);
            assert_eq!(hw.borrow().flywheel.output, 0.0);
            assert_eq!(hw.borrow().guide.output, 0.0);
        }
    }

    #[test]
    fn test_note_notifications() {
        let (mut shooter, hw) = sim_shooter();
        assert!(step(&mut shooter).led_cmds.is_empty());

        hw.borrow_mut().note_beam_raw = false;
        let out = step(&mut shooter);
        assert_eq!(
            out.led_cmds,
            vec![LedCmd::Temporary(LedPattern::Blink { color: Color::Orange, interval_s: 0.2 })]
        );

        // Only once per arrival
        assert!(step(&mut shooter).led_cmds.is_empty());

        hw.borrow_mut().note_beam_raw = true;
        assert_eq!(step(&mut shooter).led_cmds, vec![LedCmd::RestorePersistent]);
    }

    #[test]
    fn test_elevation_toggle_two_cycle() {
        for &start in &[Elevation::Down, Elevation::Up] {
            let (mut shooter, _) = sim_shooter();
            shooter.set_elevation(start);

            for n in 1..=5 {
                shooter.toggle_elevation();
                let expected = if n % 2 == 0 { start } else { start.toggled() };
                assert_eq!(shooter.elevation(), expected);
            }
        }
    }

    #[test]
    fn test_elevation_notifications() {
        let (mut shooter, hw) = sim_shooter();

        shooter.set_elevation(Elevation::Up);
        step(&mut shooter);
        assert_eq!(hw.borrow().elevation, Elevation::Up);

        // The raised position is seen on the next read
        assert_eq!(
            step(&mut shooter).led_cmds,
            vec![LedCmd::Temporary(LedPattern::Solid(Color::White))]
        );

        shooter.toggle_elevation();
        step(&mut shooter);
        assert_eq!(step(&mut shooter).led_cmds, vec![LedCmd::RestorePersistent]);
    }

    #[test]
    fn test_start_shooting() {
        let (mut shooter, hw) = sim_shooter();
        hw.borrow_mut().note_beam_raw = false;
        step(&mut shooter);

        shooter.start_shooting();
        let out = step(&mut shooter);
        assert_eq!(out.dems.flywheel, MotorDem::Speed(1.0));
        assert_eq!(
            out.led_cmds,
            vec![LedCmd::Temporary(LedPattern::Chase {
                color: Color::Green,
                interval_s: 0.25,
                reversed: true
            })]
        );
    }
}
