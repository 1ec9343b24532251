//! # Telecommand processor module
//!
//! The telecommand processor handles the TCs coming from the script or the operator.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};

// Internal
use comms_if::tc::Tc;
use mech_lib::data_store::{DataStore, SafeModeCause};

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute a telecommand.
///
/// Mutates the datastore to start operations or update the operator input.
pub(crate) fn exec(ds: &mut DataStore, tc: &Tc, now_s: f64) {

    // Handle different Tcs
    match tc {
        Tc::Heartbeat => (),
        Tc::MakeSafe => {
            debug!("Recieved MakeSafe command");
            ds.make_safe(SafeModeCause::MakeSafeTc, now_s);
        },
        Tc::MakeUnsafe => {
            debug!("Recieved MakeUnsafe command");
            if ds.make_unsafe(SafeModeCause::MakeSafeTc).is_err() {
                warn!("Cannot clear safe mode, cause: {:?}", ds.safe_cause);
            }
        },
        Tc::NamedOp(name) => {
            if let Err(e) = ds.invoke(name) {
                warn!("Could not start operation: {}", e);
            }
        },
        Tc::Action(a) => {
            if let Err(e) = ds.invoke_action(*a) {
                warn!("Could not start action: {}", e);
            }
        },
        Tc::Operator(input) => {
            ds.mechs.operator = *input;
        },
        Tc::CancelAll => {
            debug!("Recieved CancelAll command");
            ds.sched.cancel_all(&mut ds.mechs, now_s);
        }
    }

}

#[cfg(test)]
mod test {
    use super::*;
    use mech_lib::{
        choreo::{ChoreoParams, Registry},
        climb::{self, ClimbIo, SimClimb},
        intake::{self, IntakeIo, SimIntake},
        mechs::Mechanisms,
        shooter::{self, ShooterIo, SimShooter},
    };

    fn sim_ds() -> DataStore {
        let mechs = Mechanisms::init(
            intake::InitData { params: Default::default(), io: IntakeIo::Sim(SimIntake::new(0.0)) },
            shooter::InitData { params: Default::default(), io: ShooterIo::Sim(SimShooter::new()) },
            climb::InitData { params: Default::default(), io: ClimbIo::Sim(SimClimb::new()) },
        ).unwrap();

        DataStore::new(mechs, Registry::new(&ChoreoParams::default()))
    }

    fn exec_json(ds: &mut DataStore, json: &str) {
        exec(ds, &Tc::from_json(json).unwrap(), 0.0);
    }

    #[test]
    fn test_safe_mode_tcs() {
        let mut ds = sim_ds();

        exec_json(&mut ds, r#"{"type": "MAKE_SAFE"}"#);
        assert!(ds.safe);

        // Operations are rejected while safe
        exec_json(&mut ds, r#"{"type": "NAMED_OP", "payload": "Score_In_Speaker"}"#);
        ds.sched.step(&mut ds.mechs, 0.0);
        assert!(ds.sched.running_names().is_empty());

        exec_json(&mut ds, r#"{"type": "MAKE_UNSAFE"}"#);
        assert!(!ds.safe);

        exec_json(&mut ds, r#"{"type": "NAMED_OP", "payload": "Score_In_Speaker"}"#);
        ds.sched.step(&mut ds.mechs, 0.0);
        assert!(ds.sched.is_running("Score_In_Speaker"));

        exec_json(&mut ds, r#"{"type": "CANCEL_ALL"}"#);
        assert!(!ds.sched.is_running("Score_In_Speaker"));
    }

    #[test]
    fn test_operator_tc() {
        let mut ds = sim_ds();

        exec_json(
            &mut ds,
            r#"{"type": "OPERATOR", "payload": {"climb_left": {"raise_enable": true, "raise_magnitude": 0.5}}}"#
        );

        assert!(ds.mechs.operator.climb_left.raise_enable);
        assert_eq!(ds.mechs.operator.climb_left.drive(), 0.5);
        assert!(!ds.mechs.operator.intake_toggle);
    }
}
