//! # Mechanisms Control Executable
//!
//! This executable controls the end-effector mechanisms of the robot:
//! - The intake (rollers and pivot)
//! - The shooter (flywheel, guide wheel and elevation)
//! - The climber (two independent arms)
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, parameters and mechanisms
//!     - Main loop, at the cycle period:
//!         - Telecommand processing, from a script
//!         - Mechanism processing: sensors read, control, demands applied
//!         - Telemetry archiving
//!         - Scheduler processing, advancing any running operations on this cycle's sensor
//!           readings. Their demands are applied on the next cycle.
//!
//! Without the `--sim` flag the mechanisms are driven through the hardware backend. If the
//! backend can't be opened the mechanisms stay inert and the executable runs anyway.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod tc_processor;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};
use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};
use structopt::StructOpt;

// Internal
use mech_lib::{
    choreo::Registry,
    climb::{self, ClimbIo, PhysClimb, SimClimb},
    data_store::{DataStore, SafeModeCause},
    hw::{self, HwBackend},
    intake::{self, IntakeIo, PhysIntake, SimIntake},
    leds::LogLeds,
    mechs::Mechanisms,
    params::MechExecParams,
    shooter::{self, PhysShooter, ShooterIo, SimShooter},
    tm::ArchiveTm,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    script_interpreter::{PendingTcs, ScriptInterpreter},
    session::{self, Session},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Mechanisms control executable
#[derive(Debug, StructOpt)]
#[structopt(name = "mech_exec")]
struct Args {
    /// Drive the simulated mechanisms instead of the hardware
    #[structopt(long)]
    sim: bool,

    /// Stop after this many cycles
    #[structopt(long)]
    cycles: Option<u128>,

    /// Telecommand script to execute. The mechanisms are made safe once it ends.
    #[structopt(parse(from_os_str))]
    script: Option<PathBuf>,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "mech_exec",
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Mechanisms Control Executable\n");
    info!("Running on: {}", host::get_target());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: MechExecParams = util::params::load_or_default("mech_exec.toml");
    let intake_params: intake::Params = util::params::load_or_default("intake.toml");
    let shooter_params: shooter::Params = util::params::load_or_default("shooter.toml");
    let climb_params: climb::Params = util::params::load_or_default("climb.toml");

    session.save("params/mech_exec.json", exec_params.clone());
    session.save("params/intake.json", intake_params.clone());
    session.save("params/shooter.json", shooter_params.clone());
    session.save("params/climb.json", climb_params.clone());

    info!("Exec parameters loaded");

    // ---- INITIALISE TC SOURCE ----

    let mut script = match args.script {
        Some(ref path) => {
            info!("Loading script from {:?}", path);

            let si = ScriptInterpreter::new(path).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} TCs\n",
                si.get_duration(),
                si.get_num_tcs()
            );

            Some(si)
        }
        None => {
            info!("No script provided, the mechanisms will only follow their default tasks\n");
            None
        }
    };

    // ---- INITIALISE MECHANISMS ----

    info!("Initialising mechanisms...");

    let (intake_io, shooter_io, climb_io) = if args.sim {
        info!("Using simulated mechanisms");
        (
            IntakeIo::Sim(SimIntake::new(exec_params.sim_intake_start_pos)),
            ShooterIo::Sim(SimShooter::new()),
            ClimbIo::Sim(SimClimb::new()),
        )
    } else {
        let mut backend = match hw::open_backend(&exec_params.hw) {
            Ok(b) => Some(b),
            Err(e) => {
                warn!("Hardware backend unavailable, mechanisms will be inert: {}", e);
                None
            }
        };

        (
            IntakeIo::Phys(PhysIntake::open(borrow_backend(&mut backend), &exec_params.intake_hw)),
            ShooterIo::Phys(PhysShooter::open(
                borrow_backend(&mut backend),
                &exec_params.shooter_hw
            )),
            ClimbIo::Phys(PhysClimb::open(borrow_backend(&mut backend), &exec_params.climb_hw)),
        )
    };

    let mechs = Mechanisms::init(
        intake::InitData { params: intake_params, io: intake_io },
        shooter::InitData { params: shooter_params, io: shooter_io },
        climb::InitData { params: climb_params, io: climb_io },
    ).wrap_err("Failed to initialise the mechanisms")?;

    let registry = Registry::new(&exec_params.choreo);
    info!("Named operations: {:?}", registry.names());

    let mut ds = DataStore::new(mechs, registry);

    let mut tm = ArchiveTm::new(&session, "tm.csv")
        .wrap_err("Failed to open the telemetry archive")?;
    let mut leds = LogLeds::new(exec_params.persistent_leds);

    info!("Mechanism initialisation complete\n");

    // ---- MAIN LOOP ----

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);

    info!("Begining main loop\n");

    loop {

        // Get cycle start time
        let cycle_start_instant = Instant::now();
        let now_s = session::get_elapsed_seconds();

        ds.cycle_start(exec_params.cycle_frequency_hz());

        // ---- TELECOMMAND PROCESSING ----

        if let Some(ref mut si) = script {
            match si.get_pending_tcs(now_s) {
                PendingTcs::None => (),
                PendingTcs::Some(tcs) => {
                    for tc in tcs.iter() {
                        tc_processor::exec(&mut ds, tc, now_s);
                    }
                }
                PendingTcs::EndOfScript => {
                    info!("End of TC script reached, stopping");
                    ds.make_safe(SafeModeCause::EndOfScript, now_s);
                    break;
                }
            }
        }

        // ---- CONTROL PROCESSING ----

        tm.set_time(now_s);
        if let Err(e) = ds.step(now_s, &mut tm, &mut leds) {
            warn!("Error during mechanism processing: {}", e);
        }

        if ds.is_1_hz_cycle {
            info!("Running: {:?}", ds.sched.running_names());
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            },
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        ds.num_cycles += 1;

        if let Some(max) = args.cycles {
            if ds.num_cycles >= max {
                info!("{} cycles executed, stopping", max);
                ds.make_safe(SafeModeCause::EndOfScript, session::get_elapsed_seconds());
                break;
            }
        }
    }

    // Apply the final stop demands
    let now_s = session::get_elapsed_seconds();
    if let Err(e) = ds.step(now_s, &mut tm, &mut leds) {
        warn!("Error applying the final demands: {}", e);
    }

    // ---- SHUTDOWN ----

    info!("End of execution");

    session.exit();

    Ok(())
}

/// Reborrow the optional backend for one binding to open its devices from.
fn borrow_backend(backend: &mut Option<Box<dyn HwBackend>>) -> Option<&mut dyn HwBackend> {
    match backend {
        Some(b) => Some(b.as_mut()),
        None => None,
    }
}
