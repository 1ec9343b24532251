//! # Logger
//!
//! Log lines go to the terminal, with coloured level tags, and to the session's log file as plain
//! text. Every line carries the seconds elapsed since the session started:
//!
//! ```text
//! [  1.234567 INF] Named operations: [...]
//! [  1.254567 DBG] mech_lib::intake::state: Intake toggled out
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::Colorize;
use log::{info, Level};
use thiserror::Error;

// Internal imports
use crate::session::{self, Session};

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Modules logged at a coarser level than the rest, their per-cycle traces flood the output.
const QUIET_MODULES: &[(&str, LevelFilter)] = &[
    ("mech_lib::sched", LevelFilter::Debug),
    ("mech_lib::choreo", LevelFilter::Debug),
];

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Could not open the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("A logger has already been installed: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
///
/// Only one logger may be installed per process, a second call returns
/// [`LoggerInitError::FernInitError`].
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    let log_file = fern::log_file(&session.log_file_path)
        .map_err(LoggerInitError::LogFileInitError)?;

    let mut dispatch = fern::Dispatch::new().level(min_level);
    for (module, level) in QUIET_MODULES.iter() {
        dispatch = dispatch.level_for(*module, (*level).min(min_level));
    }

    dispatch
        .chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{}",
                        format_line(record.level(), record.target(), message, true)
                    ))
                })
                .chain(std::io::stdout()),
        )
        .chain(
            fern::Dispatch::new()
                .format(|out, message, record| {
                    out.finish(format_args!(
                        "{}",
                        format_line(record.level(), record.target(), message, false)
                    ))
                })
                .chain(log_file),
        )
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Format a single log line. Debug and trace lines include the target module.
fn format_line(
    level: Level,
    target: &str,
    message: &std::fmt::Arguments,
    coloured: bool,
) -> String {
    let tag = level_tag(level, coloured);
    let elapsed = session::get_elapsed_seconds();

    if level > Level::Info {
        format!("[{:10.6} {}] {}: {}", elapsed, tag, target, message)
    } else {
        format!("[{:10.6} {}] {}", elapsed, tag, message)
    }
}

/// Three letter tag of a log level
fn level_tag(level: Level, coloured: bool) -> String {
    let tag = match level {
        Level::Trace => "TRC",
        Level::Debug => "DBG",
        Level::Info => "INF",
        Level::Warn => "WRN",
        Level::Error => "ERR",
    };

    if !coloured {
        return tag.to_string();
    }

    match level {
        Level::Trace => tag.dimmed().italic(),
        Level::Debug => tag.dimmed(),
        Level::Info => tag.normal(),
        Level::Warn => tag.yellow(),
        Level::Error => tag.red().bold(),
    }
    .to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_target_only_below_info() {
        let info = format_line(Level::Info, "mech_lib::mechs", &format_args!("hello"), false);
        assert!(info.ends_with("INF] hello"), "{}", info);

        let debug = format_line(Level::Debug, "mech_lib::mechs", &format_args!("hello"), false);
        assert!(debug.ends_with("DBG] mech_lib::mechs: hello"), "{}", debug);
    }

    #[test]
    fn test_plain_tags() {
        assert_eq!(level_tag(Level::Warn, false), "WRN");

        for level in [Level::Trace, Level::Debug, Level::Info, Level::Warn, Level::Error].iter() {
            assert!(!level_tag(*level, false).contains('\u{1b}'));
        }
    }
}
