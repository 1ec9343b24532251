//! # Mechanisms Software Utilities
//!
//! Support shared by the mechanisms executables: execution sessions and their archives, logging,
//! parameter files, telecommand scripts, and the [`module::State`] interface implemented by the
//! mechanism controllers.

pub mod archive;
pub mod host;
pub mod logger;
pub mod maths;
pub mod module;
pub mod params;
pub mod script_interpreter;
pub mod session;
pub mod time;
