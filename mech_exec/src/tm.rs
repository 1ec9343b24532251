//! # Telemetry
//!
//! Mechanisms publish named values to a write-only [`TmSink`]. Nothing is ever read back.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt;

use log::warn;
use serde::Serialize;
use util::{archive::Archiver, session::Session};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

pub trait TmSink {
    fn publish(&mut self, name: &str, value: TmValue);
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TmValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Discards all telemetry.
pub struct NullTm;

/// Writes telemetry to a CSV archive in the session directory.
pub struct ArchiveTm {
    archiver: Archiver,
    time_s: f64,
    failed: bool,
}

#[derive(Serialize)]
struct TmRecord<'a> {
    time_s: f64,
    name: &'a str,
    value: String,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl fmt::Display for TmValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TmValue::Bool(b) => write!(f, "{}", b),
            TmValue::Number(n) => write!(f, "{}", n),
            TmValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl TmSink for NullTm {
    fn publish(&mut self, _name: &str, _value: TmValue) {}
}

impl ArchiveTm {
    /// Open the archive at `path`, relative to the session's archive directory.
    pub fn new(session: &Session, path: &str) -> Result<Self, util::archive::ArchiveError> {
        Ok(Self {
            archiver: Archiver::from_path(session, path)?,
            time_s: 0.0,
            failed: false,
        })
    }

    /// Set the timestamp of the records published from now on.
    pub fn set_time(&mut self, time_s: f64) {
        self.time_s = time_s;
    }
}

impl TmSink for ArchiveTm {
    fn publish(&mut self, name: &str, value: TmValue) {
        let record = TmRecord {
            time_s: self.time_s,
            name,
            value: value.to_string(),
        };

        if let Err(e) = self.archiver.serialise(record) {
            // Only report the first failure, the archive is usually broken for good
            if !self.failed {
                warn!("Could not archive telemetry: {}", e);
                self.failed = true;
            }
        }
    }
}
