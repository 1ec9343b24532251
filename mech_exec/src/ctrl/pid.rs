//! # PID controller
//!
//! This module provides the PID controller used to hold mechanism positions.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};

// Internal
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Gains of a PID controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain
    pub k_p: f64,

    /// Integral gain
    pub k_i: f64,

    /// Dervative gain
    pub k_d: f64,
}

/// A PID controller
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    gains: PidGains,

    /// Optional (min, max) limits on the output
    output_limits: Option<(f64, f64)>,

    /// Previous time that the error was passed in
    prev_time_s: Option<f64>,

    /// Previous error
    prev_error: Option<f64>,

    /// The integral accumulation
    integral: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains.
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            output_limits: None,
            integral: 0f64,
            prev_time_s: None,
            prev_error: None
        }
    }

    /// Limit the output of the controller to the given range.
    pub fn with_output_limits(mut self, min: f64, max: f64) -> Self {
        self.output_limits = Some((min, max));
        self
    }

    /// Get the value of the controller for the given error at time `now_s`.
    pub fn get(&mut self, error: f64, now_s: f64) -> f64 {

        // Calculate dt, ignoring repeated or backwards timestamps
        let dt = match self.prev_time_s {
            Some(t0) if now_s > t0 => Some(now_s - t0),
            _ => None
        };

        // Accumulate the integral term.
        //
        // If there's no time difference then we don't accumulate the integral,
        // adding the raw error would produce a large spike.
        self.integral += match dt {
            Some(t) => error * t,
            None => 0f64
        };

        // Calculate the derivative, again assuming none without a time
        // difference.
        let deriv = match (self.prev_error, dt) {
            (Some(e), Some(t)) => (error - e) / t,
            _ => 0f64
        };

        // Calculate the output
        let mut out =
            self.gains.k_p * error
            + self.gains.k_i * self.integral
            + self.gains.k_d * deriv;

        if let Some((min, max)) = self.output_limits {
            out = clamp(&out, &min, &max);
        }

        // Remember the previous error and time
        self.prev_error = Some(error);
        self.prev_time_s = Some(now_s);

        out
    }

    /// Calculate the output driving `measurement` towards `setpoint`.
    pub fn calculate(&mut self, measurement: f64, setpoint: f64, now_s: f64) -> f64 {
        self.get(setpoint - measurement, now_s)
    }

    /// Clear the accumulated integral and history.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
        self.prev_time_s = None;
    }

    pub fn gains(&self) -> &PidGains {
        &self.gains
    }
}
