//! # Debounce filter

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Stabilises a noisy boolean signal.
///
/// The output only changes once the raw input has held a new value for at least `hold_s`
/// seconds. The filter is symmetric, rising and falling transitions are treated identically.
#[derive(Debug, Clone)]
pub struct Debouncer {
    hold_s: f64,

    /// Current debounced value
    stable: bool,

    /// Raw value seen on the last update
    raw_last: bool,

    /// Time at which the raw value last changed
    since_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Debouncer {
    /// Create a new filter whose output starts at `initial`.
    pub fn new(hold_s: f64, initial: bool) -> Self {
        Self {
            hold_s,
            stable: initial,
            raw_last: initial,
            since_s: std::f64::NEG_INFINITY,
        }
    }

    /// Feed a new raw sample taken at `now_s`, returning the debounced value.
    pub fn update(&mut self, raw: bool, now_s: f64) -> bool {
        if raw != self.raw_last {
            self.raw_last = raw;
            self.since_s = now_s;
        }

        if now_s - self.since_s >= self.hold_s {
            self.stable = self.raw_last;
        }

        self.stable
    }

    pub fn value(&self) -> bool {
        self.stable
    }
}
