//! # LED notifications
//!
//! The LED strip is driven by a collaborator outside of the mechanisms software. The mechanisms
//! only emit [`LedCmd`]s into a [`LedSink`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::leds::{LedCmd, LedPattern};
use log::debug;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

pub trait LedSink {
    fn apply(&mut self, cmd: &LedCmd);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Tracks the pattern which would be shown and logs every change.
#[derive(Debug, Clone)]
pub struct LogLeds {
    persistent: LedPattern,
    current: LedPattern,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LogLeds {
    pub fn new(persistent: LedPattern) -> Self {
        Self {
            persistent,
            current: persistent,
        }
    }

    pub fn current(&self) -> LedPattern {
        self.current
    }
}

impl LedSink for LogLeds {
    fn apply(&mut self, cmd: &LedCmd) {
        let next = match cmd {
            LedCmd::Temporary(p) => *p,
            LedCmd::RestorePersistent => self.persistent,
        };

        if next != self.current {
            debug!("LEDs: {:?}", next);
            self.current = next;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::eqpt::leds::Color;

    #[test]
    fn test_restore() {
        let base = LedPattern::Solid(Color::Blue);
        let mut leds = LogLeds::new(base);

        let blink = LedPattern::Blink { color: Color::Orange, interval_s: 0.2 };
        leds.apply(&LedCmd::Temporary(blink));
        assert_eq!(leds.current(), blink);

        leds.apply(&LedCmd::RestorePersistent);
        assert_eq!(leds.current(), base);
    }
}
