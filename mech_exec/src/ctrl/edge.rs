//! # Edge detector

/// A transition of a boolean signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// false -> true
    Rising,

    /// true -> false
    Falling,
}

/// Emits a single [`Edge`] on each transition of a boolean signal.
#[derive(Debug, Clone)]
pub struct EdgeDetector {
    last: bool,
}

impl EdgeDetector {
    pub fn new(initial: bool) -> Self {
        Self { last: initial }
    }

    /// Compare `value` with the value seen on the previous update.
    pub fn update(&mut self, value: bool) -> Option<Edge> {
        let edge = match (self.last, value) {
            (false, true) => Some(Edge::Rising),
            (true, false) => Some(Edge::Falling),
            _ => None,
        };
        self.last = value;

        edge
    }

    pub fn last(&self) -> bool {
        self.last
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_one_event_per_transition() {
        let mut e = EdgeDetector::new(false);

        let signal = [false, true, true, true, false, false, true, false];
        let events: Vec<_> = signal.iter().map(|&v| e.update(v)).collect();

        assert_eq!(
            events,
            vec![
                None,
                Some(Edge::Rising),
                None,
                None,
                Some(Edge::Falling),
                None,
                Some(Edge::Rising),
                Some(Edge::Falling),
            ]
        );
    }
}
