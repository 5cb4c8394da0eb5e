//! Simulated time.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in simulated time: a tick plus a delta index within it.
///
/// Ticks advance once per kernel step. Deltas are the zero-duration
/// settling rounds inside one tick; delta 0 is the stimulus, higher deltas
/// are successive combinational commits. The derived ordering is
/// lexicographic, tick first.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct SimTime {
    /// Completed-step counter.
    pub tick: u64,
    /// Settling round within the tick.
    pub delta: u32,
}

impl SimTime {
    /// The origin of simulated time.
    pub fn zero() -> SimTime {
        SimTime { tick: 0, delta: 0 }
    }

    /// The same tick, one delta later.
    pub fn next_delta(self) -> SimTime {
        SimTime {
            tick: self.tick,
            delta: self.delta + 1,
        }
    }

    /// The start of the following tick.
    pub fn next_tick(self) -> SimTime {
        SimTime {
            tick: self.tick + 1,
            delta: 0,
        }
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.delta == 0 {
            write!(f, "{}", self.tick)
        } else {
            write!(f, "{}+d{}", self.tick, self.delta)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_tick_then_delta() {
        let a = SimTime { tick: 1, delta: 5 };
        let b = SimTime { tick: 2, delta: 0 };
        let c = SimTime { tick: 2, delta: 1 };
        assert!(a < b);
        assert!(b < c);
        assert_eq!(SimTime::zero().next_delta(), SimTime { tick: 0, delta: 1 });
        assert_eq!(c.next_tick(), SimTime { tick: 3, delta: 0 });
    }

    #[test]
    fn display_omits_zero_delta() {
        assert_eq!(SimTime { tick: 3, delta: 0 }.to_string(), "3");
        assert_eq!(SimTime { tick: 3, delta: 2 }.to_string(), "3+d2");
    }
}
