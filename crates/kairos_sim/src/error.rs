//! Runtime simulation errors.
//!
//! Everything here surfaces while the kernel is stepping; construction
//! problems are caught earlier by `kairos_netlist`. Each runtime fault
//! names the entities involved and the simulated time (tick and delta) at
//! which it was detected.

use kairos_common::WidthError;
use thiserror::Error;

use crate::time::SimTime;

/// A fault raised while stepping a design, or a misuse of the kernel's
/// stimulus interface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Two processes wrote overlapping bits of one signal in the same
    /// settling round.
    #[error("conflicting drivers for `{signal}` at {time}: {}", .processes.join(", "))]
    DriverConflict {
        /// Hierarchical name of the multiply-driven signal.
        signal: String,
        /// Hierarchical names of the conflicting processes.
        processes: Vec<String>,
        /// When the overlap was detected.
        time: SimTime,
    },
    /// Combinational activity did not reach a fixed point within the
    /// configured delta budget.
    #[error("no fixed point after {limit} delta cycles at {time}; still changing: {}", .signals.join(", "))]
    NonConvergence {
        /// Hierarchical names of signals that changed in the last round.
        signals: Vec<String>,
        /// When the budget ran out.
        time: SimTime,
        /// The configured delta budget.
        limit: u32,
    },
    /// A process branched on a condition or case subject containing `X`.
    #[error("process `{process}` branched on an unknown value at {time}")]
    UndefinedControlFlow {
        /// Hierarchical name of the faulting process.
        process: String,
        /// When the branch was attempted.
        time: SimTime,
    },
    /// No top-level port has the given name.
    #[error("no top-level port named `{port}`")]
    UnknownPort {
        /// The requested name.
        port: String,
    },
    /// The named port exists but is not an input.
    #[error("`{port}` is not an input port")]
    NotAnInput {
        /// The requested name.
        port: String,
    },
    /// The named port exists but is not an output.
    #[error("`{port}` is not an output port")]
    NotAnOutput {
        /// The requested name.
        port: String,
    },
    /// No net in the elaborated design has the given hierarchical name.
    #[error("no net named `{name}`")]
    UnknownNet {
        /// The requested name.
        name: String,
    },
    /// A stimulus value's width does not match the port it targets.
    #[error("value for `{port}` is {found} bits, port is {expected}")]
    StimulusWidth {
        /// Port name.
        port: String,
        /// Port width in bits.
        expected: u32,
        /// Width of the supplied value.
        found: u32,
    },
    /// A clock was registered with a zero half period.
    #[error("clock on `{port}` must have a nonzero half period")]
    ClockPeriod {
        /// Port name.
        port: String,
    },
    /// The kernel faulted earlier; it no longer steps.
    #[error("kernel is faulted and cannot step further")]
    Faulted,
    /// A width violation escaped elaboration and surfaced during
    /// evaluation.
    #[error(transparent)]
    Width(#[from] WidthError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_participants() {
        let err = SimError::DriverConflict {
            signal: "u0.bus".to_string(),
            processes: vec!["u0.drive_a".to_string(), "u0.drive_b".to_string()],
            time: SimTime { tick: 3, delta: 2 },
        };
        assert_eq!(
            err.to_string(),
            "conflicting drivers for `u0.bus` at 3+d2: u0.drive_a, u0.drive_b"
        );

        let err = SimError::NonConvergence {
            signals: vec!["loop_a".to_string()],
            time: SimTime {
                tick: 0,
                delta: 1000,
            },
            limit: 1000,
        };
        assert_eq!(
            err.to_string(),
            "no fixed point after 1000 delta cycles at 0+d1000; still changing: loop_a"
        );

        let err = SimError::UndefinedControlFlow {
            process: "ctrl".to_string(),
            time: SimTime { tick: 1, delta: 1 },
        };
        assert_eq!(
            err.to_string(),
            "process `ctrl` branched on an unknown value at 1+d1"
        );
    }
}
