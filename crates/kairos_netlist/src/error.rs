//! Construction and elaboration errors.
//!
//! Everything here is detectable before simulation starts. Names are
//! resolved to plain strings at the point of error so the values stay
//! meaningful after the interner is gone.

use kairos_common::WidthError;
use thiserror::Error;

/// A port binding that cannot be satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// The instantiated module has no port with the given name.
    #[error("module `{module}` has no port named `{port}`")]
    UnknownPort {
        /// Name of the instantiated module.
        module: String,
        /// Requested port name.
        port: String,
    },
    /// The bound signal's width differs from the port's width.
    #[error(
        "width mismatch binding signal `{signal}` ({signal_width} bits) \
         to port `{port}` ({port_width} bits)"
    )]
    WidthMismatch {
        /// Port name.
        port: String,
        /// Port width in bits.
        port_width: u32,
        /// Bound signal name.
        signal: String,
        /// Bound signal width in bits.
        signal_width: u32,
    },
    /// The same port of one instance was bound twice.
    #[error("port `{port}` of instance `{instance}` is bound twice")]
    BoundTwice {
        /// Instance name.
        instance: String,
        /// Port name.
        port: String,
    },
    /// An instance output was wired to a net that the enclosing module
    /// receives through an input port, so two sides would drive it.
    #[error(
        "output port `{port}` of instance `{instance}` drives `{signal}`, \
         which backs an input port of the enclosing module"
    )]
    DrivesInput {
        /// Instance name.
        instance: String,
        /// Output port name.
        port: String,
        /// Name of the input-backing signal.
        signal: String,
    },
}

/// A defect found while checking or flattening a design.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetlistError {
    /// The design has no top module set.
    #[error("design has no top module")]
    NoTop,
    /// A port binding is invalid.
    #[error(transparent)]
    Binding(#[from] BindingError),
    /// A width rule was violated outside any process body.
    #[error(transparent)]
    Width(#[from] WidthError),
    /// A width rule was violated inside a process body.
    #[error("in process `{process}` of `{module}`: {source}")]
    BodyWidth {
        /// Module name.
        module: String,
        /// Process name.
        process: String,
        /// The underlying width violation.
        source: WidthError,
    },
    /// Two signals or instances in one module share a name.
    #[error("module `{module}` declares two objects named `{name}`")]
    DuplicateName {
        /// Module name.
        module: String,
        /// The colliding name.
        name: String,
    },
    /// The instantiation graph contains a cycle.
    #[error("module instantiation cycle through `{module}`")]
    RecursiveHierarchy {
        /// A module on the cycle.
        module: String,
    },
    /// An instance refers to a module id that is not in the design.
    #[error("instance `{instance}` in `{module}` refers to an unknown module")]
    UnknownModule {
        /// Enclosing module name.
        module: String,
        /// Instance name.
        instance: String,
    },
    /// A process or instance refers to a signal id that is not in its
    /// module.
    #[error("module `{module}` refers to an unknown signal id")]
    UnknownSignal {
        /// Module name.
        module: String,
    },
    /// An instance port was left without a bound signal.
    #[error("port `{port}` of instance `{instance}` in `{module}` is unbound")]
    UnboundPort {
        /// Enclosing module name.
        module: String,
        /// Instance name.
        instance: String,
        /// Port name.
        port: String,
    },
    /// A combinational process reads a signal missing from its sensitivity
    /// set.
    #[error(
        "process `{process}` in `{module}` reads `{signal}` \
         but does not list it in its sensitivity set"
    )]
    SensitivityGap {
        /// Module name.
        module: String,
        /// Process name.
        process: String,
        /// The signal read outside the sensitivity set.
        signal: String,
    },
    /// A branch or multiplexer condition is not one bit wide.
    #[error("condition in process `{process}` of `{module}` is {width} bits wide, expected 1")]
    ConditionWidth {
        /// Module name.
        module: String,
        /// Process name.
        process: String,
        /// Actual condition width.
        width: u32,
    },
    /// A case pattern's width differs from the subject's width.
    #[error(
        "case pattern in process `{process}` of `{module}` is {found} bits wide, \
         subject is {expected}"
    )]
    PatternWidth {
        /// Module name.
        module: String,
        /// Process name.
        process: String,
        /// Subject width.
        expected: u32,
        /// Pattern width.
        found: u32,
    },
    /// A case pattern contains `X` bits, which could never match.
    #[error("case pattern in process `{process}` of `{module}` contains X bits")]
    PatternUnknown {
        /// Module name.
        module: String,
        /// Process name.
        process: String,
    },
    /// A clocked process uses a clock that is not one bit wide.
    #[error("clock of process `{process}` in `{module}` is {width} bits wide, expected 1")]
    ClockWidth {
        /// Module name.
        module: String,
        /// Process name.
        process: String,
        /// Actual clock width.
        width: u32,
    },
    /// A process drives a net exposed as a top-level input port.
    #[error("process `{process}` drives top-level input port `{port}`")]
    InputDriven {
        /// Top-level port name.
        port: String,
        /// Driving process name, hierarchical.
        process: String,
    },
}
