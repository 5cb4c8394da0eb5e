//! Typed ids for netlist entities.
//!
//! Every entity lives in an arena owned by its module or design, and is
//! referred to by a small copyable id. The newtypes keep the id spaces
//! apart: a [`SignalId`] cannot be used where a [`ProcessId`] is expected.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Reconstructs an id from its raw index.
            pub fn from_raw(raw: u32) -> $name {
                $name(raw)
            }

            /// The raw index of this id.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl crate::arena::ArenaId for $name {
            fn from_raw(raw: u32) -> Self {
                $name(raw)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Identifies a module definition within a design.
    ModuleId
);

define_id!(
    /// Identifies a signal within its defining module.
    SignalId
);

define_id!(
    /// Identifies a port within its defining module.
    PortId
);

define_id!(
    /// Identifies a process within its defining module.
    ProcessId
);

define_id!(
    /// Identifies a child instance within its defining module.
    InstanceId
);

define_id!(
    /// Identifies a flattened net in an elaborated design.
    NetId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_round_trip() {
        let id = SignalId::from_raw(7);
        assert_eq!(id.as_raw(), 7);
        assert_eq!(SignalId::from_raw(7), id);
        assert_ne!(SignalId::from_raw(8), id);
    }
}
