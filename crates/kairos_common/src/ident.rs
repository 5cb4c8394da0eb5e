//! Interned identifiers.
//!
//! Signal, port, process and module names are interned once and passed
//! around as copyable [`Ident`] handles. Interning keeps the netlist types
//! small and makes name equality a single integer compare.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// A handle to an interned string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Ident(u32);

impl Ident {
    /// Reconstructs an identifier from its raw index.
    pub fn from_raw(raw: u32) -> Ident {
        Ident(raw)
    }

    /// The raw index of this identifier.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// Injective by construction: every Ident round-trips through its u32 index.
unsafe impl lasso::Key for Ident {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        if int < u32::MAX as usize {
            Some(Ident(int as u32))
        } else {
            None
        }
    }
}

/// The string table behind [`Ident`] handles.
pub struct Interner {
    rodeo: ThreadedRodeo<Ident>,
}

impl Interner {
    /// Creates an empty interner.
    pub fn new() -> Interner {
        Interner {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns `s`, returning the existing handle if it was seen before.
    pub fn get_or_intern(&self, s: &str) -> Ident {
        self.rodeo.get_or_intern(s)
    }

    /// Looks up the string behind a handle.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.rodeo.resolve(&ident)
    }
}

impl Default for Interner {
    fn default() -> Self {
        Interner::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let interner = Interner::new();
        let a = interner.get_or_intern("clk");
        let b = interner.get_or_intern("clk");
        assert_eq!(a, b);
        assert_eq!(interner.resolve(a), "clk");
    }

    #[test]
    fn distinct_strings_get_distinct_handles() {
        let interner = Interner::new();
        let a = interner.get_or_intern("din");
        let b = interner.get_or_intern("dout");
        assert_ne!(a, b);
        assert_eq!(interner.resolve(a), "din");
        assert_eq!(interner.resolve(b), "dout");
    }

    #[test]
    fn raw_round_trip() {
        let interner = Interner::new();
        let a = interner.get_or_intern("rst");
        assert_eq!(Ident::from_raw(a.as_raw()), a);
    }
}
