//! Three-state scalar logic.
//!
//! A single bit in the simulator is either a known `0`, a known `1`, or the
//! unknown value `X`. Unknowns appear wherever a result genuinely depends on
//! uninitialized or conflicting state, and the operators here propagate them
//! with the usual dominance rules: `0 & X` is still `0` and `1 | X` is still
//! `1`, because the known operand decides the outcome regardless of what the
//! unknown turns out to be.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use serde::{Deserialize, Serialize};

/// A single three-state logic value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Known logic low.
    Zero = 0,
    /// Known logic high.
    One = 1,
    /// Unknown. Stands for "could be either 0 or 1".
    X = 2,
}

impl Logic {
    /// Returns `true` for `Zero` and `One`, `false` for `X`.
    pub fn is_known(self) -> bool {
        !matches!(self, Logic::X)
    }

    /// Parses one character of a bit literal. Accepts `0`, `1`, `x` and `X`.
    pub fn from_char(c: char) -> Option<Logic> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            _ => None,
        }
    }

    /// The character used for this value in bit-string renderings.
    pub fn to_char(self) -> char {
        match self {
            Logic::Zero => '0',
            Logic::One => '1',
            Logic::X => 'X',
        }
    }
}

impl BitAnd for Logic {
    type Output = Logic;

    fn bitand(self, rhs: Logic) -> Logic {
        match (self, rhs) {
            (Logic::Zero, _) | (_, Logic::Zero) => Logic::Zero,
            (Logic::One, Logic::One) => Logic::One,
            _ => Logic::X,
        }
    }
}

impl BitOr for Logic {
    type Output = Logic;

    fn bitor(self, rhs: Logic) -> Logic {
        match (self, rhs) {
            (Logic::One, _) | (_, Logic::One) => Logic::One,
            (Logic::Zero, Logic::Zero) => Logic::Zero,
            _ => Logic::X,
        }
    }
}

impl BitXor for Logic {
    type Output = Logic;

    fn bitxor(self, rhs: Logic) -> Logic {
        match (self, rhs) {
            (Logic::Zero, Logic::Zero) | (Logic::One, Logic::One) => Logic::Zero,
            (Logic::Zero, Logic::One) | (Logic::One, Logic::Zero) => Logic::One,
            _ => Logic::X,
        }
    }
}

impl Not for Logic {
    type Output = Logic;

    fn not(self) -> Logic {
        match self {
            Logic::Zero => Logic::One,
            Logic::One => Logic::Zero,
            Logic::X => Logic::X,
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
