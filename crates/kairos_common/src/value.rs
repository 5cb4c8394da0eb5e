//! Fixed-width bit vectors over three-state logic.
//!
//! [`Value`] is the unit of data flowing through a simulated design: a bit
//! vector with a fixed width, a signedness tag, and per-position
//! [`Logic`] states packed two bits per position. All binary operations are
//! closed over width and return [`WidthError`] when the operand widths
//! disagree, so width bugs surface at the point of use instead of silently
//! resizing data.
//!
//! Unknown (`X`) bits propagate per position where the hardware analogy
//! permits it: addition ripples a carry chain of [`Logic`] values, so an `X`
//! in a low bit poisons exactly the sum bits its carry can reach and leaves
//! the rest known.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logic::Logic;

/// Logic positions stored per `u64` word, two bits each.
const BITS_PER_WORD: u32 = 32;

/// Word pattern with `X` in every position.
const X_PATTERN: u64 = 0xAAAA_AAAA_AAAA_AAAA;

/// Word pattern with `One` in every position.
const ONES_PATTERN: u64 = 0x5555_5555_5555_5555;

fn word_count(width: u32) -> usize {
    (width as usize).div_ceil(BITS_PER_WORD as usize)
}

fn tail_mask(width: u32) -> u64 {
    let used = (width % BITS_PER_WORD) * 2;
    if used == 0 {
        !0
    } else {
        (1u64 << used) - 1
    }
}

/// A fixed-width vector of three-state logic with a signedness tag.
///
/// Unused storage in the last word is kept zeroed, so the derived structural
/// equality and hashing are exact over (width, signedness, bits).
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Value {
    width: u32,
    signed: bool,
    words: Vec<u64>,
}

impl Value {
    fn filled(width: u32, signed: bool, fill: Logic) -> Value {
        let pattern = match fill {
            Logic::Zero => 0,
            Logic::One => ONES_PATTERN,
            Logic::X => X_PATTERN,
        };
        let mut words = vec![pattern; word_count(width)];
        if let Some(last) = words.last_mut() {
            *last &= tail_mask(width);
        }
        Value {
            width,
            signed,
            words,
        }
    }

    /// An unsigned value with every bit at `Zero`.
    pub fn zeros(width: u32) -> Value {
        Value::filled(width, false, Logic::Zero)
    }

    /// An unsigned value with every bit at `X`. This is the state of any
    /// signal that has never been driven or initialized.
    pub fn unknown(width: u32) -> Value {
        Value::filled(width, false, Logic::X)
    }

    /// A 1-bit value holding the given logic state.
    pub fn from_logic(bit: Logic) -> Value {
        let mut v = Value::zeros(1);
        v.set(0, bit);
        v
    }

    /// An unsigned value from the low `width` bits of `bits`.
    pub fn from_u64(bits: u64, width: u32) -> Value {
        let mut v = Value::zeros(width);
        for i in 0..width.min(64) {
            if (bits >> i) & 1 == 1 {
                v.set(i, Logic::One);
            }
        }
        v
    }

    /// A signed value from the two's complement representation of `bits`,
    /// truncated or sign-extended to `width`.
    pub fn from_i64(bits: i64, width: u32) -> Value {
        let mut v = Value::from_u64(bits as u64, width);
        if width > 64 && bits < 0 {
            for i in 64..width {
                v.set(i, Logic::One);
            }
        }
        v.signed = true;
        v
    }

    /// Parses a bit string written most significant bit first, e.g. `"10X0"`.
    /// Returns `None` on any character other than `0`, `1`, `x` or `X`.
    pub fn from_bit_str(s: &str) -> Option<Value> {
        let width = u32::try_from(s.len()).ok()?;
        let mut v = Value::zeros(width);
        for (i, c) in s.chars().rev().enumerate() {
            v.set(i as u32, Logic::from_char(c)?);
        }
        Some(v)
    }

    /// The number of bit positions in this value.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Whether comparisons and right shifts treat this value as two's
    /// complement.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// The same bits tagged as signed.
    pub fn as_signed(mut self) -> Value {
        self.signed = true;
        self
    }

    /// The same bits tagged as unsigned.
    pub fn as_unsigned(mut self) -> Value {
        self.signed = false;
        self
    }

    /// Reads the bit at `pos`, with position 0 the least significant.
    ///
    /// Panics if `pos` is out of range.
    pub fn get(&self, pos: u32) -> Logic {
        assert!(
            pos < self.width,
            "bit {} out of range for {}-bit value",
            pos,
            self.width
        );
        let word = self.words[(pos / BITS_PER_WORD) as usize];
        match (word >> ((pos % BITS_PER_WORD) * 2)) & 0b11 {
            0 => Logic::Zero,
            1 => Logic::One,
            _ => Logic::X,
        }
    }

    /// Writes the bit at `pos`.
    ///
    /// Panics if `pos` is out of range.
    pub fn set(&mut self, pos: u32, bit: Logic) {
        assert!(
            pos < self.width,
            "bit {} out of range for {}-bit value",
            pos,
            self.width
        );
        let idx = (pos / BITS_PER_WORD) as usize;
        let shift = (pos % BITS_PER_WORD) * 2;
        self.words[idx] = (self.words[idx] & !(0b11u64 << shift)) | ((bit as u64) << shift);
    }

    /// Overwrites bits `low..low + src.width()` with the bits of `src`.
    ///
    /// Panics if the destination range is out of range.
    pub fn splice(&mut self, low: u32, src: &Value) {
        assert!(
            low + src.width <= self.width,
            "splice of {} bits at {} out of range for {}-bit value",
            src.width,
            low,
            self.width
        );
        for i in 0..src.width {
            self.set(low + i, src.get(i));
        }
    }

    /// Whether any position holds `X`.
    pub fn has_x(&self) -> bool {
        // `X` is the only encoding with the high bit of its pair set.
        self.words.iter().any(|w| w & X_PATTERN != 0)
    }

    /// Whether every position holds `X`. Vacuously false at width 0.
    pub fn is_all_x(&self) -> bool {
        self.width > 0 && (0..self.width).all(|i| self.get(i) == Logic::X)
    }

    /// The bits as an unsigned integer, or `None` if any bit is `X` or the
    /// width exceeds 64.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 || self.has_x() {
            return None;
        }
        let mut out = 0u64;
        for i in 0..self.width {
            if self.get(i) == Logic::One {
                out |= 1 << i;
            }
        }
        Some(out)
    }

    /// The bits as a signed integer, honoring the signedness tag. Returns
    /// `None` if any bit is `X`, the width exceeds 64, or an unsigned 64-bit
    /// value does not fit in `i64`.
    pub fn to_i64(&self) -> Option<i64> {
        let raw = self.to_u64()?;
        if self.signed && self.width > 0 && self.width < 64 && self.get(self.width - 1) == Logic::One
        {
            return Some((raw | !((1u64 << self.width) - 1)) as i64);
        }
        if self.signed || self.width < 64 {
            return Some(raw as i64);
        }
        i64::try_from(raw).ok()
    }

    fn require_same_width(&self, rhs: &Value, op: &'static str) -> Result<(), WidthError> {
        if self.width == rhs.width {
            Ok(())
        } else {
            Err(WidthError::Mismatch {
                op,
                left: self.width,
                right: rhs.width,
            })
        }
    }

    fn joint_signed(&self, rhs: &Value) -> bool {
        self.signed && rhs.signed
    }

    /// Bitwise AND. `Zero` dominates `X` per position.
    pub fn and(&self, rhs: &Value) -> Result<Value, WidthError> {
        self.require_same_width(rhs, "and")?;
        let mut out = Value::filled(self.width, self.joint_signed(rhs), Logic::Zero);
        for i in 0..self.width {
            out.set(i, self.get(i) & rhs.get(i));
        }
        Ok(out)
    }

    /// Bitwise OR. `One` dominates `X` per position.
    pub fn or(&self, rhs: &Value) -> Result<Value, WidthError> {
        self.require_same_width(rhs, "or")?;
        let mut out = Value::filled(self.width, self.joint_signed(rhs), Logic::Zero);
        for i in 0..self.width {
            out.set(i, self.get(i) | rhs.get(i));
        }
        Ok(out)
    }

    /// Bitwise XOR. Any `X` operand bit yields `X`.
    pub fn xor(&self, rhs: &Value) -> Result<Value, WidthError> {
        self.require_same_width(rhs, "xor")?;
        let mut out = Value::filled(self.width, self.joint_signed(rhs), Logic::Zero);
        for i in 0..self.width {
            out.set(i, self.get(i) ^ rhs.get(i));
        }
        Ok(out)
    }

    /// Bitwise complement.
    pub fn not(&self) -> Value {
        let mut out = Value::filled(self.width, self.signed, Logic::Zero);
        for i in 0..self.width {
            out.set(i, !self.get(i));
        }
        out
    }

    fn ripple_add(&self, rhs: &Value, initial_carry: Logic, invert_rhs: bool) -> Value {
        let mut out = Value::filled(self.width, self.joint_signed(rhs), Logic::Zero);
        let mut carry = initial_carry;
        for i in 0..self.width {
            let a = self.get(i);
            let mut b = rhs.get(i);
            if invert_rhs {
                b = !b;
            }
            out.set(i, a ^ b ^ carry);
            carry = (a & b) | (a & carry) | (b & carry);
        }
        out
    }

    /// Wrapping addition at the operand width.
    ///
    /// The carry chain is evaluated in three-state logic, so an `X` operand
    /// bit makes unknown only the result bits its carry can actually reach.
    pub fn add(&self, rhs: &Value) -> Result<Value, WidthError> {
        self.require_same_width(rhs, "add")?;
        Ok(self.ripple_add(rhs, Logic::Zero, false))
    }

    /// Wrapping subtraction at the operand width, computed as `a + !b + 1`.
    pub fn sub(&self, rhs: &Value) -> Result<Value, WidthError> {
        self.require_same_width(rhs, "sub")?;
        Ok(self.ripple_add(rhs, Logic::One, true))
    }

    /// Two's complement negation at the same width.
    pub fn neg(&self) -> Value {
        let mut out = Value::filled(self.width, self.signed, Logic::Zero);
        let mut carry = Logic::One;
        for i in 0..self.width {
            let a = !self.get(i);
            out.set(i, a ^ carry);
            carry = a & carry;
        }
        out
    }

    /// Wrapping multiplication truncated to the operand width. Any `X` in
    /// either operand makes the whole result `X`.
    pub fn mul(&self, rhs: &Value) -> Result<Value, WidthError> {
        self.require_same_width(rhs, "mul")?;
        let signed = self.joint_signed(rhs);
        if self.has_x() || rhs.has_x() {
            return Ok(Value::filled(self.width, signed, Logic::X));
        }
        if let (Some(a), Some(b)) = (self.to_u64(), rhs.to_u64()) {
            let mut out = Value::from_u64(a.wrapping_mul(b), self.width);
            out.signed = signed;
            return Ok(out);
        }
        // Wider than a machine word: shift-and-add, truncating as we go.
        let mut acc = Value::filled(self.width, signed, Logic::Zero);
        let mut shifted = self.clone();
        shifted.signed = signed;
        for i in 0..self.width {
            if rhs.get(i) == Logic::One {
                acc = acc.ripple_add(&shifted, Logic::Zero, false);
            }
            shifted = shifted.shift_left_by(1);
        }
        Ok(acc)
    }

    fn shift_left_by(&self, amount: u32) -> Value {
        let mut out = Value::filled(self.width, self.signed, Logic::Zero);
        if amount < self.width {
            for i in amount..self.width {
                out.set(i, self.get(i - amount));
            }
        }
        out
    }

    fn shift_right_by(&self, amount: u32, fill: Logic) -> Value {
        let mut out = Value::filled(self.width, self.signed, fill);
        if amount < self.width {
            for i in 0..self.width - amount {
                out.set(i, self.get(i + amount));
            }
        }
        out
    }

    fn shift_amount(&self) -> Option<u32> {
        if self.has_x() {
            return None;
        }
        let mut amount: u64 = 0;
        for i in 0..self.width.min(64) {
            if self.get(i) == Logic::One {
                amount |= 1 << i;
            }
        }
        for i in 64..self.width {
            if self.get(i) == Logic::One {
                return Some(u32::MAX);
            }
        }
        Some(u64::min(amount, u64::from(u32::MAX)) as u32)
    }

    /// Logical left shift by the numeric value of `rhs`, filling with `Zero`.
    /// An `X` anywhere in the shift amount makes the whole result `X`.
    pub fn shl(&self, rhs: &Value) -> Result<Value, WidthError> {
        self.require_same_width(rhs, "shl")?;
        match rhs.shift_amount() {
            Some(n) => Ok(self.shift_left_by(n.min(self.width))),
            None => Ok(Value::filled(self.width, self.signed, Logic::X)),
        }
    }

    /// Right shift by the numeric value of `rhs`. Signed values shift
    /// arithmetically, replicating the sign bit (which may itself be `X`);
    /// unsigned values fill with `Zero`.
    pub fn shr(&self, rhs: &Value) -> Result<Value, WidthError> {
        self.require_same_width(rhs, "shr")?;
        let fill = if self.signed && self.width > 0 {
            self.get(self.width - 1)
        } else {
            Logic::Zero
        };
        match rhs.shift_amount() {
            Some(n) => Ok(self.shift_right_by(n.min(self.width), fill)),
            None => Ok(Value::filled(self.width, self.signed, Logic::X)),
        }
    }

    /// Equality in three-state logic. Any `X` in either operand means the
    /// answer is not knowable, so the result is `X`; in particular a value
    /// containing `X` never compares equal to itself.
    pub fn cmp_eq(&self, rhs: &Value) -> Result<Logic, WidthError> {
        self.require_same_width(rhs, "eq")?;
        if self.has_x() || rhs.has_x() {
            return Ok(Logic::X);
        }
        Ok(if self.words == rhs.words {
            Logic::One
        } else {
            Logic::Zero
        })
    }

    /// Inequality in three-state logic. The complement of [`Value::cmp_eq`].
    pub fn cmp_ne(&self, rhs: &Value) -> Result<Logic, WidthError> {
        Ok(!self.cmp_eq(rhs)?)
    }

    fn compare(&self, rhs: &Value, op: &'static str) -> Result<Option<Ordering>, WidthError> {
        self.require_same_width(rhs, op)?;
        if self.has_x() || rhs.has_x() {
            return Ok(None);
        }
        if self.joint_signed(rhs) && self.width > 0 {
            let a_neg = self.get(self.width - 1) == Logic::One;
            let b_neg = rhs.get(self.width - 1) == Logic::One;
            if a_neg != b_neg {
                return Ok(Some(if a_neg {
                    Ordering::Less
                } else {
                    Ordering::Greater
                }));
            }
        }
        // Same sign class, or unsigned: two's complement orders the
        // remaining bits exactly like magnitudes, so compare from the top.
        for i in (0..self.width).rev() {
            let a = self.get(i) == Logic::One;
            let b = rhs.get(i) == Logic::One;
            if a != b {
                return Ok(Some(if b { Ordering::Less } else { Ordering::Greater }));
            }
        }
        Ok(Some(Ordering::Equal))
    }

    /// Less-than. Signed comparison when both operands are tagged signed,
    /// unsigned otherwise. Any `X` bit yields `X`.
    pub fn cmp_lt(&self, rhs: &Value) -> Result<Logic, WidthError> {
        Ok(match self.compare(rhs, "lt")? {
            None => Logic::X,
            Some(Ordering::Less) => Logic::One,
            Some(_) => Logic::Zero,
        })
    }

    /// Less-than-or-equal. See [`Value::cmp_lt`] for signedness and `X`.
    pub fn cmp_le(&self, rhs: &Value) -> Result<Logic, WidthError> {
        Ok(match self.compare(rhs, "le")? {
            None => Logic::X,
            Some(Ordering::Less) | Some(Ordering::Equal) => Logic::One,
            Some(_) => Logic::Zero,
        })
    }

    /// Greater-than. See [`Value::cmp_lt`] for signedness and `X`.
    pub fn cmp_gt(&self, rhs: &Value) -> Result<Logic, WidthError> {
        Ok(match self.compare(rhs, "gt")? {
            None => Logic::X,
            Some(Ordering::Greater) => Logic::One,
            Some(_) => Logic::Zero,
        })
    }

    /// Greater-than-or-equal. See [`Value::cmp_lt`] for signedness and `X`.
    pub fn cmp_ge(&self, rhs: &Value) -> Result<Logic, WidthError> {
        Ok(match self.compare(rhs, "ge")? {
            None => Logic::X,
            Some(Ordering::Greater) | Some(Ordering::Equal) => Logic::One,
            Some(_) => Logic::Zero,
        })
    }

    /// Extracts bits `high..=low` as a new unsigned value.
    pub fn slice(&self, high: u32, low: u32) -> Result<Value, WidthError> {
        if high < low || high >= self.width {
            return Err(WidthError::SliceRange {
                high,
                low,
                width: self.width,
            });
        }
        let mut out = Value::zeros(high - low + 1);
        for i in 0..out.width {
            out.set(i, self.get(low + i));
        }
        Ok(out)
    }

    /// Concatenates `self` (high bits) with `low` (low bits) into a wider
    /// unsigned value.
    pub fn concat(&self, low: &Value) -> Value {
        let mut out = Value::zeros(self.width + low.width);
        for i in 0..low.width {
            out.set(i, low.get(i));
        }
        for i in 0..self.width {
            out.set(low.width + i, self.get(i));
        }
        out
    }

    /// Widens to `width` by filling with `Zero`, keeping the signedness tag.
    /// Fails if `width` is narrower than the current width.
    pub fn zero_extend(&self, width: u32) -> Result<Value, WidthError> {
        if width < self.width {
            return Err(WidthError::ExtendNarrows {
                from: self.width,
                to: width,
            });
        }
        let mut out = Value::filled(width, self.signed, Logic::Zero);
        for i in 0..self.width {
            out.set(i, self.get(i));
        }
        Ok(out)
    }

    /// Widens to `width` by replicating the most significant bit, which may
    /// itself be `X`. Fails if `width` is narrower than the current width.
    pub fn sign_extend(&self, width: u32) -> Result<Value, WidthError> {
        if width < self.width {
            return Err(WidthError::ExtendNarrows {
                from: self.width,
                to: width,
            });
        }
        let fill = if self.width == 0 {
            Logic::Zero
        } else {
            self.get(self.width - 1)
        };
        let mut out = Value::filled(width, self.signed, fill);
        for i in 0..self.width {
            out.set(i, self.get(i));
        }
        Ok(out)
    }

    /// Keeps the low `width` bits, discarding the rest. Fails if `width` is
    /// wider than the current width.
    pub fn truncate(&self, width: u32) -> Result<Value, WidthError> {
        if width > self.width {
            return Err(WidthError::TruncateWidens {
                from: self.width,
                to: width,
            });
        }
        let mut out = Value::filled(width, self.signed, Logic::Zero);
        for i in 0..width {
            out.set(i, self.get(i));
        }
        Ok(out)
    }

    /// Per-position agreement merge: positions where both operands hold the
    /// same known bit keep it, every other position becomes `X`. This is the
    /// value of a multiplexer whose select is unknown.
    pub fn x_merge(&self, rhs: &Value) -> Result<Value, WidthError> {
        self.require_same_width(rhs, "merge")?;
        let mut out = Value::filled(self.width, self.joint_signed(rhs), Logic::Zero);
        for i in 0..self.width {
            let a = self.get(i);
            out.set(i, if a == rhs.get(i) { a } else { Logic::X });
        }
        Ok(out)
    }

    /// AND of all bits. `One` for the empty vector.
    pub fn reduce_and(&self) -> Logic {
        let mut acc = Logic::One;
        for i in 0..self.width {
            acc = acc & self.get(i);
        }
        acc
    }

    /// OR of all bits. `Zero` for the empty vector.
    pub fn reduce_or(&self) -> Logic {
        let mut acc = Logic::Zero;
        for i in 0..self.width {
            acc = acc | self.get(i);
        }
        acc
    }

    /// XOR of all bits (parity). `Zero` for the empty vector.
    pub fn reduce_xor(&self) -> Logic {
        let mut acc = Logic::Zero;
        for i in 0..self.width {
            acc = acc ^ self.get(i);
        }
        acc
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i).to_char())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}'{}b{}",
            self.width,
            if self.signed { "s" } else { "" },
            self
        )
    }
}

/// A width violation detected while constructing or combining values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WidthError {
    /// A binary operation was given operands of different widths.
    #[error("width mismatch in `{op}`: left is {left} bits, right is {right} bits")]
    Mismatch {
        /// Name of the offending operation.
        op: &'static str,
        /// Width of the left operand.
        left: u32,
        /// Width of the right operand.
        right: u32,
    },
    /// An extension was asked to produce a narrower value.
    #[error("cannot extend a {from}-bit value to narrower width {to}")]
    ExtendNarrows {
        /// Width of the value being extended.
        from: u32,
        /// Requested target width.
        to: u32,
    },
    /// A truncation was asked to produce a wider value.
    #[error("cannot truncate a {from}-bit value to wider width {to}")]
    TruncateWidens {
        /// Width of the value being truncated.
        from: u32,
        /// Requested target width.
        to: u32,
    },
    /// A slice range does not fit inside the value it targets.
    #[error("slice [{high}:{low}] out of range for a {width}-bit value")]
    SliceRange {
        /// High bit index of the requested slice, inclusive.
        high: u32,
        /// Low bit index of the requested slice, inclusive.
        low: u32,
        /// Width of the sliced value.
        width: u32,
    },
}
