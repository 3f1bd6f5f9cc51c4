//! Untagged 32-bit machine word.
//!
//! A `Word` carries no type information. The opcode that touches it decides
//! whether the bits are read as a signed integer or an IEEE-754 float, and
//! moves never reinterpret anything: the bit pattern survives exactly.

use std::fmt;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// A raw 32-bit value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Word(u32);

impl Word {
    /// Integer zero (also the float +0.0 bit pattern).
    pub const ZERO: Word = Word(0);

    /// Integer one, the canonical "true".
    pub const ONE: Word = Word(1);

    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Word(bits)
    }

    #[inline]
    pub const fn from_int(v: i32) -> Self {
        Word(v as u32)
    }

    #[inline]
    pub fn from_float(v: f32) -> Self {
        Word(v.to_bits())
    }

    #[inline]
    pub fn from_bool(b: bool) -> Self {
        if b { Word::ONE } else { Word::ZERO }
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn as_int(self) -> i32 {
        self.0 as i32
    }

    #[inline]
    pub fn as_float(self) -> f32 {
        f32::from_bits(self.0)
    }

    /// Exact integer-zero test used by conditional jumps and IF blocks.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({:#010x} i={} f={:?})", self.0, self.as_int(), self.as_float())
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_int())
    }
}

struct WordVisitor;

impl<'de> Visitor<'de> for WordVisitor {
    type Value = Word;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an integer between {} and {}", i32::MIN, u32::MAX)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Word, E> {
        u32::try_from(v)
            .map(Word::from_bits)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Word, E> {
        if v >= 0 {
            return self.visit_u64(v as u64);
        }
        i32::try_from(v)
            .map(Word::from_int)
            .map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }
}

/// Accepts both signed immediates and raw bit patterns; negatives keep
/// their two's-complement bits.
impl<'de> Deserialize<'de> for Word {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_i64(WordVisitor)
    }
}

impl From<i32> for Word {
    fn from(v: i32) -> Self {
        Word::from_int(v)
    }
}

impl From<u32> for Word {
    fn from(v: u32) -> Self {
        Word::from_bits(v)
    }
}

impl From<f32> for Word {
    fn from(v: f32) -> Self {
        Word::from_float(v)
    }
}

/// Render a float the way the result sink prints it: shortest round-trip
/// digits in plain notation, always with a decimal point for finite values.
pub fn format_float(v: f32) -> String {
    let mut text = v.to_string();
    if v.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}
