//! Numeric operation traits.
//!
//! The same opcode shapes (`dst a b` arithmetic, `dst a b` comparison) exist
//! once for integers and once for floats. Each interpretation of a `Word`
//! implements these traits and the executor dispatches through them:
//! - `IntOps`: signed 32-bit, wrapping, division by zero yields 0
//! - `FloatOps`: IEEE-754 single precision, never trapped

use crate::core::Word;

/// Binary arithmetic over one interpretation of a `Word`.
pub trait ArithmeticOps {
    type Value: Copy;

    /// Reinterpret the raw bits.
    fn decode(word: Word) -> Self::Value;

    /// Back to raw bits.
    fn encode(value: Self::Value) -> Word;

    fn value_add(a: Self::Value, b: Self::Value) -> Self::Value;

    fn value_sub(a: Self::Value, b: Self::Value) -> Self::Value;

    fn value_mul(a: Self::Value, b: Self::Value) -> Self::Value;

    fn value_div(a: Self::Value, b: Self::Value) -> Self::Value;
}

/// Comparisons over one interpretation of a `Word`.
pub trait ComparisonOps: ArithmeticOps {
    fn value_eq(a: Self::Value, b: Self::Value) -> bool;

    fn value_lt(a: Self::Value, b: Self::Value) -> bool;

    fn value_neq(a: Self::Value, b: Self::Value) -> bool {
        !Self::value_eq(a, b)
    }

    fn value_gt(a: Self::Value, b: Self::Value) -> bool {
        Self::value_lt(b, a)
    }

    fn value_lte(a: Self::Value, b: Self::Value) -> bool {
        Self::value_lt(a, b) || Self::value_eq(a, b)
    }

    fn value_gte(a: Self::Value, b: Self::Value) -> bool {
        Self::value_gt(a, b) || Self::value_eq(a, b)
    }
}

/// Arithmetic selector shared by both interpretations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// Comparison selector shared by both interpretations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
}

/// Apply an arithmetic op to two raw words.
#[inline]
pub fn arithmetic<O: ArithmeticOps>(op: ArithOp, a: Word, b: Word) -> Word {
    let (a, b) = (O::decode(a), O::decode(b));
    O::encode(match op {
        ArithOp::Add => O::value_add(a, b),
        ArithOp::Sub => O::value_sub(a, b),
        ArithOp::Mul => O::value_mul(a, b),
        ArithOp::Div => O::value_div(a, b),
    })
}

/// Apply a comparison to two raw words, producing integer 1 or 0.
#[inline]
pub fn compare<O: ComparisonOps>(op: CmpOp, a: Word, b: Word) -> Word {
    let (a, b) = (O::decode(a), O::decode(b));
    Word::from_bool(match op {
        CmpOp::Eq => O::value_eq(a, b),
        CmpOp::Neq => O::value_neq(a, b),
        CmpOp::Lt => O::value_lt(a, b),
        CmpOp::Gt => O::value_gt(a, b),
        CmpOp::Lte => O::value_lte(a, b),
        CmpOp::Gte => O::value_gte(a, b),
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Signed 32-bit integers
// ═══════════════════════════════════════════════════════════════════════════

/// Marker type for integer opcodes.
pub struct IntOps;

impl IntOps {
    /// Remainder with the same zero rule as division.
    #[inline]
    pub fn value_mod(a: i32, b: i32) -> i32 {
        if b == 0 { 0 } else { a.wrapping_rem(b) }
    }
}

impl ArithmeticOps for IntOps {
    type Value = i32;

    #[inline]
    fn decode(word: Word) -> i32 {
        word.as_int()
    }

    #[inline]
    fn encode(value: i32) -> Word {
        Word::from_int(value)
    }

    #[inline]
    fn value_add(a: i32, b: i32) -> i32 {
        a.wrapping_add(b)
    }

    #[inline]
    fn value_sub(a: i32, b: i32) -> i32 {
        a.wrapping_sub(b)
    }

    #[inline]
    fn value_mul(a: i32, b: i32) -> i32 {
        a.wrapping_mul(b)
    }

    #[inline]
    fn value_div(a: i32, b: i32) -> i32 {
        if b == 0 { 0 } else { a.wrapping_div(b) }
    }
}

impl ComparisonOps for IntOps {
    #[inline]
    fn value_eq(a: i32, b: i32) -> bool {
        a == b
    }

    #[inline]
    fn value_lt(a: i32, b: i32) -> bool {
        a < b
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// IEEE-754 single precision
// ═══════════════════════════════════════════════════════════════════════════

/// Marker type for float opcodes.
pub struct FloatOps;

impl ArithmeticOps for FloatOps {
    type Value = f32;

    #[inline]
    fn decode(word: Word) -> f32 {
        word.as_float()
    }

    #[inline]
    fn encode(value: f32) -> Word {
        Word::from_float(value)
    }

    #[inline]
    fn value_add(a: f32, b: f32) -> f32 {
        a + b
    }

    #[inline]
    fn value_sub(a: f32, b: f32) -> f32 {
        a - b
    }

    #[inline]
    fn value_mul(a: f32, b: f32) -> f32 {
        a * b
    }

    #[inline]
    fn value_div(a: f32, b: f32) -> f32 {
        a / b
    }
}

impl ComparisonOps for FloatOps {
    #[inline]
    fn value_eq(a: f32, b: f32) -> bool {
        a == b
    }

    #[inline]
    fn value_lt(a: f32, b: f32) -> bool {
        a < b
    }

    // NaN compares false everywhere except NEQ.
    #[inline]
    fn value_lte(a: f32, b: f32) -> bool {
        a <= b
    }

    #[inline]
    fn value_gte(a: f32, b: f32) -> bool {
        a >= b
    }
}
