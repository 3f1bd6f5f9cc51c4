//! Instruction catalog for tcscl bytecode.
//!
//! Every opcode has a stable numeric id (the first word of an encoded
//! instruction), a mnemonic, a category and a fixed encoded width of 1–4
//! words including the opcode word. The operand list describes what a host
//! supplies in the symbolic program; the conditional-block opcodes carry one
//! extra skip-target word that the assembler fills in.

use std::fmt;
use serde::{Deserialize, Serialize};

/// Semantic category of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    DataMovement,
    Arithmetic,
    Logic,
    Comparison,
    ControlFlow,
    Conditional,
    Marker,
    List,
    Io,
    Utility,
}

/// What an operand slot names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// Register index (0..4096).
    Register,
    /// Raw immediate word (int or float bits).
    Immediate,
    /// Label id; resolved to a PC by the assembler for jumps.
    Label,
    /// Function id; resolved to a PC by the assembler for calls.
    Function,
    /// List id (0..128).
    List,
    /// Output id tagged onto collected results.
    Output,
    /// Key into the external preload source.
    PreloadKey,
}

/// Bytecode opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u32)]
pub enum OpCode {
    // ═══════════════════════════════════════════════════════════════════
    // Utility & Markers
    // ═══════════════════════════════════════════════════════════════════

    /// No operation.
    Nop = 0,
    /// Terminate the current context.
    Halt = 1,
    /// Label definition marker: `LABEL id`.
    Label = 2,
    /// Function entry marker: `FUNCTION id`.
    Function = 3,

    // ═══════════════════════════════════════════════════════════════════
    // Data Movement
    // ═══════════════════════════════════════════════════════════════════

    /// `LOAD_INT dst imm`
    LoadInt = 10,
    /// `LOAD_FLOAT dst bits`
    LoadFloat = 11,
    /// `MOVE dst src`
    Move = 12,
    /// `CLEAR dst` sets integer zero.
    Clear = 13,
    /// `ROUND dst src`: float to nearest int, ties toward +inf.
    Round = 14,
    /// `INT_TO_FLOAT dst src`
    IntToFloat = 15,

    // ═══════════════════════════════════════════════════════════════════
    // Arithmetic
    // ═══════════════════════════════════════════════════════════════════

    AddInt = 20,
    SubInt = 21,
    MulInt = 22,
    /// Division by zero yields 0.
    DivInt = 23,
    /// Modulo by zero yields 0.
    ModInt = 24,
    AddFloat = 25,
    SubFloat = 26,
    MulFloat = 27,
    /// IEEE division; never traps.
    DivFloat = 28,
    SqrtFloat = 29,

    // ═══════════════════════════════════════════════════════════════════
    // Logic
    // ═══════════════════════════════════════════════════════════════════

    And = 30,
    Or = 31,
    Xor = 32,
    Not = 33,

    // ═══════════════════════════════════════════════════════════════════
    // Comparison (writes integer 1 or 0)
    // ═══════════════════════════════════════════════════════════════════

    EqInt = 40,
    NeqInt = 41,
    LtInt = 42,
    GtInt = 43,
    LteInt = 44,
    GteInt = 45,
    EqFloat = 46,
    NeqFloat = 47,
    LtFloat = 48,
    GtFloat = 49,
    LteFloat = 50,
    GteFloat = 51,

    // ═══════════════════════════════════════════════════════════════════
    // Control Flow
    // ═══════════════════════════════════════════════════════════════════

    /// `JUMP label`
    Jump = 60,
    /// `JUMP_IF_ZERO reg label`
    JumpIfZero = 61,
    /// `JUMP_IF_NOT_ZERO reg label`
    JumpIfNotZero = 62,
    /// `CALL function`
    Call = 63,
    /// Pop a frame, or terminate the context on an empty call stack.
    Return = 64,

    // ═══════════════════════════════════════════════════════════════════
    // Conditional Blocks
    // ═══════════════════════════════════════════════════════════════════

    /// `IF reg` (+ false-target)
    If = 65,
    /// `ELSE` (+ end-target)
    Else = 66,
    #[serde(rename = "ENDIF")]
    EndIf = 67,

    // ═══════════════════════════════════════════════════════════════════
    // Lists
    // ═══════════════════════════════════════════════════════════════════

    /// `LIST_DECLARE list`
    ListDeclare = 70,
    /// `LIST_PRELOAD list key`; host-side only, becomes NOPs.
    ListPreload = 71,
    /// `LIST_APPEND list value_reg`
    ListAppend = 72,
    /// `LIST_READ dst list index_reg`
    ListRead = 73,
    /// `LIST_REMOVE list index_reg`
    ListRemove = 74,
    /// `LIST_EDIT list index_reg value_reg`
    ListEdit = 75,
    /// `LIST_LENGTH dst list`
    ListLength = 76,

    // ═══════════════════════════════════════════════════════════════════
    // Output
    // ═══════════════════════════════════════════════════════════════════

    /// `OUTPUT_INT output reg`
    OutputInt = 80,
    /// `OUTPUT_FLOAT output reg`
    OutputFloat = 81,
    /// `OUTPUT_LIST output list`
    OutputList = 82,

    /// `RANDOM dst`: uniform float in [0, 1].
    Random = 90,
}

use OperandKind::*;

impl OpCode {
    /// Every opcode, in id order.
    pub const ALL: &'static [OpCode] = &[
        OpCode::Nop, OpCode::Halt, OpCode::Label, OpCode::Function,
        OpCode::LoadInt, OpCode::LoadFloat, OpCode::Move, OpCode::Clear, OpCode::Round, OpCode::IntToFloat,
        OpCode::AddInt, OpCode::SubInt, OpCode::MulInt, OpCode::DivInt, OpCode::ModInt,
        OpCode::AddFloat, OpCode::SubFloat, OpCode::MulFloat, OpCode::DivFloat, OpCode::SqrtFloat,
        OpCode::And, OpCode::Or, OpCode::Xor, OpCode::Not,
        OpCode::EqInt, OpCode::NeqInt, OpCode::LtInt, OpCode::GtInt, OpCode::LteInt, OpCode::GteInt,
        OpCode::EqFloat, OpCode::NeqFloat, OpCode::LtFloat, OpCode::GtFloat, OpCode::LteFloat, OpCode::GteFloat,
        OpCode::Jump, OpCode::JumpIfZero, OpCode::JumpIfNotZero, OpCode::Call, OpCode::Return,
        OpCode::If, OpCode::Else, OpCode::EndIf,
        OpCode::ListDeclare, OpCode::ListPreload, OpCode::ListAppend, OpCode::ListRead,
        OpCode::ListRemove, OpCode::ListEdit, OpCode::ListLength,
        OpCode::OutputInt, OpCode::OutputFloat, OpCode::OutputList,
        OpCode::Random,
    ];

    /// Numeric id written as the first word of the instruction.
    #[inline]
    pub fn id(self) -> u32 {
        self as u32
    }

    /// Decode an opcode word.
    pub fn from_id(id: u32) -> Option<OpCode> {
        let op = match id {
            0 => OpCode::Nop,
            1 => OpCode::Halt,
            2 => OpCode::Label,
            3 => OpCode::Function,
            10 => OpCode::LoadInt,
            11 => OpCode::LoadFloat,
            12 => OpCode::Move,
            13 => OpCode::Clear,
            14 => OpCode::Round,
            15 => OpCode::IntToFloat,
            20 => OpCode::AddInt,
            21 => OpCode::SubInt,
            22 => OpCode::MulInt,
            23 => OpCode::DivInt,
            24 => OpCode::ModInt,
            25 => OpCode::AddFloat,
            26 => OpCode::SubFloat,
            27 => OpCode::MulFloat,
            28 => OpCode::DivFloat,
            29 => OpCode::SqrtFloat,
            30 => OpCode::And,
            31 => OpCode::Or,
            32 => OpCode::Xor,
            33 => OpCode::Not,
            40 => OpCode::EqInt,
            41 => OpCode::NeqInt,
            42 => OpCode::LtInt,
            43 => OpCode::GtInt,
            44 => OpCode::LteInt,
            45 => OpCode::GteInt,
            46 => OpCode::EqFloat,
            47 => OpCode::NeqFloat,
            48 => OpCode::LtFloat,
            49 => OpCode::GtFloat,
            50 => OpCode::LteFloat,
            51 => OpCode::GteFloat,
            60 => OpCode::Jump,
            61 => OpCode::JumpIfZero,
            62 => OpCode::JumpIfNotZero,
            63 => OpCode::Call,
            64 => OpCode::Return,
            65 => OpCode::If,
            66 => OpCode::Else,
            67 => OpCode::EndIf,
            70 => OpCode::ListDeclare,
            71 => OpCode::ListPreload,
            72 => OpCode::ListAppend,
            73 => OpCode::ListRead,
            74 => OpCode::ListRemove,
            75 => OpCode::ListEdit,
            76 => OpCode::ListLength,
            80 => OpCode::OutputInt,
            81 => OpCode::OutputFloat,
            82 => OpCode::OutputList,
            90 => OpCode::Random,
            _ => return None,
        };
        Some(op)
    }

    /// Get the mnemonic of this opcode.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Nop => "NOP",
            OpCode::Halt => "HALT",
            OpCode::Label => "LABEL",
            OpCode::Function => "FUNCTION",
            OpCode::LoadInt => "LOAD_INT",
            OpCode::LoadFloat => "LOAD_FLOAT",
            OpCode::Move => "MOVE",
            OpCode::Clear => "CLEAR",
            OpCode::Round => "ROUND",
            OpCode::IntToFloat => "INT_TO_FLOAT",
            OpCode::AddInt => "ADD_INT",
            OpCode::SubInt => "SUB_INT",
            OpCode::MulInt => "MUL_INT",
            OpCode::DivInt => "DIV_INT",
            OpCode::ModInt => "MOD_INT",
            OpCode::AddFloat => "ADD_FLOAT",
            OpCode::SubFloat => "SUB_FLOAT",
            OpCode::MulFloat => "MUL_FLOAT",
            OpCode::DivFloat => "DIV_FLOAT",
            OpCode::SqrtFloat => "SQRT_FLOAT",
            OpCode::And => "AND",
            OpCode::Or => "OR",
            OpCode::Xor => "XOR",
            OpCode::Not => "NOT",
            OpCode::EqInt => "EQ_INT",
            OpCode::NeqInt => "NEQ_INT",
            OpCode::LtInt => "LT_INT",
            OpCode::GtInt => "GT_INT",
            OpCode::LteInt => "LTE_INT",
            OpCode::GteInt => "GTE_INT",
            OpCode::EqFloat => "EQ_FLOAT",
            OpCode::NeqFloat => "NEQ_FLOAT",
            OpCode::LtFloat => "LT_FLOAT",
            OpCode::GtFloat => "GT_FLOAT",
            OpCode::LteFloat => "LTE_FLOAT",
            OpCode::GteFloat => "GTE_FLOAT",
            OpCode::Jump => "JUMP",
            OpCode::JumpIfZero => "JUMP_IF_ZERO",
            OpCode::JumpIfNotZero => "JUMP_IF_NOT_ZERO",
            OpCode::Call => "CALL",
            OpCode::Return => "RETURN",
            OpCode::If => "IF",
            OpCode::Else => "ELSE",
            OpCode::EndIf => "ENDIF",
            OpCode::ListDeclare => "LIST_DECLARE",
            OpCode::ListPreload => "LIST_PRELOAD",
            OpCode::ListAppend => "LIST_APPEND",
            OpCode::ListRead => "LIST_READ",
            OpCode::ListRemove => "LIST_REMOVE",
            OpCode::ListEdit => "LIST_EDIT",
            OpCode::ListLength => "LIST_LENGTH",
            OpCode::OutputInt => "OUTPUT_INT",
            OpCode::OutputFloat => "OUTPUT_FLOAT",
            OpCode::OutputList => "OUTPUT_LIST",
            OpCode::Random => "RANDOM",
        }
    }

    /// Look up an opcode by mnemonic (case-insensitive).
    pub fn from_name(name: &str) -> Option<OpCode> {
        OpCode::ALL
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(name))
    }

    pub fn category(&self) -> Category {
        match self {
            OpCode::Nop | OpCode::Random => Category::Utility,
            OpCode::Label | OpCode::Function => Category::Marker,
            OpCode::LoadInt | OpCode::LoadFloat | OpCode::Move |
            OpCode::Clear | OpCode::Round | OpCode::IntToFloat => Category::DataMovement,
            OpCode::AddInt | OpCode::SubInt | OpCode::MulInt | OpCode::DivInt | OpCode::ModInt |
            OpCode::AddFloat | OpCode::SubFloat | OpCode::MulFloat | OpCode::DivFloat |
            OpCode::SqrtFloat => Category::Arithmetic,
            OpCode::And | OpCode::Or | OpCode::Xor | OpCode::Not => Category::Logic,
            OpCode::EqInt | OpCode::NeqInt | OpCode::LtInt | OpCode::GtInt |
            OpCode::LteInt | OpCode::GteInt |
            OpCode::EqFloat | OpCode::NeqFloat | OpCode::LtFloat | OpCode::GtFloat |
            OpCode::LteFloat | OpCode::GteFloat => Category::Comparison,
            OpCode::Halt | OpCode::Jump | OpCode::JumpIfZero | OpCode::JumpIfNotZero |
            OpCode::Call | OpCode::Return => Category::ControlFlow,
            OpCode::If | OpCode::Else | OpCode::EndIf => Category::Conditional,
            OpCode::ListDeclare | OpCode::ListPreload | OpCode::ListAppend | OpCode::ListRead |
            OpCode::ListRemove | OpCode::ListEdit | OpCode::ListLength => Category::List,
            OpCode::OutputInt | OpCode::OutputFloat | OpCode::OutputList => Category::Io,
        }
    }

    /// Operands supplied in the symbolic program, in slot order.
    pub fn operands(&self) -> &'static [OperandKind] {
        match self {
            OpCode::Nop | OpCode::Halt | OpCode::Return |
            OpCode::Else | OpCode::EndIf => &[],
            OpCode::Label => &[Label],
            OpCode::Function => &[Function],
            OpCode::LoadInt | OpCode::LoadFloat => &[Register, Immediate],
            OpCode::Move | OpCode::Round | OpCode::IntToFloat |
            OpCode::SqrtFloat | OpCode::Not => &[Register, Register],
            OpCode::Clear | OpCode::Random => &[Register],
            OpCode::AddInt | OpCode::SubInt | OpCode::MulInt | OpCode::DivInt | OpCode::ModInt |
            OpCode::AddFloat | OpCode::SubFloat | OpCode::MulFloat | OpCode::DivFloat |
            OpCode::And | OpCode::Or | OpCode::Xor |
            OpCode::EqInt | OpCode::NeqInt | OpCode::LtInt | OpCode::GtInt |
            OpCode::LteInt | OpCode::GteInt |
            OpCode::EqFloat | OpCode::NeqFloat | OpCode::LtFloat | OpCode::GtFloat |
            OpCode::LteFloat | OpCode::GteFloat => &[Register, Register, Register],
            OpCode::Jump => &[Label],
            OpCode::JumpIfZero | OpCode::JumpIfNotZero => &[Register, Label],
            OpCode::Call => &[Function],
            OpCode::If => &[Register],
            OpCode::ListDeclare => &[List],
            OpCode::ListPreload => &[List, PreloadKey],
            OpCode::ListAppend => &[List, Register],
            OpCode::ListRead => &[Register, List, Register],
            OpCode::ListRemove => &[List, Register],
            OpCode::ListEdit => &[List, Register, Register],
            OpCode::ListLength => &[Register, List],
            OpCode::OutputInt | OpCode::OutputFloat => &[Output, Register],
            OpCode::OutputList => &[Output, List],
        }
    }

    /// Number of operands a host supplies.
    #[inline]
    pub fn arity(&self) -> usize {
        self.operands().len()
    }

    /// Encoded width in words, opcode word included.
    pub fn width(&self) -> usize {
        match self {
            // assembler-filled skip target
            OpCode::If | OpCode::Else => self.arity() + 2,
            _ => self.arity() + 1,
        }
    }

    /// Label and function markers: dispatch only advances the PC.
    pub fn is_marker(&self) -> bool {
        self.category() == Category::Marker
    }

    /// Instructions whose symbolic target is patched to an absolute PC.
    pub fn is_branch(&self) -> bool {
        matches!(self, OpCode::Jump | OpCode::JumpIfZero | OpCode::JumpIfNotZero | OpCode::Call)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
