//! Symbolic program input.
//!
//! A symbolic program is an ordered list of `(opcode, operands)` entries in
//! which jumps and calls still name label/function ids and markers are
//! ordinary entries. Float immediates arrive as raw bits; `ProgramBuilder`
//! does that conversion for hosts writing programs in Rust.

use serde::{Deserialize, Serialize};

use crate::core::{VmResult, Word};
use crate::opcode::OpCode;
use super::{Assembler, Assembly};

/// One entry of a symbolic program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolicInstr {
    pub op: OpCode,
    #[serde(default)]
    pub operands: Vec<Word>,
}

impl SymbolicInstr {
    pub fn new(op: OpCode, operands: &[Word]) -> Self {
        Self { op, operands: operands.to_vec() }
    }

    pub fn bare(op: OpCode) -> Self {
        Self { op, operands: Vec::new() }
    }
}

/// Parse a JSON array of symbolic instructions, e.g.
/// `[{"op": "LOAD_INT", "operands": [0, 5]}, {"op": "HALT"}]`.
pub fn parse_symbolic_json(text: &str) -> serde_json::Result<Vec<SymbolicInstr>> {
    serde_json::from_str(text)
}

#[inline]
fn r(index: u32) -> Word {
    Word::from_bits(index)
}

/// Fluent construction of symbolic programs.
#[derive(Debug, Clone, Default)]
pub struct ProgramBuilder {
    instrs: Vec<SymbolicInstr>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append any instruction verbatim (no arity check until assembly).
    pub fn op(mut self, op: OpCode, operands: &[Word]) -> Self {
        self.instrs.push(SymbolicInstr::new(op, operands));
        self
    }

    pub fn nop(self) -> Self {
        self.op(OpCode::Nop, &[])
    }

    pub fn halt(self) -> Self {
        self.op(OpCode::Halt, &[])
    }

    pub fn label(self, id: u32) -> Self {
        self.op(OpCode::Label, &[r(id)])
    }

    pub fn function(self, id: u32) -> Self {
        self.op(OpCode::Function, &[r(id)])
    }

    pub fn load_int(self, dst: u32, value: i32) -> Self {
        self.op(OpCode::LoadInt, &[r(dst), Word::from_int(value)])
    }

    pub fn load_float(self, dst: u32, value: f32) -> Self {
        self.op(OpCode::LoadFloat, &[r(dst), Word::from_float(value)])
    }

    pub fn mov(self, dst: u32, src: u32) -> Self {
        self.op(OpCode::Move, &[r(dst), r(src)])
    }

    pub fn clear(self, dst: u32) -> Self {
        self.op(OpCode::Clear, &[r(dst)])
    }

    /// Two-register instruction: `op dst src`.
    pub fn unary(self, op: OpCode, dst: u32, src: u32) -> Self {
        self.op(op, &[r(dst), r(src)])
    }

    /// Three-register instruction: `op dst a b`.
    pub fn binary(self, op: OpCode, dst: u32, a: u32, b: u32) -> Self {
        self.op(op, &[r(dst), r(a), r(b)])
    }

    pub fn jump(self, label: u32) -> Self {
        self.op(OpCode::Jump, &[r(label)])
    }

    pub fn jump_if_zero(self, reg: u32, label: u32) -> Self {
        self.op(OpCode::JumpIfZero, &[r(reg), r(label)])
    }

    pub fn jump_if_not_zero(self, reg: u32, label: u32) -> Self {
        self.op(OpCode::JumpIfNotZero, &[r(reg), r(label)])
    }

    pub fn call(self, function: u32) -> Self {
        self.op(OpCode::Call, &[r(function)])
    }

    pub fn ret(self) -> Self {
        self.op(OpCode::Return, &[])
    }

    pub fn if_(self, reg: u32) -> Self {
        self.op(OpCode::If, &[r(reg)])
    }

    pub fn else_(self) -> Self {
        self.op(OpCode::Else, &[])
    }

    pub fn end_if(self) -> Self {
        self.op(OpCode::EndIf, &[])
    }

    pub fn list_declare(self, list: u32) -> Self {
        self.op(OpCode::ListDeclare, &[r(list)])
    }

    pub fn list_preload(self, list: u32, key: u32) -> Self {
        self.op(OpCode::ListPreload, &[r(list), r(key)])
    }

    pub fn list_append(self, list: u32, value_reg: u32) -> Self {
        self.op(OpCode::ListAppend, &[r(list), r(value_reg)])
    }

    pub fn list_read(self, dst: u32, list: u32, index_reg: u32) -> Self {
        self.op(OpCode::ListRead, &[r(dst), r(list), r(index_reg)])
    }

    pub fn list_remove(self, list: u32, index_reg: u32) -> Self {
        self.op(OpCode::ListRemove, &[r(list), r(index_reg)])
    }

    pub fn list_edit(self, list: u32, index_reg: u32, value_reg: u32) -> Self {
        self.op(OpCode::ListEdit, &[r(list), r(index_reg), r(value_reg)])
    }

    pub fn list_length(self, dst: u32, list: u32) -> Self {
        self.op(OpCode::ListLength, &[r(dst), r(list)])
    }

    pub fn output_int(self, output: u32, reg: u32) -> Self {
        self.op(OpCode::OutputInt, &[r(output), r(reg)])
    }

    pub fn output_float(self, output: u32, reg: u32) -> Self {
        self.op(OpCode::OutputFloat, &[r(output), r(reg)])
    }

    pub fn output_list(self, output: u32, list: u32) -> Self {
        self.op(OpCode::OutputList, &[r(output), r(list)])
    }

    pub fn random(self, dst: u32) -> Self {
        self.op(OpCode::Random, &[r(dst)])
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    pub fn build(self) -> Vec<SymbolicInstr> {
        self.instrs
    }

    /// Shorthand for `Assembler::new().assemble(&self.build())`.
    pub fn assemble(self) -> VmResult<Assembly> {
        Assembler::new().assemble(&self.instrs)
    }
}
