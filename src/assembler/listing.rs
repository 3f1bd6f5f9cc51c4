//! Human-readable listing of a word array.

use std::fmt::Write;

use crate::core::Word;
use crate::opcode::{OpCode, OperandKind};
use super::Program;

/// Render one instruction per line as `pc: MNEMONIC operands`.
///
/// Register operands print as `rN`, float immediates of LOAD_FLOAT print as
/// floats, hidden skip targets print as `-> pc`. Words that are not a known
/// opcode print as `.word 0x...` and the walk resumes at the next word.
pub fn disassemble(program: &Program) -> String {
    let words = program.words();
    let mut out = String::new();
    let mut pc = 0usize;

    while pc < words.len() {
        let raw = words[pc].bits();
        let Some(op) = OpCode::from_id(raw) else {
            let _ = writeln!(out, "{:>5}: .word {:#010x}", pc, raw);
            pc += 1;
            continue;
        };

        let width = op.width();
        if pc + width > words.len() {
            let _ = writeln!(out, "{:>5}: {} <truncated>", pc, op.name());
            break;
        }

        let operands = &words[pc + 1..pc + width];
        let _ = writeln!(out, "{:>5}: {}", pc, render(op, operands).trim_end());
        pc += width;
    }

    out
}

fn render(op: OpCode, operands: &[Word]) -> String {
    let mut line = format!("{:<16}", op.name());
    for (slot, word) in operands.iter().enumerate() {
        let text = match op.operands().get(slot) {
            Some(OperandKind::Register) => format!("r{}", word.bits()),
            Some(OperandKind::Immediate) if op == OpCode::LoadFloat => format!("{:?}", word.as_float()),
            Some(OperandKind::Immediate) => word.as_int().to_string(),
            Some(OperandKind::Label) | Some(OperandKind::Function) if op.is_branch() => {
                format!("@{}", word.bits())
            }
            Some(OperandKind::List) => format!("list{}", word.bits()),
            Some(OperandKind::Output) => format!("#{}", word.bits()),
            Some(_) => word.bits().to_string(),
            None => format!("-> {}", word.bits()),
        };
        line.push(' ');
        line.push_str(&text);
    }
    line
}
