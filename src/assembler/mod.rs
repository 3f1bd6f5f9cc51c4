//! Two-pass assembler/linker for tcscl.
//!
//! # Passes
//!
//! 1. **Scan**: walk the symbolic sequence with a running PC (the sum of
//!    encoded widths so far). Check operand arity, record label and function
//!    markers (`id -> marker_pc + width`) and pair every IF with its ELSE and
//!    ENDIF to learn the skip targets.
//! 2. **Patch**: emit words, replacing jump/call targets with absolute PCs
//!    and filling the conditional skip targets.
//! 3. **Preload binding**: each LIST_PRELOAD becomes a side-table entry and
//!    is emitted as NOP words of the same width, so no PC moves.
//!
//! Assembly is a pure function of its input: identical symbolic programs
//! produce identical word arrays.

pub mod listing;
pub mod program;
pub mod symbolic;

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, instrument};

use crate::core::{ErrorCollector, Location, SymbolKind, VmError, VmResult, Word};
use crate::opcode::OpCode;

pub use listing::disassemble;
pub use program::{Assembly, PreloadBinding, Program};
pub use symbolic::{parse_symbolic_json, ProgramBuilder, SymbolicInstr};

/// Highest valid function id.
pub const MAX_FUNCTION_ID: u32 = 511;

/// An IF block still waiting for its ENDIF during the scan.
#[derive(Debug, Clone, Copy)]
struct OpenBlock {
    if_index: usize,
    if_pc: u32,
    else_index: Option<usize>,
}

/// Everything pass 1 learns about the symbolic program.
#[derive(Debug, Default)]
struct Layout {
    pcs: Vec<u32>,
    total_words: u32,
    labels: BTreeMap<u32, u32>,
    functions: BTreeMap<u32, u32>,
    /// Skip target per IF/ELSE instruction index.
    skip_targets: HashMap<usize, u32>,
}

/// The tcscl assembler.
#[derive(Debug, Clone, Default)]
pub struct Assembler {
    _private: (),
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a symbolic program, returning the first structural fault.
    #[instrument(skip_all, fields(instrs = instrs.len()))]
    pub fn assemble(&self, instrs: &[SymbolicInstr]) -> VmResult<Assembly> {
        let mut errors = ErrorCollector::new();
        let layout = self.scan(instrs, &mut errors);
        errors.into_first()?;

        let mut errors = ErrorCollector::new();
        let assembly = self.patch(instrs, &layout, &mut errors);
        errors.into_first()?;

        debug!(
            words = assembly.program.len(),
            labels = assembly.program.labels().len(),
            functions = assembly.program.functions().len(),
            preloads = assembly.preloads.len(),
            "assembled program"
        );
        Ok(assembly)
    }

    /// Assemble and report every structural fault instead of the first.
    pub fn check(&self, instrs: &[SymbolicInstr]) -> Vec<VmError> {
        let mut errors = ErrorCollector::new();
        let layout = self.scan(instrs, &mut errors);
        if !errors.has_errors() {
            self.patch(instrs, &layout, &mut errors);
        }
        errors.errors().to_vec()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Pass 1: scan
    // ═══════════════════════════════════════════════════════════════════

    fn scan(&self, instrs: &[SymbolicInstr], errors: &mut ErrorCollector) -> Layout {
        let mut layout = Layout {
            pcs: Vec::with_capacity(instrs.len()),
            ..Default::default()
        };
        let mut open: Vec<OpenBlock> = Vec::new();
        let mut pc: u32 = 0;

        for (index, instr) in instrs.iter().enumerate() {
            let op = instr.op;
            let width = op.width() as u32;
            let location = Location::new(index, pc);
            layout.pcs.push(pc);

            if instr.operands.len() != op.arity() {
                errors.add_error(VmError::OperandArityMismatch {
                    opcode: op.name(),
                    expected: op.arity(),
                    found: instr.operands.len(),
                    location,
                });
                pc += width;
                continue;
            }

            match op {
                OpCode::Label => {
                    let id = instr.operands[0].bits();
                    define(&mut layout.labels, SymbolKind::Label, id, pc + width, location, errors);
                }
                OpCode::Function => {
                    let id = instr.operands[0].bits();
                    if id > MAX_FUNCTION_ID {
                        errors.add_error(VmError::SymbolOutOfRange {
                            kind: SymbolKind::Function,
                            id,
                            max: MAX_FUNCTION_ID,
                            location,
                        });
                    } else {
                        define(&mut layout.functions, SymbolKind::Function, id, pc + width, location, errors);
                    }
                }
                OpCode::If => open.push(OpenBlock { if_index: index, if_pc: pc, else_index: None }),
                OpCode::Else => match open.last_mut() {
                    None => errors.add_error(unbalanced("ELSE without a matching IF", location)),
                    Some(block) if block.else_index.is_some() => {
                        errors.add_error(unbalanced("second ELSE in one IF block", location))
                    }
                    Some(block) => {
                        block.else_index = Some(index);
                        // a false IF resumes right after the ELSE
                        layout.skip_targets.insert(block.if_index, pc + width);
                    }
                },
                OpCode::EndIf => match open.pop() {
                    None => errors.add_error(unbalanced("ENDIF without a matching IF", location)),
                    Some(block) => {
                        let after = pc + width;
                        match block.else_index {
                            Some(else_index) => {
                                layout.skip_targets.insert(else_index, after);
                            }
                            None => {
                                layout.skip_targets.insert(block.if_index, after);
                            }
                        }
                    }
                },
                _ => {}
            }

            pc += width;
        }

        for block in open {
            errors.add_error(unbalanced("IF block is never closed", Location::new(block.if_index, block.if_pc)));
        }

        layout.total_words = pc;
        layout
    }

    // ═══════════════════════════════════════════════════════════════════
    // Pass 2: patch (and preload binding)
    // ═══════════════════════════════════════════════════════════════════

    fn patch(&self, instrs: &[SymbolicInstr], layout: &Layout, errors: &mut ErrorCollector) -> Assembly {
        let mut words: Vec<Word> = Vec::with_capacity(layout.total_words as usize);
        let mut preloads = Vec::new();

        for (index, instr) in instrs.iter().enumerate() {
            let op = instr.op;
            let pc = layout.pcs[index];
            let location = Location::new(index, pc);
            let operands = &instr.operands;

            match op {
                OpCode::Jump | OpCode::JumpIfZero | OpCode::JumpIfNotZero => {
                    words.push(Word::from_bits(op.id()));
                    words.extend_from_slice(&operands[..operands.len() - 1]);
                    let id = operands[operands.len() - 1].bits();
                    let target = resolve(&layout.labels, SymbolKind::Label, id, location, errors);
                    words.push(Word::from_bits(target));
                }
                OpCode::Call => {
                    words.push(Word::from_bits(op.id()));
                    let id = operands[0].bits();
                    let target = resolve(&layout.functions, SymbolKind::Function, id, location, errors);
                    words.push(Word::from_bits(target));
                }
                OpCode::If | OpCode::Else => {
                    words.push(Word::from_bits(op.id()));
                    words.extend_from_slice(operands);
                    // pairing succeeded in pass 1, so every block has a target
                    let target = layout.skip_targets.get(&index).copied().unwrap_or(pc + op.width() as u32);
                    words.push(Word::from_bits(target));
                }
                OpCode::ListPreload => {
                    preloads.push(PreloadBinding {
                        list: operands[0].bits(),
                        key: operands[1].bits(),
                        pc,
                    });
                    words.extend(std::iter::repeat(Word::from_bits(OpCode::Nop.id())).take(op.width()));
                }
                _ => {
                    words.push(Word::from_bits(op.id()));
                    words.extend_from_slice(operands);
                }
            }
        }

        debug_assert_eq!(words.len(), layout.total_words as usize);

        Assembly {
            program: Program::new(words, layout.labels.clone(), layout.functions.clone()),
            preloads,
        }
    }
}

fn define(
    table: &mut BTreeMap<u32, u32>,
    kind: SymbolKind,
    id: u32,
    target: u32,
    location: Location,
    errors: &mut ErrorCollector,
) {
    if let Some(&first) = table.get(&id) {
        errors.add_error(VmError::DuplicateSymbol {
            kind,
            id,
            first_pc: first,
            location,
        });
    } else {
        table.insert(id, target);
    }
}

fn resolve(
    table: &BTreeMap<u32, u32>,
    kind: SymbolKind,
    id: u32,
    location: Location,
    errors: &mut ErrorCollector,
) -> u32 {
    match table.get(&id) {
        Some(&pc) => pc,
        None => {
            errors.add_error(VmError::UnresolvedSymbol { kind, id, location });
            0
        }
    }
}

fn unbalanced(message: &str, location: Location) -> VmError {
    VmError::UnbalancedConditional {
        message: message.to_string(),
        location,
    }
}
