//! Execution context: fetch, decode, dispatch.
//!
//! A context owns its PC, call stack, random stream and instruction count.
//! Registers, lists and the output collector are borrowed shared, so any
//! number of contexts can run over the same `Shared` view at once.

use tracing::{debug, trace, warn};

use crate::assembler::Program;
use crate::core::{
    CallStack, ContextId, ListStore, Location, OutputCollector, OutputEntry, OutputValue,
    RandomStream, RegisterFile, VmError, VmResult, Word,
};
use crate::opcode::OpCode;
use super::traits::{arithmetic, compare, ArithOp, CmpOp, FloatOps, IntOps};

/// Terminal status of a context.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextStatus {
    /// Stopped by HALT, a top-level RETURN or running off the end.
    Halted,
    /// Stopped by a runtime fault. Sibling contexts are unaffected.
    Faulted(VmError),
}

impl ContextStatus {
    pub fn is_halted(&self) -> bool {
        matches!(self, ContextStatus::Halted)
    }

    pub fn fault(&self) -> Option<&VmError> {
        match self {
            ContextStatus::Faulted(e) => Some(e),
            ContextStatus::Halted => None,
        }
    }
}

/// What one context did.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextReport {
    pub context: ContextId,
    pub status: ContextStatus,
    /// Instructions dispatched, markers and no-ops included.
    pub instructions: u64,
}

/// The run-wide state every context sees.
#[derive(Debug, Clone, Copy)]
pub struct Shared<'a> {
    pub registers: &'a RegisterFile,
    pub lists: &'a ListStore,
    pub output: &'a OutputCollector,
}

/// Result of dispatching one instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Halt,
}

/// One independent instruction stream.
#[derive(Debug)]
pub struct Context<'a> {
    id: ContextId,
    program: &'a Program,
    shared: Shared<'a>,
    pc: u32,
    stack: CallStack,
    random: RandomStream,
    instructions: u64,
    limit: Option<u64>,
}

impl<'a> Context<'a> {
    /// A context about to execute `program` from `entry`.
    pub fn new(id: ContextId, program: &'a Program, shared: Shared<'a>, entry: u32, seed: u64) -> Self {
        Self {
            id,
            program,
            shared,
            pc: entry,
            stack: CallStack::new(),
            random: RandomStream::for_context(seed, id.ordinal()),
            instructions: 0,
            limit: None,
        }
    }

    /// Fault once `limit` instructions have been dispatched.
    pub fn with_instruction_limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn call_depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn instructions(&self) -> u64 {
        self.instructions
    }

    /// Run until the context halts or faults.
    pub fn run(mut self) -> ContextReport {
        debug!(context = %self.id, entry = self.pc, "context started");
        let status = loop {
            match self.step() {
                Ok(Flow::Continue) => {}
                Ok(Flow::Halt) => {
                    debug!(context = %self.id, instructions = self.instructions, "context halted");
                    break ContextStatus::Halted;
                }
                Err(e) => {
                    warn!(context = %self.id, code = e.code(), error = %e, "context faulted");
                    break ContextStatus::Faulted(e);
                }
            }
        };

        ContextReport {
            context: self.id,
            status,
            instructions: self.instructions,
        }
    }

    /// Dispatch the instruction at PC.
    fn step(&mut self) -> VmResult<Flow> {
        let pc = self.pc;
        let program = self.program;
        let words = program.words();
        let start = pc as usize;

        // Running off the end is an implicit halt.
        if start >= words.len() {
            return Ok(Flow::Halt);
        }

        let location = Location::at_pc(pc);
        let raw = words[start].bits();
        let op = OpCode::from_id(raw).ok_or_else(|| VmError::UnknownOpcode { word: raw, location })?;

        let width = op.width();
        let available = words.len() - start;
        if width > available {
            return Err(VmError::TruncatedInstruction {
                opcode: op.name(),
                width,
                available,
                location,
            });
        }

        if let Some(limit) = self.limit {
            if self.instructions >= limit {
                return Err(VmError::InstructionLimitExceeded { limit, location });
            }
        }
        self.instructions += 1;

        let operands = &words[start + 1..start + width];
        self.pc = pc + width as u32;
        trace!(context = %self.id, pc, op = op.name(), "dispatch");

        self.dispatch(op, operands, pc)
    }

    #[inline]
    fn read(&self, reg: Word, pc: u32) -> VmResult<Word> {
        self.shared.registers.read(reg.bits(), pc)
    }

    #[inline]
    fn write(&self, reg: Word, value: Word, pc: u32) -> VmResult<()> {
        self.shared.registers.write(reg.bits(), value, pc)
    }

    fn binary_int(&self, op: ArithOp, o: &[Word], pc: u32) -> VmResult<()> {
        let result = arithmetic::<IntOps>(op, self.read(o[1], pc)?, self.read(o[2], pc)?);
        self.write(o[0], result, pc)
    }

    fn binary_float(&self, op: ArithOp, o: &[Word], pc: u32) -> VmResult<()> {
        let result = arithmetic::<FloatOps>(op, self.read(o[1], pc)?, self.read(o[2], pc)?);
        self.write(o[0], result, pc)
    }

    fn compare_int(&self, op: CmpOp, o: &[Word], pc: u32) -> VmResult<()> {
        let result = compare::<IntOps>(op, self.read(o[1], pc)?, self.read(o[2], pc)?);
        self.write(o[0], result, pc)
    }

    fn compare_float(&self, op: CmpOp, o: &[Word], pc: u32) -> VmResult<()> {
        let result = compare::<FloatOps>(op, self.read(o[1], pc)?, self.read(o[2], pc)?);
        self.write(o[0], result, pc)
    }

    fn emit(&self, id: Word, value: OutputValue) {
        self.shared.output.append(OutputEntry::new(id.bits(), value, self.id));
    }

    fn dispatch(&mut self, op: OpCode, o: &[Word], pc: u32) -> VmResult<Flow> {
        let lists = self.shared.lists;

        match op {
            // ═══════════════════════════════════════════════════════════
            // Utility and markers
            // ═══════════════════════════════════════════════════════════
            OpCode::Nop | OpCode::Label | OpCode::Function | OpCode::EndIf => {}
            // Only reachable in raw bytecode; the assembler rewrites it.
            OpCode::ListPreload => {}
            OpCode::Halt => return Ok(Flow::Halt),
            OpCode::Random => {
                let value = self.random.next_f32();
                self.write(o[0], Word::from_float(value), pc)?;
            }

            // ═══════════════════════════════════════════════════════════
            // Data movement
            // ═══════════════════════════════════════════════════════════
            OpCode::LoadInt | OpCode::LoadFloat => self.write(o[0], o[1], pc)?,
            OpCode::Move => {
                let value = self.read(o[1], pc)?;
                self.write(o[0], value, pc)?;
            }
            OpCode::Clear => self.write(o[0], Word::ZERO, pc)?,
            OpCode::Round => {
                let value = self.read(o[1], pc)?.as_float();
                self.write(o[0], Word::from_int(round_half_up(value)), pc)?;
            }
            OpCode::IntToFloat => {
                let value = self.read(o[1], pc)?.as_int();
                self.write(o[0], Word::from_float(value as f32), pc)?;
            }

            // ═══════════════════════════════════════════════════════════
            // Arithmetic
            // ═══════════════════════════════════════════════════════════
            OpCode::AddInt => self.binary_int(ArithOp::Add, o, pc)?,
            OpCode::SubInt => self.binary_int(ArithOp::Sub, o, pc)?,
            OpCode::MulInt => self.binary_int(ArithOp::Mul, o, pc)?,
            OpCode::DivInt => self.binary_int(ArithOp::Div, o, pc)?,
            OpCode::ModInt => {
                let a = self.read(o[1], pc)?.as_int();
                let b = self.read(o[2], pc)?.as_int();
                self.write(o[0], Word::from_int(IntOps::value_mod(a, b)), pc)?;
            }
            OpCode::AddFloat => self.binary_float(ArithOp::Add, o, pc)?,
            OpCode::SubFloat => self.binary_float(ArithOp::Sub, o, pc)?,
            OpCode::MulFloat => self.binary_float(ArithOp::Mul, o, pc)?,
            OpCode::DivFloat => self.binary_float(ArithOp::Div, o, pc)?,
            OpCode::SqrtFloat => {
                let value = self.read(o[1], pc)?.as_float();
                self.write(o[0], Word::from_float(value.sqrt()), pc)?;
            }

            // ═══════════════════════════════════════════════════════════
            // Logic
            // ═══════════════════════════════════════════════════════════
            OpCode::And | OpCode::Or => {
                let a = !self.read(o[1], pc)?.is_zero();
                let b = !self.read(o[2], pc)?.is_zero();
                let result = if op == OpCode::And { a && b } else { a || b };
                self.write(o[0], Word::from_bool(result), pc)?;
            }
            OpCode::Xor => {
                let a = self.read(o[1], pc)?.bits();
                let b = self.read(o[2], pc)?.bits();
                self.write(o[0], Word::from_bits(a ^ b), pc)?;
            }
            OpCode::Not => {
                let value = self.read(o[1], pc)?;
                self.write(o[0], Word::from_bool(value.is_zero()), pc)?;
            }

            // ═══════════════════════════════════════════════════════════
            // Comparison
            // ═══════════════════════════════════════════════════════════
            OpCode::EqInt => self.compare_int(CmpOp::Eq, o, pc)?,
            OpCode::NeqInt => self.compare_int(CmpOp::Neq, o, pc)?,
            OpCode::LtInt => self.compare_int(CmpOp::Lt, o, pc)?,
            OpCode::GtInt => self.compare_int(CmpOp::Gt, o, pc)?,
            OpCode::LteInt => self.compare_int(CmpOp::Lte, o, pc)?,
            OpCode::GteInt => self.compare_int(CmpOp::Gte, o, pc)?,
            OpCode::EqFloat => self.compare_float(CmpOp::Eq, o, pc)?,
            OpCode::NeqFloat => self.compare_float(CmpOp::Neq, o, pc)?,
            OpCode::LtFloat => self.compare_float(CmpOp::Lt, o, pc)?,
            OpCode::GtFloat => self.compare_float(CmpOp::Gt, o, pc)?,
            OpCode::LteFloat => self.compare_float(CmpOp::Lte, o, pc)?,
            OpCode::GteFloat => self.compare_float(CmpOp::Gte, o, pc)?,

            // ═══════════════════════════════════════════════════════════
            // Control flow
            // ═══════════════════════════════════════════════════════════
            OpCode::Jump => self.pc = o[0].bits(),
            OpCode::JumpIfZero => {
                if self.read(o[0], pc)?.is_zero() {
                    self.pc = o[1].bits();
                }
            }
            OpCode::JumpIfNotZero => {
                if !self.read(o[0], pc)?.is_zero() {
                    self.pc = o[1].bits();
                }
            }
            OpCode::Call => {
                self.stack.push_checked(self.pc, Location::at_pc(pc))?;
                self.pc = o[0].bits();
            }
            OpCode::Return => match self.stack.pop() {
                Some(return_pc) => self.pc = return_pc,
                None => return Ok(Flow::Halt),
            },

            // ═══════════════════════════════════════════════════════════
            // Conditional blocks
            // ═══════════════════════════════════════════════════════════
            OpCode::If => {
                if self.read(o[0], pc)?.is_zero() {
                    self.pc = o[1].bits();
                }
            }
            // Reached only by falling out of a taken IF branch.
            OpCode::Else => self.pc = o[0].bits(),

            // ═══════════════════════════════════════════════════════════
            // Lists
            // ═══════════════════════════════════════════════════════════
            OpCode::ListDeclare => lists.declare(o[0].bits()),
            OpCode::ListAppend => {
                let value = self.read(o[1], pc)?;
                lists.append(o[0].bits(), value);
            }
            OpCode::ListRead => {
                let index = self.read(o[2], pc)?.as_int();
                self.write(o[0], lists.read(o[1].bits(), index), pc)?;
            }
            OpCode::ListRemove => {
                let index = self.read(o[1], pc)?.as_int();
                lists.remove(o[0].bits(), index);
            }
            OpCode::ListEdit => {
                let index = self.read(o[1], pc)?.as_int();
                let value = self.read(o[2], pc)?;
                lists.edit(o[0].bits(), index, value);
            }
            OpCode::ListLength => {
                let len = lists.len(o[1].bits()).unwrap_or(0);
                self.write(o[0], Word::from_int(len as i32), pc)?;
            }

            // ═══════════════════════════════════════════════════════════
            // Output
            // ═══════════════════════════════════════════════════════════
            OpCode::OutputInt => {
                let value = self.read(o[1], pc)?.as_int();
                self.emit(o[0], OutputValue::Int(value));
            }
            OpCode::OutputFloat => {
                let value = self.read(o[1], pc)?.as_float();
                self.emit(o[0], OutputValue::Float(value));
            }
            OpCode::OutputList => {
                if let Some(items) = lists.snapshot(o[1].bits()) {
                    self.emit(o[0], OutputValue::List(items));
                }
            }
        }

        Ok(Flow::Continue)
    }
}

/// Nearest integer, ties toward positive infinity. Saturates; NaN is 0.
pub fn round_half_up(value: f32) -> i32 {
    (value as f64 + 0.5).floor() as i32
}
