//! tcscl: a register virtual machine for tcscl bytecode.
//!
//! Symbolic programs are assembled into flat word arrays, lists are preloaded
//! from host data, and one or more execution contexts run over a shared
//! register file and list store. Results are collected per output id and
//! serialized after the run.
//!
//! ```
//! use tcscl::{ProgramBuilder, Machine, VmConfig, OpCode};
//!
//! let assembly = ProgramBuilder::new()
//!     .load_int(0, 40)
//!     .load_int(1, 2)
//!     .binary(OpCode::AddInt, 2, 0, 1)
//!     .output_int(1, 2)
//!     .halt()
//!     .assemble()
//!     .unwrap();
//!
//! let report = Machine::new(VmConfig::default()).run(&assembly.program);
//! assert_eq!(report.to_text(), "1: 42\n");
//! ```

// ═══════════════════════════════════════════════════════════════════════════
// Layer 0: Core (No internal dependencies)
// ═══════════════════════════════════════════════════════════════════════════
pub mod core;

// ═══════════════════════════════════════════════════════════════════════════
// Layer 1: Instruction catalog & configuration (depends on core)
// ═══════════════════════════════════════════════════════════════════════════
pub mod opcode;
pub mod config;

// ═══════════════════════════════════════════════════════════════════════════
// Layer 2: Assembler (depends on core, opcode)
// ═══════════════════════════════════════════════════════════════════════════
pub mod assembler;

// ═══════════════════════════════════════════════════════════════════════════
// Layer 3: Runtime (depends on core, assembler)
// ═══════════════════════════════════════════════════════════════════════════
pub mod runtime;

// ═══════════════════════════════════════════════════════════════════════════
// Layer 4: VM (depends on all)
// ═══════════════════════════════════════════════════════════════════════════
pub mod vm;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports
// ═══════════════════════════════════════════════════════════════════════════

pub use core::{
    ContextId, ErrorCategory, ListStore, Location, OutputCollector, OutputEntry, OutputKind,
    OutputValue, RandomStream, RegisterFile, SymbolKind, VmError, VmResult, Word,
    LIST_CAPACITY, LIST_COUNT, MAX_CALL_DEPTH, REGISTER_COUNT,
};
pub use opcode::{Category, OpCode, OperandKind};
pub use config::{ExecutionMode, VmConfig};
pub use assembler::{
    disassemble, parse_symbolic_json, Assembler, Assembly, PreloadBinding, Program,
    ProgramBuilder, SymbolicInstr, MAX_FUNCTION_ID,
};
pub use runtime::{PreloadSource, PreloadSummary, ResultSink, SinkFormat};
pub use vm::{run_symbolic, ContextReport, ContextStatus, Machine, RunReport};
