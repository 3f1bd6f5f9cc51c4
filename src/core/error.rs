//! Error hierarchy for tcscl.
//!
//! # Error Categories
//!
//! - **Assembly Errors**: structural faults found before any execution
//! - **Runtime Errors**: faults that abort the offending context only
//! - **Preload Errors**: malformed preload source text
//!
//! Conditions that degrade gracefully at runtime (bad list index, integer
//! division by zero, undeclared list) never produce a `VmError`.

use std::fmt;
use thiserror::Error;

/// Where an error was detected.
///
/// For assembly errors `index` is the position in the symbolic instruction
/// sequence; for runtime errors it is unused and `pc` is the faulting word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    /// Symbolic instruction index.
    pub index: usize,
    /// Word-granular program counter.
    pub pc: u32,
}

impl Location {
    pub fn new(index: usize, pc: u32) -> Self {
        Self { index, pc }
    }

    pub fn at_pc(pc: u32) -> Self {
        Self { index: 0, pc }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "instr {} @ pc {}", self.index, self.pc)
    }
}

/// Which symbol table an id lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Label,
    Function,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Label => write!(f, "label"),
            SymbolKind::Function => write!(f, "function"),
        }
    }
}

/// Comprehensive error type for tcscl.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VmError {
    // ═══════════════════════════════════════════════════════════════════
    // Assembly Errors
    // ═══════════════════════════════════════════════════════════════════

    /// A label or function id was defined twice.
    #[error("[{location}] Duplicate {kind} {id} (first defined at pc {first_pc})")]
    DuplicateSymbol {
        kind: SymbolKind,
        id: u32,
        first_pc: u32,
        location: Location,
    },

    /// A jump or call names an id that is never defined.
    #[error("[{location}] Unresolved {kind} {id}")]
    UnresolvedSymbol {
        kind: SymbolKind,
        id: u32,
        location: Location,
    },

    /// IF/ELSE/ENDIF nesting does not balance.
    #[error("[{location}] Unbalanced conditional: {message}")]
    UnbalancedConditional {
        message: String,
        location: Location,
    },

    /// A symbolic instruction carries the wrong number of operands.
    #[error("[{location}] {opcode} expects {expected} operands, found {found}")]
    OperandArityMismatch {
        opcode: &'static str,
        expected: usize,
        found: usize,
        location: Location,
    },

    /// A function id outside the declared id space.
    #[error("[{location}] {kind} id {id} out of range (max {max})")]
    SymbolOutOfRange {
        kind: SymbolKind,
        id: u32,
        max: u32,
        location: Location,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Runtime Errors
    // ═══════════════════════════════════════════════════════════════════

    /// CALL with the call stack already at its maximum depth.
    #[error("[{location}] Stack overflow: exceeded maximum call depth of {max_depth}")]
    StackOverflow {
        max_depth: usize,
        location: Location,
    },

    /// The word at PC is not a known opcode id.
    #[error("[{location}] Unknown opcode {word:#x}")]
    UnknownOpcode {
        word: u32,
        location: Location,
    },

    /// An operand names a register outside the register file.
    #[error("[{location}] Register index {index} out of range (max {max})")]
    RegisterOutOfRange {
        index: u32,
        max: usize,
        location: Location,
    },

    /// The program ends in the middle of an instruction.
    #[error("[{location}] Truncated {opcode}: needs {width} words, {available} available")]
    TruncatedInstruction {
        opcode: &'static str,
        width: usize,
        available: usize,
        location: Location,
    },

    /// Optional per-context instruction budget exhausted.
    #[error("[{location}] Instruction limit exceeded: {limit} instructions")]
    InstructionLimitExceeded {
        limit: u64,
        location: Location,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Preload Errors
    // ═══════════════════════════════════════════════════════════════════

    /// A preload source line could not be parsed.
    #[error("[line {line}] Malformed preload entry: {message}")]
    PreloadSyntax {
        line: usize,
        message: String,
    },
}

impl VmError {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            VmError::DuplicateSymbol { .. } |
            VmError::UnresolvedSymbol { .. } |
            VmError::UnbalancedConditional { .. } |
            VmError::OperandArityMismatch { .. } |
            VmError::SymbolOutOfRange { .. } => ErrorCategory::Assembly,

            VmError::StackOverflow { .. } |
            VmError::UnknownOpcode { .. } |
            VmError::RegisterOutOfRange { .. } |
            VmError::TruncatedInstruction { .. } |
            VmError::InstructionLimitExceeded { .. } => ErrorCategory::Runtime,

            VmError::PreloadSyntax { .. } => ErrorCategory::Preload,
        }
    }

    /// Get the error code for programmatic handling.
    pub fn code(&self) -> u32 {
        match self {
            // Assembly: 1000-1999
            VmError::DuplicateSymbol { .. } => 1001,
            VmError::UnresolvedSymbol { .. } => 1002,
            VmError::UnbalancedConditional { .. } => 1003,
            VmError::OperandArityMismatch { .. } => 1004,
            VmError::SymbolOutOfRange { .. } => 1005,

            // Runtime: 2000-2999
            VmError::StackOverflow { .. } => 2001,
            VmError::UnknownOpcode { .. } => 2002,
            VmError::RegisterOutOfRange { .. } => 2003,
            VmError::TruncatedInstruction { .. } => 2004,
            VmError::InstructionLimitExceeded { .. } => 2005,

            // Preload: 3000-3999
            VmError::PreloadSyntax { .. } => 3001,
        }
    }

    /// Runtime faults end the offending context and nothing else.
    pub fn is_context_fatal(&self) -> bool {
        self.category() == ErrorCategory::Runtime
    }

    /// Get the location if available.
    pub fn location(&self) -> Option<&Location> {
        match self {
            VmError::DuplicateSymbol { location, .. } |
            VmError::UnresolvedSymbol { location, .. } |
            VmError::UnbalancedConditional { location, .. } |
            VmError::OperandArityMismatch { location, .. } |
            VmError::SymbolOutOfRange { location, .. } |
            VmError::StackOverflow { location, .. } |
            VmError::UnknownOpcode { location, .. } |
            VmError::RegisterOutOfRange { location, .. } |
            VmError::TruncatedInstruction { location, .. } |
            VmError::InstructionLimitExceeded { location, .. } => Some(location),

            VmError::PreloadSyntax { .. } => None,
        }
    }
}

/// Error category for filtering and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Assembly,
    Runtime,
    Preload,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Assembly => write!(f, "assembly"),
            ErrorCategory::Runtime => write!(f, "runtime"),
            ErrorCategory::Preload => write!(f, "preload"),
        }
    }
}

/// Result type alias for tcscl operations.
pub type VmResult<T> = Result<T, VmError>;

/// Collect multiple errors.
#[derive(Debug, Clone, Default)]
pub struct ErrorCollector {
    errors: Vec<VmError>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: VmError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[VmError] {
        &self.errors
    }

    /// First error wins; the rest stay available through `errors()`.
    pub fn into_first(self) -> VmResult<()> {
        match self.errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
