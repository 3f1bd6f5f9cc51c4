//! Execution engine for tcscl bytecode.
//!
//! - **Context**: one instruction stream with a private PC, call stack and
//!   random stream
//! - **Machine**: owns the shared register file, list store and output
//!   collector, and starts contexts according to the run configuration
//!
//! # VM Traits
//!
//! The `traits` module defines the numeric interfaces the dispatcher uses:
//! - `ArithmeticOps`: add, sub, mul, div
//! - `ComparisonOps`: eq, neq, lt, gt, lte, gte
//!
//! Two implementations are provided:
//! - `IntOps`: wrapping signed 32-bit integers
//! - `FloatOps`: IEEE-754 single precision

pub mod executor;
pub mod machine;
pub mod traits;

// Re-export from executor
pub use executor::{round_half_up, Context, ContextReport, ContextStatus, Shared};

// Re-export from machine
pub use machine::{run_symbolic, Machine, RunReport};

// Re-export traits
pub use traits::{ArithOp, ArithmeticOps, CmpOp, ComparisonOps, FloatOps, IntOps};
