//! Core types for the tcscl virtual machine.
//!
//! - **Word**: untagged 32-bit values
//! - **RegisterFile**: the 4096 shared registers
//! - **CallStack**: bounded per-context return addresses
//! - **ListStore**: fixed-capacity shared float lists
//! - **OutputCollector**: tagged results gathered during a run
//! - **RandomStream**: per-context deterministic generator
//! - **Error**: the crate error hierarchy
//!
//! # Layer 0 - No Internal Dependencies

pub mod error;
pub mod word;
pub mod registers;
pub mod stack;
pub mod lists;
pub mod output;
pub mod random;

pub use error::{VmError, VmResult, ErrorCategory, ErrorCollector, Location, SymbolKind};
pub use word::{Word, format_float};
pub use registers::{RegisterFile, REGISTER_COUNT};
pub use stack::{CallStack, MAX_CALL_DEPTH};
pub use lists::{ListStore, LIST_COUNT, LIST_CAPACITY};
pub use output::{ContextId, OutputCollector, OutputEntry, OutputKind, OutputValue};
pub use random::RandomStream;
