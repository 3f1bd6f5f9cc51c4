//! Call stack for the tcscl virtual machine.
//!
//! Each execution context owns one. Frames are bare return PCs and the depth
//! is bounded; exceeding the bound is a fatal StackOverflow for the context.

use std::fmt;
use super::error::{Location, VmError, VmResult};

/// Maximum number of nested calls per context.
pub const MAX_CALL_DEPTH: usize = 256;

/// A bounds-checked LIFO of return addresses.
#[derive(Clone)]
pub struct CallStack {
    frames: Vec<u32>,
    max_depth: usize,
}

impl Default for CallStack {
    fn default() -> Self {
        Self::new()
    }
}

impl CallStack {
    /// Create an empty call stack with the standard depth limit.
    pub fn new() -> Self {
        Self::with_max_depth(MAX_CALL_DEPTH)
    }

    /// Create a call stack with a custom depth limit.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            frames: Vec::with_capacity(max_depth.min(MAX_CALL_DEPTH)),
            max_depth,
        }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Push a return PC, failing if the stack is already full.
    pub fn push_checked(&mut self, return_pc: u32, location: Location) -> VmResult<()> {
        if self.frames.len() >= self.max_depth {
            return Err(VmError::StackOverflow {
                max_depth: self.max_depth,
                location,
            });
        }
        self.frames.push(return_pc);
        Ok(())
    }

    /// Pop a return PC; `None` means the context returns to top level.
    #[inline]
    pub fn pop(&mut self) -> Option<u32> {
        self.frames.pop()
    }

    #[inline]
    pub fn peek(&self) -> Option<u32> {
        self.frames.last().copied()
    }

    pub fn frames(&self) -> &[u32] {
        &self.frames
    }
}

impl fmt::Debug for CallStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CallStack[{}/{}]{:?}", self.frames.len(), self.max_depth, self.frames)
    }
}
