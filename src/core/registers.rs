//! Register file for the tcscl virtual machine.
//!
//! REGISTER_COUNT (4096) untagged words, shared by reference between every
//! execution context of a run. Cells are relaxed atomics: concurrent writers
//! to one index race, and the last writer wins in an unspecified order. No
//! lock orders those writes.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use super::error::{Location, VmError, VmResult};
use super::word::Word;

/// Number of registers in the file.
pub const REGISTER_COUNT: usize = 4096;

/// Shared, unsynchronized register storage.
pub struct RegisterFile {
    cells: Box<[AtomicU32]>,
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Only show non-zero registers
        let nonzero: Vec<_> = self.snapshot()
            .into_iter()
            .enumerate()
            .filter(|(_, w)| !w.is_zero())
            .collect();

        if nonzero.is_empty() {
            write!(f, "RegisterFile{{all zero}}")
        } else {
            write!(f, "RegisterFile{{")?;
            for (i, (idx, w)) in nonzero.iter().enumerate() {
                if i > 0 { write!(f, ", ")?; }
                write!(f, "r{}={:#x}", idx, w.bits())?;
            }
            write!(f, "}}")
        }
    }
}

impl RegisterFile {
    /// Create a register file with every register at integer zero.
    pub fn new() -> Self {
        Self {
            cells: (0..REGISTER_COUNT).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    #[inline]
    fn slot(&self, index: u32, pc: u32) -> VmResult<&AtomicU32> {
        self.cells.get(index as usize).ok_or_else(|| VmError::RegisterOutOfRange {
            index,
            max: REGISTER_COUNT - 1,
            location: Location::at_pc(pc),
        })
    }

    /// Read a register; an index outside the file faults the caller.
    #[inline]
    pub fn read(&self, index: u32, pc: u32) -> VmResult<Word> {
        Ok(Word::from_bits(self.slot(index, pc)?.load(Ordering::Relaxed)))
    }

    /// Write a register; an index outside the file faults the caller.
    #[inline]
    pub fn write(&self, index: u32, value: Word, pc: u32) -> VmResult<()> {
        self.slot(index, pc)?.store(value.bits(), Ordering::Relaxed);
        Ok(())
    }

    /// Host-side read that ignores out-of-range indices.
    pub fn get(&self, index: usize) -> Option<Word> {
        self.cells.get(index).map(|c| Word::from_bits(c.load(Ordering::Relaxed)))
    }

    /// Copy of every register, index order.
    pub fn snapshot(&self) -> Vec<Word> {
        self.cells.iter().map(|c| Word::from_bits(c.load(Ordering::Relaxed))).collect()
    }

    /// Reset every register to integer zero.
    pub fn clear(&self) {
        for c in self.cells.iter() {
            c.store(0, Ordering::Relaxed);
        }
    }
}
