//! Resolved bytecode programs.

use std::collections::BTreeMap;

use crate::core::Word;

/// A flat, position-independent word array plus its resolved symbol tables.
///
/// PCs count words, not instructions. Immutable once assembled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Program {
    words: Vec<Word>,
    labels: BTreeMap<u32, u32>,
    functions: BTreeMap<u32, u32>,
}

impl Program {
    pub(crate) fn new(words: Vec<Word>, labels: BTreeMap<u32, u32>, functions: BTreeMap<u32, u32>) -> Self {
        Self { words, labels, functions }
    }

    /// Raw bytecode with no symbol tables, e.g. shipped precompiled. Nothing
    /// is validated; bad words fault at runtime.
    pub fn from_words(words: Vec<Word>) -> Self {
        Self { words, ..Default::default() }
    }

    /// Raw bytecode plus a function table, enough for fan-out execution.
    pub fn from_parts(words: Vec<Word>, functions: BTreeMap<u32, u32>) -> Self {
        Self { words, labels: BTreeMap::new(), functions }
    }

    #[inline]
    pub fn words(&self) -> &[Word] {
        &self.words
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[inline]
    pub fn word(&self, pc: u32) -> Option<Word> {
        self.words.get(pc as usize).copied()
    }

    /// PC following the marker of label `id`.
    pub fn label_pc(&self, id: u32) -> Option<u32> {
        self.labels.get(&id).copied()
    }

    /// Entry PC of function `id`.
    pub fn function_pc(&self, id: u32) -> Option<u32> {
        self.functions.get(&id).copied()
    }

    pub fn labels(&self) -> &BTreeMap<u32, u32> {
        &self.labels
    }

    /// Declared functions as `(id, entry PC)`, ascending by id.
    pub fn functions(&self) -> &BTreeMap<u32, u32> {
        &self.functions
    }

    /// Little-endian byte image of the word array.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|w| w.bits().to_le_bytes()).collect()
    }
}

/// A host-side list preload recorded by the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadBinding {
    /// Key looked up in the preload source.
    pub key: u32,
    /// Destination list id.
    pub list: u32,
    /// PC of the instruction that was rewritten to no-ops.
    pub pc: u32,
}

/// Output of a successful assembly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Assembly {
    pub program: Program,
    /// Preload side table in program order.
    pub preloads: Vec<PreloadBinding>,
}
