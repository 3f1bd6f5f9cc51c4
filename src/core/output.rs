//! Output collection for the tcscl virtual machine.
//!
//! Contexts append tagged results while they run; the host drains them once
//! every context has finished. Appends from one context keep their order.
//! Interleaving between concurrent contexts is unspecified.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

/// Identity of an execution context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextId {
    /// The context that starts at PC 0.
    Main,
    /// A fan-out context started at a function's entry.
    Function(u32),
}

impl ContextId {
    /// Stable number used to derive per-context random seeds.
    pub fn ordinal(&self) -> u64 {
        match self {
            ContextId::Main => 0,
            ContextId::Function(id) => *id as u64 + 1,
        }
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextId::Main => write!(f, "main"),
            ContextId::Function(id) => write!(f, "function {}", id),
        }
    }
}

/// Kind tag of an output entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Int,
    Float,
    List,
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputKind::Int => write!(f, "int"),
            OutputKind::Float => write!(f, "float"),
            OutputKind::List => write!(f, "list"),
        }
    }
}

/// Payload captured when the output instruction ran.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputValue {
    Int(i32),
    Float(f32),
    /// Full list contents at the moment of capture.
    List(Vec<f32>),
}

impl OutputValue {
    pub fn kind(&self) -> OutputKind {
        match self {
            OutputValue::Int(_) => OutputKind::Int,
            OutputValue::Float(_) => OutputKind::Float,
            OutputValue::List(_) => OutputKind::List,
        }
    }
}

/// One collected result.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputEntry {
    pub id: u32,
    pub value: OutputValue,
    pub context: ContextId,
}

impl OutputEntry {
    pub fn new(id: u32, value: OutputValue, context: ContextId) -> Self {
        Self { id, value, context }
    }
}

/// Append-only sink shared by every context of a run.
#[derive(Debug, Default)]
pub struct OutputCollector {
    entries: Mutex<Vec<OutputEntry>>,
}

impl OutputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, entry: OutputEntry) {
        // A panicking context must not lose everybody else's results.
        let mut guard = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        guard.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every entry, grouped by output id. Groups appear in order of
    /// their first entry; entries inside a group keep collection order.
    pub fn drain(&self) -> Vec<OutputEntry> {
        let entries = std::mem::take(&mut *self.entries.lock().unwrap_or_else(|e| e.into_inner()));
        group_by_id(entries)
    }
}

fn group_by_id(entries: Vec<OutputEntry>) -> Vec<OutputEntry> {
    let mut order: HashMap<u32, usize> = HashMap::new();
    let mut groups: Vec<Vec<OutputEntry>> = Vec::new();
    for entry in entries {
        let slot = *order.entry(entry.id).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(entry);
    }
    groups.into_iter().flatten().collect()
}
