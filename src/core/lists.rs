//! Fixed-capacity list storage for the tcscl virtual machine.
//!
//! LIST_COUNT (128) lists of at most LIST_CAPACITY (1024) float words each,
//! shared between execution contexts. Lengths are atomic counters: append
//! reserves its slot by bumping the counter before writing, and remove
//! shrinks the counter before swapping the last element into the hole, so two
//! contexts never claim the same slot or observe a torn length.
//!
//! Every operation on an out-of-range or undeclared id is a no-op, and index
//! errors degrade (read yields 0.0, remove/edit do nothing).

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::word::Word;

/// Number of list ids (0..LIST_COUNT).
pub const LIST_COUNT: usize = 128;

/// Maximum elements per list.
pub const LIST_CAPACITY: usize = 1024;

/// One shared list: existence flag, atomic length, backing words.
struct SharedList {
    declared: AtomicBool,
    len: AtomicU32,
    items: Box<[AtomicU32]>,
}

impl SharedList {
    fn new() -> Self {
        Self {
            declared: AtomicBool::new(false),
            len: AtomicU32::new(0),
            items: (0..LIST_CAPACITY).map(|_| AtomicU32::new(0)).collect(),
        }
    }

    #[inline]
    fn len(&self) -> u32 {
        self.len.load(Ordering::Acquire)
    }
}

/// Storage for every list of a run.
pub struct ListStore {
    lists: Box<[SharedList]>,
}

impl Default for ListStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ListStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let declared: Vec<_> = (0..LIST_COUNT as u32)
            .filter_map(|id| self.len(id).map(|len| (id, len)))
            .collect();
        write!(f, "ListStore{{")?;
        for (i, (id, len)) in declared.iter().enumerate() {
            if i > 0 { write!(f, ", ")?; }
            write!(f, "#{}: {} items", id, len)?;
        }
        write!(f, "}}")
    }
}

/// Convert a register-held index to a slot, rejecting negatives.
#[inline]
fn slot_index(index: i32) -> Option<u32> {
    u32::try_from(index).ok()
}

impl ListStore {
    /// Create a store where every id is undeclared.
    pub fn new() -> Self {
        Self {
            lists: (0..LIST_COUNT).map(|_| SharedList::new()).collect(),
        }
    }

    /// The list for `id` if it is in range and declared.
    #[inline]
    fn declared(&self, id: u32) -> Option<&SharedList> {
        self.lists
            .get(id as usize)
            .filter(|list| list.declared.load(Ordering::Acquire))
    }

    /// Mark `id` usable with length 0. Idempotent: an existing list keeps
    /// its contents.
    pub fn declare(&self, id: u32) {
        if let Some(list) = self.lists.get(id as usize) {
            list.declared.store(true, Ordering::Release);
        }
    }

    pub fn is_declared(&self, id: u32) -> bool {
        self.declared(id).is_some()
    }

    /// Current length, or `None` for undeclared/out-of-range ids.
    pub fn len(&self, id: u32) -> Option<usize> {
        self.declared(id).map(|list| list.len() as usize)
    }

    /// Append a value, reserving the slot atomically. Returns whether the
    /// value was stored (false when full or undeclared).
    pub fn append(&self, id: u32, value: Word) -> bool {
        let Some(list) = self.declared(id) else {
            return false;
        };

        let mut len = list.len();
        loop {
            if len as usize >= LIST_CAPACITY {
                return false;
            }
            match list.len.compare_exchange_weak(len, len + 1, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => break,
                Err(current) => len = current,
            }
        }

        list.items[len as usize].store(value.bits(), Ordering::Release);
        true
    }

    /// Read an element; out of bounds or undeclared yields float 0.0.
    pub fn read(&self, id: u32, index: i32) -> Word {
        let Some(list) = self.declared(id) else {
            return Word::ZERO;
        };
        match slot_index(index) {
            Some(i) if i < list.len() => Word::from_bits(list.items[i as usize].load(Ordering::Acquire)),
            _ => Word::ZERO,
        }
    }

    /// Swap-remove: the last element moves into `index` and the length
    /// drops by one. Order is not preserved. Returns whether anything was
    /// removed.
    pub fn remove(&self, id: u32, index: i32) -> bool {
        let Some(list) = self.declared(id) else {
            return false;
        };
        let Some(index) = slot_index(index) else {
            return false;
        };

        let mut len = list.len();
        loop {
            if index >= len {
                return false;
            }
            match list.len.compare_exchange_weak(len, len - 1, Ordering::AcqRel, Ordering::Acquire) {
                Ok(_) => break,
                Err(current) => len = current,
            }
        }

        let last = len - 1;
        if index != last {
            let moved = list.items[last as usize].load(Ordering::Acquire);
            list.items[index as usize].store(moved, Ordering::Release);
        }
        true
    }

    /// Overwrite an element in bounds. Returns whether it was written.
    pub fn edit(&self, id: u32, index: i32, value: Word) -> bool {
        let Some(list) = self.declared(id) else {
            return false;
        };
        match slot_index(index) {
            Some(i) if i < list.len() => {
                list.items[i as usize].store(value.bits(), Ordering::Release);
                true
            }
            _ => false,
        }
    }

    /// Ordered copy of the current elements, or `None` if undeclared.
    pub fn snapshot(&self, id: u32) -> Option<Vec<f32>> {
        let list = self.declared(id)?;
        let len = list.len() as usize;
        Some(
            list.items[..len]
                .iter()
                .map(|w| f32::from_bits(w.load(Ordering::Acquire)))
                .collect(),
        )
    }

    /// Host-side bulk load used by the preload resolver. Declares the list,
    /// replaces its contents and returns how many values fit.
    pub fn load(&self, id: u32, values: &[f32]) -> Option<usize> {
        let list = self.lists.get(id as usize)?;
        let count = values.len().min(LIST_CAPACITY);
        for (slot, v) in list.items.iter().zip(&values[..count]) {
            slot.store(v.to_bits(), Ordering::Relaxed);
        }
        list.len.store(count as u32, Ordering::Release);
        list.declared.store(true, Ordering::Release);
        Some(count)
    }

    /// Ids currently declared, ascending.
    pub fn declared_ids(&self) -> Vec<u32> {
        (0..LIST_COUNT as u32).filter(|&id| self.is_declared(id)).collect()
    }
}
