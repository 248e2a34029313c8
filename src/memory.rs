use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::program::Word;

/// Word-addressed data memory. Addresses and cells are full machine words.
pub trait Memory {
    /// `None` for a cell that was never written.
    fn read(&self, addr: Word) -> Option<Word>;
    fn write(&mut self, addr: Word, val: Word);
}

/// Lazily populated address space with no capacity limit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseMemory {
    pub cells: BTreeMap<Word, Word>,
}

impl SparseMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Memory for SparseMemory {
    fn read(&self, addr: Word) -> Option<Word> {
        self.cells.get(&addr).copied()
    }

    fn write(&mut self, addr: Word, val: Word) {
        self.cells.insert(addr, val);
    }
}
