use crate::memory::frame_pool::FrameIndex;
use serde::Serialize;

/// Simulated process identity.
pub type ProcessId = usize;

/// Virtual or physical address.
pub type Address = u64;

/// Tag of a mapping: which process, which virtual page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PageKey {
    pub process: ProcessId,
    pub page_number: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageTableEntry {
    pub process: ProcessId,
    /// Page-aligned virtual address of the mapped page.
    pub virtual_page_base: Address,
    pub frame_index: FrameIndex,
    pub valid: bool,
}

/// Fixed-capacity open-addressed page table.
///
/// Entries are tagged with `(process, page_number)`. A mapping is placed at
/// its home slot `page_number % capacity` or, if that slot is taken by a
/// different key, the next invalid slot after it (wrapping). Lookups scan
/// every slot, so invalidating an entry needs no tombstone.
#[derive(Debug)]
pub struct PageTable {
    entries: Vec<PageTableEntry>,
    page_size: u64,
}

impl PageTable {
    pub fn new(capacity: usize, page_size: u64) -> Self {
        PageTable {
            entries: vec![PageTableEntry::default(); capacity],
            page_size,
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn home_slot(&self, page_number: u64) -> usize {
        page_number
            .checked_rem(self.entries.len() as u64)
            .unwrap_or(0) as usize
    }

    pub fn key_of(&self, entry: &PageTableEntry) -> PageKey {
        PageKey {
            process: entry.process,
            page_number: entry.virtual_page_base / self.page_size,
        }
    }

    /// Slot holding a valid mapping for `key`, if any.
    pub fn find(&self, key: PageKey) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.valid && self.key_of(e) == key)
    }

    pub fn lookup(&self, key: PageKey) -> Option<&PageTableEntry> {
        self.find(key).map(|slot| &self.entries[slot])
    }

    /// Write a valid mapping for `key` and return the slot used.
    ///
    /// An existing mapping for the same key is overwritten in place. Returns
    /// `None` only when every slot holds a valid entry for some other key.
    pub fn install(&mut self, key: PageKey, frame_index: FrameIndex) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let slot = match self.find(key) {
            Some(slot) => slot,
            None => {
                let cap = self.entries.len();
                let home = self.home_slot(key.page_number);
                (0..cap)
                    .map(|step| (home + step) % cap)
                    .find(|&slot| !self.entries[slot].valid)?
            }
        };
        self.entries[slot] = PageTableEntry {
            process: key.process,
            virtual_page_base: key.page_number * self.page_size,
            frame_index,
            valid: true,
        };
        Some(slot)
    }

    /// Clear the valid bit of `slot`, returning the entry it held.
    pub fn invalidate(&mut self, slot: usize) -> Option<PageTableEntry> {
        let entry = self.entries.get_mut(slot)?;
        if !entry.valid {
            return None;
        }
        entry.valid = false;
        Some(*entry)
    }

    /// Lowest-index slot with a valid entry.
    pub fn first_valid(&self) -> Option<usize> {
        self.entries.iter().position(|e| e.valid)
    }

    pub fn valid_entries(&self) -> impl Iterator<Item = (usize, &PageTableEntry)> {
        self.entries.iter().enumerate().filter(|(_, e)| e.valid)
    }

    pub fn valid_count(&self) -> usize {
        self.entries.iter().filter(|e| e.valid).count()
    }
}
