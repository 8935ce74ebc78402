use crate::memory::frame_pool::{FrameIndex, FramePool};
use crate::memory::page_table::{Address, PageKey, PageTable, ProcessId};
use anyhow::{Result, anyhow, bail};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Largest page table (`num_processes * num_frames` slots) a manager will
/// allocate. The frame count is bounded by the same value.
pub const MAX_TABLE_ENTRIES: usize = 1 << 24;

/// Frame count and page-table slot count for a configuration, or an error
/// if either exceeds `MAX_TABLE_ENTRIES`.
pub fn table_size(
    memory_size: u64,
    page_size: u64,
    num_processes: usize,
) -> Result<(usize, usize)> {
    if page_size == 0 {
        bail!("page size must be non-zero");
    }
    let num_frames = memory_size / page_size;
    let entries = (num_processes as u64).checked_mul(num_frames);
    match entries {
        Some(entries) if num_frames.max(entries) <= MAX_TABLE_ENTRIES as u64 => {
            Ok((num_frames as usize, entries as usize))
        }
        _ => bail!(
            "{} frames for {} processes is too large (limit {} page table entries)",
            num_frames,
            num_processes,
            MAX_TABLE_ENTRIES
        ),
    }
}

/// How a victim is chosen once every frame is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvictionPolicy {
    /// Oldest installed mapping first, tracked in an explicit queue.
    #[default]
    Fifo,
    /// First valid entry by page-table slot index.
    SlotOrder,
}

impl FromStr for EvictionPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" => Ok(EvictionPolicy::Fifo),
            "slot-order" | "slot" => Ok(EvictionPolicy::SlotOrder),
            other => Err(anyhow!("unknown eviction policy '{}'", other)),
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvictionPolicy::Fifo => write!(f, "fifo"),
            EvictionPolicy::SlotOrder => write!(f, "slot-order"),
        }
    }
}

/// Per-access failure. Neither is fatal to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// No free frame and nothing could be evicted.
    FrameExhaustion,
    /// No valid mapping for the address after allocation.
    TranslationMiss { virtual_address: Address },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessError::FrameExhaustion => write!(f, "no free frames available"),
            AccessError::TranslationMiss { virtual_address } => {
                write!(f, "invalid translation for VA {:#010x}", virtual_address)
            }
        }
    }
}

impl std::error::Error for AccessError {}

/// A mapping removed to make room. `frame` is free again once returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eviction {
    pub frame: FrameIndex,
    pub victim: PageKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Allocation {
    Free(FrameIndex),
    Evicted(Eviction),
}

impl Allocation {
    pub fn frame(&self) -> FrameIndex {
        match self {
            Allocation::Free(frame) => *frame,
            Allocation::Evicted(e) => e.frame,
        }
    }
}

/// What an access had to do to resolve its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Resident,
    Allocated,
    Evicted { victim: PageKey },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessOutcome {
    pub key: PageKey,
    pub frame: FrameIndex,
    pub physical_address: Address,
    pub disposition: Disposition,
}

/// Frame pool plus page table. Sole mutator of both.
///
/// Not synchronized; see `SharedMemoryManager` for the locked wrapper.
#[derive(Debug)]
pub struct MemoryManager {
    frames: FramePool,
    page_table: PageTable,
    page_size: u64,
    eviction: EvictionPolicy,
    /// Resident keys in install order, oldest at the front.
    install_order: VecDeque<PageKey>,
}

impl MemoryManager {
    /// Build a manager with `memory_size / page_size` frames and a page table
    /// of `num_processes * num_frames` slots.
    pub fn new(
        memory_size: u64,
        page_size: u64,
        num_processes: usize,
        eviction: EvictionPolicy,
    ) -> Result<Self> {
        let (num_frames, entries) = table_size(memory_size, page_size, num_processes)?;
        Ok(MemoryManager {
            frames: FramePool::new(num_frames),
            page_table: PageTable::new(entries, page_size),
            page_size,
            eviction,
            install_order: VecDeque::new(),
        })
    }

    pub fn num_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.eviction
    }

    pub fn page_table(&self) -> &PageTable {
        &self.page_table
    }

    pub fn page_number(&self, virtual_address: Address) -> u64 {
        virtual_address / self.page_size
    }

    pub fn offset(&self, virtual_address: Address) -> u64 {
        virtual_address % self.page_size
    }

    pub fn key(&self, process: ProcessId, virtual_address: Address) -> PageKey {
        PageKey {
            process,
            page_number: self.page_number(virtual_address),
        }
    }

    pub fn is_resident(&self, process: ProcessId, virtual_address: Address) -> bool {
        self.page_table
            .find(self.key(process, virtual_address))
            .is_some()
    }

    pub fn frame_for_page(
        &self,
        process: ProcessId,
        virtual_address: Address,
    ) -> Option<FrameIndex> {
        self.page_table
            .lookup(self.key(process, virtual_address))
            .map(|e| e.frame_index)
    }

    pub fn translate(
        &self,
        process: ProcessId,
        virtual_address: Address,
    ) -> Result<Address, AccessError> {
        let frame = self
            .frame_for_page(process, virtual_address)
            .ok_or(AccessError::TranslationMiss { virtual_address })?;
        Ok(frame as u64 * self.page_size + self.offset(virtual_address))
    }

    /// Take a free frame, evicting a resident page if none is free.
    /// The returned frame is marked occupied.
    pub fn allocate_frame(&mut self) -> Result<Allocation, AccessError> {
        if let Some(frame) = self.frames.allocate_free() {
            return Ok(Allocation::Free(frame));
        }
        let eviction = self.evict().ok_or(AccessError::FrameExhaustion)?;
        self.frames.claim(eviction.frame);
        Ok(Allocation::Evicted(eviction))
    }

    /// Invalidate one resident mapping and free its frame.
    pub fn evict(&mut self) -> Option<Eviction> {
        let slot = match self.eviction {
            EvictionPolicy::Fifo => loop {
                let key = self.install_order.pop_front()?;
                if let Some(slot) = self.page_table.find(key) {
                    break slot;
                }
            },
            EvictionPolicy::SlotOrder => self.page_table.first_valid()?,
        };
        let entry = self.page_table.invalidate(slot)?;
        let victim = self.page_table.key_of(&entry);
        if self.eviction == EvictionPolicy::SlotOrder {
            self.install_order.retain(|k| *k != victim);
        }
        self.frames.release(entry.frame_index);
        debug!(
            process = victim.process,
            page = victim.page_number,
            frame = entry.frame_index,
            slot,
            "evicted page"
        );
        Some(Eviction {
            frame: entry.frame_index,
            victim,
        })
    }

    /// Record `virtual_address`'s page as mapped to `frame` and return the slot.
    /// Remapping a resident page to another frame frees the frame it held.
    pub fn install_mapping(
        &mut self,
        process: ProcessId,
        virtual_address: Address,
        frame: FrameIndex,
    ) -> Result<usize, AccessError> {
        let key = self.key(process, virtual_address);
        let previous = self.page_table.lookup(key).map(|e| e.frame_index);
        let slot = self
            .page_table
            .install(key, frame)
            .ok_or(AccessError::FrameExhaustion)?;
        match previous {
            None => self.install_order.push_back(key),
            Some(old) if old != frame => self.frames.release(old),
            Some(_) => {}
        }
        Ok(slot)
    }

    /// Resolve one access: residency check, allocation with eviction when
    /// needed, mapping install, and translation.
    pub fn access(
        &mut self,
        process: ProcessId,
        virtual_address: Address,
    ) -> Result<AccessOutcome, AccessError> {
        let key = self.key(process, virtual_address);
        let (frame, disposition) = match self.frame_for_page(process, virtual_address) {
            Some(frame) => (frame, Disposition::Resident),
            None => {
                let allocation = self.allocate_frame()?;
                let frame = allocation.frame();
                if let Err(e) = self.install_mapping(process, virtual_address, frame) {
                    self.frames.release(frame);
                    return Err(e);
                }
                let disposition = match allocation {
                    Allocation::Free(_) => Disposition::Allocated,
                    Allocation::Evicted(e) => Disposition::Evicted { victim: e.victim },
                };
                (frame, disposition)
            }
        };
        let physical_address = self.translate(process, virtual_address)?;
        debug!(
            process,
            page = key.page_number,
            frame,
            ?disposition,
            "resolved access"
        );
        Ok(AccessOutcome {
            key,
            frame,
            physical_address,
            disposition,
        })
    }

    pub fn occupied_frames(&self) -> usize {
        self.frames.occupied_count()
    }

    pub fn valid_entries(&self) -> usize {
        self.page_table.valid_count()
    }

    /// Resident mappings sorted by key.
    pub fn resident_set(&self) -> Vec<(PageKey, FrameIndex)> {
        let mut set: Vec<_> = self
            .page_table
            .valid_entries()
            .map(|(_, e)| (self.page_table.key_of(e), e.frame_index))
            .collect();
        set.sort();
        set
    }

    /// Verify that occupied frames and valid entries are in one-to-one
    /// correspondence.
    pub fn check_invariants(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (slot, entry) in self.page_table.valid_entries() {
            if !self.frames.is_occupied(entry.frame_index) {
                bail!(
                    "slot {} maps to frame {} which is not occupied",
                    slot,
                    entry.frame_index
                );
            }
            if !seen.insert(entry.frame_index) {
                bail!("frame {} is mapped by more than one entry", entry.frame_index);
            }
        }
        let occupied = self.frames.occupied_count();
        if occupied != seen.len() {
            bail!(
                "{} frames occupied but {} referenced by valid entries",
                occupied,
                seen.len()
            );
        }
        Ok(())
    }
}
