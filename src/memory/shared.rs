use crate::memory::frame_pool::FrameIndex;
use crate::memory::manager::{AccessError, AccessOutcome, EvictionPolicy, MemoryManager};
use crate::memory::page_table::{Address, PageKey, ProcessId};
use anyhow::Result;
use std::sync::{Arc, Mutex};

/// Cloneable handle to one `MemoryManager` behind a single lock.
///
/// Every method takes the lock once and holds it for the whole operation, so
/// the check-then-allocate-then-install sequence of an access is never
/// interleaved with another process. The guard never escapes a method.
#[derive(Clone)]
pub struct SharedMemoryManager {
    inner: Arc<Mutex<MemoryManager>>,
}

impl SharedMemoryManager {
    pub fn new(manager: MemoryManager) -> Self {
        SharedMemoryManager {
            inner: Arc::new(Mutex::new(manager)),
        }
    }

    pub fn access(
        &self,
        process: ProcessId,
        virtual_address: Address,
    ) -> Result<AccessOutcome, AccessError> {
        let mut mm = self.inner.lock().unwrap();
        mm.access(process, virtual_address)
    }

    pub fn is_resident(&self, process: ProcessId, virtual_address: Address) -> bool {
        let mm = self.inner.lock().unwrap();
        mm.is_resident(process, virtual_address)
    }

    pub fn translate(
        &self,
        process: ProcessId,
        virtual_address: Address,
    ) -> Result<Address, AccessError> {
        let mm = self.inner.lock().unwrap();
        mm.translate(process, virtual_address)
    }

    pub fn resident_set(&self) -> Vec<(PageKey, FrameIndex)> {
        let mm = self.inner.lock().unwrap();
        mm.resident_set()
    }

    /// Occupied frame count and valid entry count, read under one lock.
    pub fn occupancy(&self) -> (usize, usize) {
        let mm = self.inner.lock().unwrap();
        (mm.occupied_frames(), mm.valid_entries())
    }

    pub fn check_invariants(&self) -> Result<()> {
        let mm = self.inner.lock().unwrap();
        mm.check_invariants()
    }

    pub fn num_frames(&self) -> usize {
        self.inner.lock().unwrap().num_frames()
    }

    pub fn page_size(&self) -> u64 {
        self.inner.lock().unwrap().page_size()
    }

    pub fn eviction_policy(&self) -> EvictionPolicy {
        self.inner.lock().unwrap().eviction_policy()
    }
}
