use pagesim::memory::manager::{EvictionPolicy, MemoryManager};
use pagesim::memory::page_table::PageKey;
use pagesim::memory::shared::SharedMemoryManager;
use std::collections::BTreeSet;

const PAGE: u64 = 4096;

fn addresses(process: usize, pages: u64) -> Vec<u64> {
    // each page touched twice, with different offsets
    (0..pages)
        .flat_map(|p| {
            let base = (p * 3 + process as u64) * PAGE;
            [base + 8, base + 0x100]
        })
        .collect()
}

fn keys(set: Vec<(PageKey, usize)>) -> BTreeSet<PageKey> {
    set.into_iter().map(|(k, _)| k).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_run_matches_sequential_resident_set() {
    let processes = 4;
    let pages = 5;
    let frames = processes as u64 * pages;

    let shared = SharedMemoryManager::new(
        MemoryManager::new(frames * PAGE, PAGE, processes, EvictionPolicy::Fifo).unwrap(),
    );
    let mut handles = Vec::new();
    for pid in 0..processes {
        let mm = shared.clone();
        handles.push(tokio::spawn(async move {
            for va in addresses(pid, pages) {
                let out = mm.access(pid, va).unwrap();
                assert_eq!(mm.translate(pid, va), Ok(out.physical_address));
                tokio::task::yield_now().await;
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    let mut sequential =
        MemoryManager::new(frames * PAGE, PAGE, processes, EvictionPolicy::Fifo).unwrap();
    for pid in 0..processes {
        for va in addresses(pid, pages) {
            sequential.access(pid, va).unwrap();
        }
    }

    shared.check_invariants().unwrap();
    assert_eq!(shared.occupancy(), (frames as usize, frames as usize));
    assert_eq!(keys(shared.resident_set()), keys(sequential.resident_set()));

    let frames_used: BTreeSet<usize> = shared.resident_set().into_iter().map(|(_, f)| f).collect();
    assert_eq!(frames_used.len(), frames as usize);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_invariants_hold_under_eviction_pressure() {
    let processes = 6;
    let shared = SharedMemoryManager::new(
        MemoryManager::new(4 * PAGE, PAGE, processes, EvictionPolicy::SlotOrder).unwrap(),
    );
    let mut handles = Vec::new();
    for pid in 0..processes {
        let mm = shared.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..200u64 {
                mm.access(pid, (i % 9) * PAGE + i).unwrap();
                tokio::task::yield_now().await;
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }

    shared.check_invariants().unwrap();
    assert_eq!(shared.occupancy(), (4, 4));
    assert_eq!(shared.resident_set().len(), 4);
}

#[test]
fn test_threads_share_one_manager() {
    let shared = SharedMemoryManager::new(
        MemoryManager::new(8 * PAGE, PAGE, 2, EvictionPolicy::Fifo).unwrap(),
    );
    std::thread::scope(|s| {
        for pid in 0..2 {
            let mm = shared.clone();
            s.spawn(move || {
                for p in 0..4u64 {
                    mm.access(pid, p * PAGE).unwrap();
                }
            });
        }
    });
    shared.check_invariants().unwrap();
    for pid in 0..2 {
        for p in 0..4u64 {
            assert!(shared.is_resident(pid, p * PAGE));
        }
    }
    assert_eq!(shared.num_frames(), 8);
    assert_eq!(shared.page_size(), PAGE);
    assert_eq!(shared.eviction_policy(), EvictionPolicy::Fifo);
}
