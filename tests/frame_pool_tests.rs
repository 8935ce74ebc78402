use pagesim::memory::frame_pool::FramePool;

#[test]
fn test_allocate_first_fit() {
    let mut pool = FramePool::new(3);
    assert_eq!(pool.allocate_free(), Some(0));
    assert_eq!(pool.allocate_free(), Some(1));
    assert_eq!(pool.allocate_free(), Some(2));
    assert_eq!(pool.allocate_free(), None);
    assert_eq!(pool.occupied_count(), 3);
}

#[test]
fn test_release_then_reuse_lowest() {
    let mut pool = FramePool::new(3);
    for _ in 0..3 {
        pool.allocate_free().unwrap();
    }
    pool.release(2);
    pool.release(0);
    assert!(!pool.is_occupied(0));
    assert_eq!(pool.allocate_free(), Some(0));
    assert_eq!(pool.allocate_free(), Some(2));
    assert_eq!(pool.occupied_frames(), vec![0, 1, 2]);
}

#[test]
fn test_claim_and_out_of_range() {
    let mut pool = FramePool::new(2);
    assert!(pool.claim(1));
    assert!(!pool.claim(1));
    assert!(!pool.claim(5));
    pool.release(7);
    assert_eq!(pool.occupied_frames(), vec![1]);
    assert_eq!(pool.allocate_free(), Some(0));
}

#[test]
fn test_empty_pool() {
    let mut pool = FramePool::new(0);
    assert!(pool.is_empty());
    assert_eq!(pool.allocate_free(), None);
    assert!(!pool.is_occupied(0));
}
