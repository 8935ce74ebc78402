use pagesim::memory::page_table::{PageKey, PageTable};

fn key(process: usize, page_number: u64) -> PageKey {
    PageKey {
        process,
        page_number,
    }
}

#[test]
fn test_install_at_home_slot() {
    let mut pt = PageTable::new(4, 4096);
    assert_eq!(pt.install(key(0, 6), 3), Some(2));
    let entry = pt.lookup(key(0, 6)).unwrap();
    assert_eq!(entry.frame_index, 3);
    assert_eq!(entry.virtual_page_base, 6 * 4096);
    assert!(entry.valid);
    assert_eq!(pt.key_of(entry), key(0, 6));
}

#[test]
fn test_colliding_keys_probe_instead_of_overwrite() {
    let mut pt = PageTable::new(4, 4096);
    // pages 1 and 5 share home slot 1
    assert_eq!(pt.install(key(0, 1), 0), Some(1));
    assert_eq!(pt.install(key(0, 5), 1), Some(2));
    // same page, different process
    assert_eq!(pt.install(key(1, 1), 2), Some(3));
    assert_eq!(pt.valid_count(), 3);
    assert_eq!(pt.lookup(key(0, 1)).unwrap().frame_index, 0);
    assert_eq!(pt.lookup(key(0, 5)).unwrap().frame_index, 1);
    assert_eq!(pt.lookup(key(1, 1)).unwrap().frame_index, 2);
}

#[test]
fn test_probe_wraps_around() {
    let mut pt = PageTable::new(3, 100);
    assert_eq!(pt.install(key(0, 2), 0), Some(2));
    assert_eq!(pt.install(key(0, 5), 1), Some(0));
}

#[test]
fn test_reinstall_same_key_in_place() {
    let mut pt = PageTable::new(4, 4096);
    let slot = pt.install(key(0, 3), 1).unwrap();
    assert_eq!(pt.install(key(0, 3), 2), Some(slot));
    assert_eq!(pt.valid_count(), 1);
    assert_eq!(pt.lookup(key(0, 3)).unwrap().frame_index, 2);
}

#[test]
fn test_invalidate_and_first_valid() {
    let mut pt = PageTable::new(4, 4096);
    pt.install(key(0, 2), 0);
    pt.install(key(0, 3), 1);
    assert_eq!(pt.first_valid(), Some(2));

    let removed = pt.invalidate(2).unwrap();
    assert_eq!(removed.frame_index, 0);
    assert!(pt.find(key(0, 2)).is_none());
    assert!(pt.invalidate(2).is_none());
    assert_eq!(pt.first_valid(), Some(3));
}

#[test]
fn test_full_or_empty_table_rejects_new_key() {
    let mut pt = PageTable::new(2, 4096);
    pt.install(key(0, 0), 0).unwrap();
    pt.install(key(0, 1), 1).unwrap();
    assert_eq!(pt.install(key(0, 2), 2), None);

    let mut empty = PageTable::new(0, 4096);
    assert_eq!(empty.install(key(0, 0), 0), None);
    assert_eq!(empty.home_slot(9), 0);
}
