use base::Latest;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;

#[test]
fn test_empty_cell() {
    let cell = Latest::<u32>::new();
    assert!(cell.is_empty());
    assert_eq!(cell.get(), None);
    assert_eq!(cell.get_versioned(), None);
    assert_eq!(cell.version(), 0);
}

#[test]
fn test_set_replaces_value() {
    let cell = Latest::new();
    assert_eq!(cell.set("first".to_string()), 1);
    assert_eq!(cell.set("second".to_string()), 2);

    assert_eq!(cell.get().as_deref(), Some("second"));
    assert_eq!(cell.get_versioned(), Some((2, "second".to_string())));
    assert!(!cell.is_empty());
}

#[test]
fn test_clones_share_slot() {
    let writer = Latest::new();
    let reader = writer.clone();

    writer.set(7u8);
    assert_eq!(reader.get(), Some(7));
    assert_eq!(reader.version(), 1);
}

#[test]
fn test_concurrent_readers_never_see_torn_values() {
    const WRITES: u64 = 20_000;
    const READERS: usize = 4;

    let cell = Latest::<Vec<u64>>::new();
    let done = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..READERS)
        .map(|_| {
            let cell = cell.clone();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut last_version = 0;
                let mut observed = 0usize;
                while !done.load(Ordering::Acquire) {
                    if let Some((version, value)) = cell.get_versioned() {
                        // every write fills the vector with its own sequence number
                        assert!(value.iter().all(|&v| v == value[0]), "torn value");
                        assert_eq!(value[0], version);
                        assert!(version >= last_version, "version went backwards");
                        last_version = version;
                        observed += 1;
                    }
                }
                observed
            })
        })
        .collect();

    for i in 1..=WRITES {
        cell.set(vec![i; 32]);
    }
    done.store(true, Ordering::Release);

    for reader in readers {
        reader.join().expect("reader panicked");
    }
    assert_eq!(cell.get().map(|v| v[0]), Some(WRITES));
}
