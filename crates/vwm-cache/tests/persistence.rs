//! Integration tests for durable cache behaviour.

use std::fs;
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use tempfile::tempdir;

use vwm_cache::{CacheEntry, CacheKey, CacheStore, PutOutcome, RefreshKey};
use vwm_model::{Amount, EntityId, Identity};

fn amount(value: f64) -> CacheEntry {
    CacheEntry::Amount(Amount::new(value).unwrap())
}

#[test]
fn test_entries_survive_restart() {
    let dir = tempdir().unwrap();
    let withdrawal = CacheKey::withdrawal(EntityId::new("A"), 6);
    let identity = CacheKey::identity(EntityId::new("A"));

    {
        let store = CacheStore::open(dir.path());
        store.put(withdrawal.clone(), amount(3.0)).unwrap();
        store
            .put(identity.clone(), CacheEntry::Identity(Identity::new("id-A")))
            .unwrap();
    }

    let reopened = CacheStore::open(dir.path());
    assert_eq!(reopened.len(), 2);
    assert_eq!(reopened.get(&withdrawal), Some(amount(3.0)));
    assert_eq!(
        reopened.get(&identity),
        Some(CacheEntry::Identity(Identity::new("id-A")))
    );
}

#[test]
fn test_first_writer_wins_across_restart() {
    let dir = tempdir().unwrap();
    let key = CacheKey::withdrawal(EntityId::new("A"), 6);

    CacheStore::open(dir.path()).put(key.clone(), amount(5.0)).unwrap();

    let reopened = CacheStore::open(dir.path());
    assert_eq!(reopened.put(key.clone(), amount(7.0)).unwrap(), PutOutcome::Kept);
    assert_eq!(reopened.get(&key), Some(amount(5.0)));

    assert_eq!(CacheStore::open(dir.path()).get(&key), Some(amount(5.0)));
}

#[test]
fn test_corrupt_storage_degrades_to_miss() {
    let dir = tempdir().unwrap();
    let good = CacheKey::withdrawal(EntityId::new("A"), 6);
    let bad = CacheKey::withdrawal(EntityId::new("A"), 7);

    {
        let store = CacheStore::open(dir.path());
        store.put(good.clone(), amount(1.0)).unwrap();
        store.put(bad.clone(), amount(2.0)).unwrap();
    }

    let records = dir.path().join("records");
    fs::write(records.join(bad.storage_name()), "{ truncated").unwrap();

    let reopened = CacheStore::open(dir.path());
    assert_eq!(reopened.get(&good), Some(amount(1.0)));
    assert_eq!(reopened.get(&bad), None);
}

#[test]
fn test_record_under_wrong_name_is_ignored() {
    let dir = tempdir().unwrap();
    let a6 = CacheKey::withdrawal(EntityId::new("A"), 6);
    let a7 = CacheKey::withdrawal(EntityId::new("A"), 7);

    CacheStore::open(dir.path()).put(a6.clone(), amount(1.0)).unwrap();

    let records = dir.path().join("records");
    fs::rename(
        records.join(a6.storage_name()),
        records.join(a7.storage_name()),
    )
    .unwrap();

    let reopened = CacheStore::open(dir.path());
    assert!(reopened.get(&a6).is_none());
    assert!(reopened.get(&a7).is_none());
}

#[test]
fn test_unwritable_root_still_opens() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("not-a-dir");
    fs::write(&file, "x").unwrap();

    let store = CacheStore::open(&file);
    assert!(store.is_empty());

    let key = CacheKey::withdrawal(EntityId::new("A"), 6);
    assert!(store.put(key.clone(), amount(1.0)).is_err());
    // Still served from memory for this process.
    assert_eq!(store.get(&key), Some(amount(1.0)));
}

#[test]
fn test_refreshable_survives_restart() {
    let dir = tempdir().unwrap();
    let rate = RefreshKey::exchange_rate("DASH", "USD");

    {
        let store = CacheStore::open(dir.path());
        store
            .put_refreshable(RefreshKey::CurrentEpoch, &24u64, Duration::from_secs(300))
            .unwrap();
        store
            .put_refreshable(rate.clone(), &28.5f64, Duration::ZERO)
            .unwrap();
    }

    let reopened = CacheStore::open(dir.path());
    assert_eq!(reopened.get_fresh::<u64>(&RefreshKey::CurrentEpoch), Some(24));
    assert_eq!(reopened.get_fresh::<f64>(&rate), None);
    assert_eq!(reopened.get_stale::<f64>(&rate), Some(28.5));
}

#[test]
fn test_concurrent_writers_same_key() {
    let dir = tempdir().unwrap();
    let store = Arc::new(CacheStore::open(dir.path()));
    let key = CacheKey::withdrawal(EntityId::new("A"), 6);
    let writers = 8;
    let barrier = Arc::new(Barrier::new(writers));

    let handles: Vec<_> = (0..writers)
        .map(|i| {
            let store = Arc::clone(&store);
            let key = key.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                store.put(key, amount(i as f64)).unwrap()
            })
        })
        .collect();

    let outcomes: Vec<PutOutcome> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let stored = outcomes.iter().filter(|o| **o == PutOutcome::Stored).count();
    assert_eq!(stored, 1);

    let winner = store.get(&key).unwrap();
    assert_eq!(CacheStore::open(dir.path()).get(&key), Some(winner));
}

#[test]
fn test_concurrent_writers_distinct_keys() {
    let dir = tempdir().unwrap();
    let store = Arc::new(CacheStore::open(dir.path()));

    let handles: Vec<_> = (0..16u64)
        .map(|epoch| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let key = CacheKey::withdrawal(EntityId::new("A"), epoch);
                store.put(key, amount(epoch as f64)).unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), PutOutcome::Stored);
    }

    let reopened = CacheStore::open(dir.path());
    assert_eq!(reopened.len(), 16);
}

#[test]
fn test_racing_identity_writes_leave_disk_matching_memory() {
    for _ in 0..20 {
        let dir = tempdir().unwrap();
        let store = Arc::new(CacheStore::open(dir.path()));
        let key = CacheKey::identity(EntityId::new("A"));
        let barrier = Arc::new(Barrier::new(2));

        let entries = [CacheEntry::Absent, CacheEntry::Identity(Identity::new("id-A"))];
        let handles: Vec<_> = entries
            .into_iter()
            .map(|entry| {
                let store = Arc::clone(&store);
                let key = key.clone();
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store.put(key, entry).unwrap()
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let in_memory = store.get(&key);
        assert_eq!(CacheStore::open(dir.path()).get(&key), in_memory);
    }
}

#[test]
fn test_identity_replacing_absent_survives_restart() {
    let dir = tempdir().unwrap();
    let key = CacheKey::identity(EntityId::new("A"));

    {
        let store = CacheStore::open(dir.path());
        store.put(key.clone(), CacheEntry::Absent).unwrap();
        store
            .put(key.clone(), CacheEntry::Identity(Identity::new("id-A")))
            .unwrap();
        assert_eq!(store.put(key.clone(), CacheEntry::Absent).unwrap(), PutOutcome::Kept);
    }

    assert_eq!(
        CacheStore::open(dir.path()).get(&key),
        Some(CacheEntry::Identity(Identity::new("id-A")))
    );
}
