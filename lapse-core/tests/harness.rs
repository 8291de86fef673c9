//! Drives the public store API under load and with simulated time.

use lapse_core::{Store, StoreConfig};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use tokio::time::sleep;

const WRITERS: usize = 10;
const READERS: usize = 10;
const OPS_PER_THREAD: usize = 500;

#[test]
fn disjoint_writers_racing_readers_keep_every_key() {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();
    let store: Store<usize> = {
        let _guard = rt.enter();
        Store::with_config(StoreConfig::default().with_sweep_interval(Duration::from_millis(5)))
    };

    let barrier = Arc::new(Barrier::new(WRITERS + READERS));
    let hits = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::with_capacity(WRITERS + READERS);

    for writer in 0..WRITERS {
        let store = store.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..OPS_PER_THREAD {
                store.set(format!("key_{writer}_{i}"), i, None);
            }
        }));
    }

    for reader in 0..READERS {
        let store = store.clone();
        let barrier = Arc::clone(&barrier);
        let hits = Arc::clone(&hits);
        handles.push(thread::spawn(move || {
            barrier.wait();
            for i in 0..OPS_PER_THREAD {
                if let Some(value) = store.get(&format!("key_{reader}_{i}")) {
                    assert_eq!(value, i, "reader saw a torn or foreign value");
                    hits.fetch_add(1, Ordering::Relaxed);
                }
                let _ = store.keys();
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let keys: HashSet<String> = store.keys().into_iter().collect();
    let expected: HashSet<String> = (0..WRITERS)
        .flat_map(|writer| (0..OPS_PER_THREAD).map(move |i| format!("key_{writer}_{i}")))
        .collect();
    assert_eq!(keys, expected);
    assert!(hits.load(Ordering::Relaxed) <= WRITERS * OPS_PER_THREAD);

    store.close();
}

#[tokio::test(start_paused = true)]
async fn mixed_ttl_walkthrough() {
    let store = Store::new();
    store.set("a", "x", Some(Duration::from_secs(2)));
    store.set("b", "y", None);

    assert_eq!(store.get("a"), Some("x"));

    sleep(Duration::from_secs(3)).await;

    assert_eq!(store.get("a"), None);
    assert_eq!(store.get("b"), Some("y"));
    store.close();
}

#[tokio::test(start_paused = true)]
async fn expiry_boundary_is_inclusive() {
    let store = Store::with_config(
        StoreConfig::default().with_sweep_interval(Duration::from_secs(3600)),
    );
    store.set("k", 1, Some(Duration::from_secs(2)));

    sleep(Duration::from_millis(1500)).await;
    assert_eq!(store.get("k"), Some(1));

    sleep(Duration::from_millis(500)).await;
    assert_eq!(store.get("k"), None);
}

#[tokio::test(start_paused = true)]
async fn entries_without_ttl_outlive_any_delay() {
    let store = Store::new();
    store.set("permanent", "value", None);

    sleep(Duration::from_secs(3600)).await;

    assert_eq!(store.get("permanent"), Some("value"));
    assert_eq!(store.keys(), vec!["permanent"]);
}

#[tokio::test(start_paused = true)]
async fn overwrite_extends_ttl() {
    let store = Store::new();
    store.set("key", "initial", Some(Duration::from_secs(3)));

    sleep(Duration::from_secs(1)).await;
    store.set("key", "extended", Some(Duration::from_secs(4)));

    sleep(Duration::from_secs(3)).await;
    assert_eq!(store.get("key"), Some("extended"));

    sleep(Duration::from_secs(2)).await;
    assert_eq!(store.get("key"), None);
}

#[tokio::test(start_paused = true)]
async fn overwrite_can_shorten_ttl() {
    let store = Store::new();
    store.set("key", 1, Some(Duration::from_secs(60)));
    store.set("key", 2, Some(Duration::from_secs(1)));

    sleep(Duration::from_secs(2)).await;
    assert_eq!(store.get("key"), None);
}

#[tokio::test(start_paused = true)]
async fn reaper_reclaims_unread_entries() {
    let store = Store::new();
    for i in 0..5 {
        store.set(format!("bgkey{i}"), i, Some(Duration::from_secs(2)));
        store.set(format!("permkey{i}"), i, None);
    }
    assert_eq!(store.keys().len(), 10);

    // TTL plus one sweep interval
    sleep(Duration::from_millis(3100)).await;

    let keys = store.keys();
    assert_eq!(keys.len(), 5);
    assert!(keys.iter().all(|key| key.starts_with("perm")));
}

#[tokio::test(start_paused = true)]
async fn keys_lists_expired_entries_until_removed() {
    let store = Store::with_config(
        StoreConfig::default().with_sweep_interval(Duration::from_secs(3600)),
    );
    store.set("stale", 1, Some(Duration::from_secs(1)));

    sleep(Duration::from_secs(2)).await;
    assert_eq!(store.keys(), vec!["stale"]);

    assert!(!store.contains_key("stale"));
    assert!(store.keys().is_empty());
}

#[tokio::test(start_paused = true)]
async fn reaper_runs_while_any_handle_lives() {
    let store: Store<u8> = Store::new();
    let clone = store.clone();
    drop(store);

    clone.set("k", 1, Some(Duration::from_millis(100)));
    sleep(Duration::from_millis(1100)).await;
    assert!(clone.is_empty());
}
