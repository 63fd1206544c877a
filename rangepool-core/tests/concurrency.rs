//! Many threads against one file-backed store
//!
//! Run the heavier variant with: cargo test --test concurrency -- --ignored

use rangepool_core::address::parse_ipv4;
use rangepool_core::bulk::reset;
use rangepool_core::store::StoreOptions;
use rangepool_core::{AsyncRangeStore, EntryStatus, RangeStore};
use std::fs;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn shared_store(dir: &TempDir) -> Arc<RangeStore> {
    let options = StoreOptions {
        max_connections: 8,
        busy_timeout: Duration::from_secs(30),
        ..StoreOptions::default()
    };
    Arc::new(RangeStore::open(dir.path().join("pools.db"), options).unwrap())
}

#[test]
fn test_racing_duplicate_inserts_store_once() {
    let dir = TempDir::new().unwrap();
    let store = shared_store(&dir);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                (0..25)
                    .filter(|i| {
                        let cidr = format!("10.{}.0.0/16", i);
                        store
                            .insert(&cidr, "race", "", EntryStatus::Blocked)
                            .unwrap()
                            .is_none()
                    })
                    .count()
            })
        })
        .collect();

    let fresh: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(fresh, 25);
    assert_eq!(store.count().unwrap(), 25);
}

#[test]
fn test_readers_never_see_partial_entries() {
    let dir = TempDir::new().unwrap();
    let store = shared_store(&dir);
    store.insert("10.0.0.0/8", "base", "", EntryStatus::Blocked).unwrap();

    let writer = {
        let store = store.clone();
        thread::spawn(move || {
            for i in 0..50 {
                store
                    .insert(&format!("11.{}.0.0/16", i), "extra", "", EntryStatus::Whitelisted)
                    .unwrap();
                let status = if i % 2 == 0 {
                    EntryStatus::Whitelisted
                } else {
                    EntryStatus::Blocked
                };
                store.set_status_by_pool("base", status).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            thread::spawn(move || {
                let addr = parse_ipv4("10.200.1.1").unwrap();
                for _ in 0..200 {
                    let entry = store.find_containing(addr).unwrap().unwrap();
                    assert_eq!(entry.cidr, "10.0.0.0/8");
                    assert!(entry.contains(addr));
                    assert_eq!(entry.pool_name, "base");
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(store.count().unwrap(), 51);
}

#[test]
fn test_reset_while_reading() {
    let dir = TempDir::new().unwrap();
    let store = shared_store(&dir);
    store.insert("192.0.2.0/24", "docs", "", EntryStatus::Blocked).unwrap();

    let lists = dir.path().join("lists");
    fs::create_dir_all(lists.join("whitelists")).unwrap();
    fs::create_dir_all(lists.join("blocklists")).unwrap();
    fs::write(lists.join("whitelists/docs.conf"), "Require ip 192.0.2.0/24\n").unwrap();

    let reader = {
        let store = store.clone();
        thread::spawn(move || {
            let addr = parse_ipv4("192.0.2.10").unwrap();
            for _ in 0..200 {
                // Before the reset the entry is blocked, after it whitelisted; it is never missing
                let entry = store.find_containing(addr).unwrap();
                assert!(entry.is_some());
            }
        })
    };

    let summary = reset(&store, &dir.path().join("backup"), &lists).unwrap();
    reader.join().unwrap();

    assert_eq!(summary.imported.directives, 1);
    let entry = store.find_containing(parse_ipv4("192.0.2.10").unwrap()).unwrap().unwrap();
    assert_eq!(entry.status, EntryStatus::Whitelisted);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_async_facade_on_file_store() {
    let dir = TempDir::new().unwrap();
    let store = AsyncRangeStore::new(shared_store(&dir));

    let mut tasks = Vec::new();
    for i in 0..16u32 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store
                .insert(format!("172.16.{}.0/24", i), format!("pool{}", i % 4), String::new(), EntryStatus::Blocked)
                .await
                .unwrap()
        }));
    }
    for task in tasks {
        assert!(task.await.unwrap().is_none());
    }

    assert_eq!(store.list_pool_names().await.unwrap().len(), 4);
    let hit = store
        .find_containing(parse_ipv4("172.16.9.9").unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.pool_name, "pool1");
}

#[test]
#[ignore]
fn stress_many_writers() {
    let dir = TempDir::new().unwrap();
    let store = shared_store(&dir);
    let start = Instant::now();

    let handles: Vec<_> = (0..8u32)
        .map(|t| {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..500u32 {
                    let ip = std::net::Ipv4Addr::from((t << 24) | (i << 8) | 1);
                    store.insert(&ip.to_string(), "stress", "", EntryStatus::Blocked).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    println!("4000 inserts in {:?}", start.elapsed());
    assert_eq!(store.count().unwrap(), 4000);
}
