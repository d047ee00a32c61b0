//! Stampede prevention for the cache-miss path.
//!
//! A fixed table of async mutexes. Each cache key hashes to one shard, so at
//! most one fetch pipeline per key runs at a time across every aggregation
//! call sharing the table. Two keys landing on the same shard are serialized
//! with each other, which costs latency but never correctness. The table
//! never grows.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tokio::sync::{Mutex, MutexGuard};

pub struct StampedeLocks {
    shards: Vec<Mutex<()>>,
}

impl StampedeLocks {
    /// Build a table with `shards` locks (at least one).
    pub fn new(shards: usize) -> Self {
        Self {
            shards: (0..shards.max(1)).map(|_| Mutex::new(())).collect(),
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_for(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    /// Wait for the lock guarding `key`.
    pub async fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
        self.shards[self.shard_for(key)].lock().await
    }
}
