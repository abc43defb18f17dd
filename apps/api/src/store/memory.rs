//! In-memory document store used by the aggregator and outbox tests.
//! Supports injected read failures (per collection) and write failures
//! (a countdown or a permanent switch).

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::store::DocumentStore;

#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<(Uuid, String), Value>>,
    items: Mutex<HashMap<(Uuid, String), Vec<Value>>>,
    failing_reads: Mutex<HashSet<String>>,
    write_failures_remaining: AtomicU32,
    fail_all_writes: AtomicBool,
    writes: AtomicU32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, user_id: Uuid, collection: &str, doc: Value) {
        self.docs
            .lock()
            .unwrap()
            .insert((user_id, collection.to_string()), doc);
    }

    pub fn seed_item(&self, user_id: Uuid, collection: &str, doc: Value) {
        self.items
            .lock()
            .unwrap()
            .entry((user_id, collection.to_string()))
            .or_default()
            .push(doc);
    }

    pub fn document(&self, user_id: Uuid, collection: &str) -> Option<Value> {
        self.docs
            .lock()
            .unwrap()
            .get(&(user_id, collection.to_string()))
            .cloned()
    }

    /// Makes every read of `collection` fail until cleared.
    pub fn fail_reads_for(&self, collection: &str) {
        self.failing_reads
            .lock()
            .unwrap()
            .insert(collection.to_string());
    }

    /// Makes the next `n` writes fail, then succeed again.
    pub fn fail_next_writes(&self, n: u32) {
        self.write_failures_remaining.store(n, Ordering::SeqCst);
    }

    /// Makes every write fail until cleared.
    pub fn fail_all_writes(&self, fail: bool) {
        self.fail_all_writes.store(fail, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> u32 {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_read(&self, collection: &str) -> Result<()> {
        if self.failing_reads.lock().unwrap().contains(collection) {
            bail!("injected read failure for {collection}");
        }
        Ok(())
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_all_writes.load(Ordering::SeqCst) {
            bail!("injected write failure");
        }
        let remaining = self.write_failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.write_failures_remaining
                .store(remaining - 1, Ordering::SeqCst);
            bail!("injected write failure ({remaining} remaining)");
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch(&self, user_id: Uuid, collection: &str) -> Result<Option<Value>> {
        self.check_read(collection)?;
        Ok(self.document(user_id, collection))
    }

    async fn merge_write(&self, user_id: Uuid, collection: &str, fields: Value) -> Result<()> {
        self.check_write()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut docs = self.docs.lock().unwrap();
        let slot = docs
            .entry((user_id, collection.to_string()))
            .or_insert_with(|| Value::Object(Default::default()));
        match (slot.as_object_mut(), fields.as_object()) {
            (Some(existing), Some(incoming)) => {
                for (k, v) in incoming {
                    existing.insert(k.clone(), v.clone());
                }
            }
            _ => *slot = fields,
        }
        Ok(())
    }

    async fn append(&self, user_id: Uuid, collection: &str, doc: Value) -> Result<()> {
        self.check_write()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.seed_item(user_id, collection, doc);
        Ok(())
    }

    async fn list(&self, user_id: Uuid, collection: &str) -> Result<Vec<Value>> {
        self.check_read(collection)?;
        Ok(self
            .items
            .lock()
            .unwrap()
            .get(&(user_id, collection.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}
