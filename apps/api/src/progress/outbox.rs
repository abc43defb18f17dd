//! Write outbox for the aggregator's optimistic mutations.
//!
//! In-memory state is updated first and never rolled back; the trailing
//! persistence write runs here with a bounded retry budget. Callers can
//! observe the per-collection [`SyncState`] instead of diverging silently —
//! `Failed` means the local copy is ahead of the store until the next
//! successful write of the same field.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, warn};
use uuid::Uuid;

use crate::store::DocumentStore;

pub const MAX_ATTEMPTS: u32 = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Pending,
    Synced,
    Failed,
}

pub struct Outbox {
    store: Arc<dyn DocumentStore>,
    user_id: Uuid,
    states: Arc<Mutex<BTreeMap<String, SyncState>>>,
}

impl Outbox {
    pub fn new(store: Arc<dyn DocumentStore>, user_id: Uuid) -> Self {
        Self {
            store,
            user_id,
            states: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Current sync state per collection that has seen at least one submit.
    pub fn sync_states(&self) -> BTreeMap<String, SyncState> {
        self.states.lock().expect("outbox state lock poisoned").clone()
    }

    /// Queues a merge-write and returns immediately. The caller's in-memory
    /// update already happened; whatever the write's fate, it is reflected
    /// only in the sync state.
    pub fn submit(&self, collection: &'static str, fields: Value) {
        self.states
            .lock()
            .expect("outbox state lock poisoned")
            .insert(collection.to_string(), SyncState::Pending);

        let store = Arc::clone(&self.store);
        let states = Arc::clone(&self.states);
        let user_id = self.user_id;
        tokio::spawn(async move {
            let outcome = write_with_retry(&store, user_id, collection, fields).await;
            states
                .lock()
                .expect("outbox state lock poisoned")
                .insert(collection.to_string(), outcome);
        });
    }
}

/// Merge-writes with exponential backoff, up to [`MAX_ATTEMPTS`] tries.
pub(crate) async fn write_with_retry(
    store: &Arc<dyn DocumentStore>,
    user_id: Uuid,
    collection: &str,
    fields: Value,
) -> SyncState {
    for attempt in 0..MAX_ATTEMPTS {
        if attempt > 0 {
            let delay = RETRY_BASE_DELAY * (1 << (attempt - 1));
            warn!(
                "Retrying {collection} write for {user_id} (attempt {}) after {}ms",
                attempt + 1,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }

        match store.merge_write(user_id, collection, fields.clone()).await {
            Ok(()) => return SyncState::Synced,
            Err(e) => warn!("{collection} write for {user_id} failed: {e:#}"),
        }
    }

    error!("Giving up on {collection} write for {user_id} after {MAX_ATTEMPTS} attempts");
    SyncState::Failed
}
