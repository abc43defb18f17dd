use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::llm_client::LlmClient;
use crate::progress::aggregator::StateAggregator;
use crate::store::DocumentStore;

/// Shared application state injected into all route handlers via Axum
/// extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub llm: LlmClient,
    pub sessions: SessionRegistry,
}

/// Owns one [`StateAggregator`] per active user. Aggregators are created and
/// initialized lazily on first touch and dropped on logout — there is no
/// module-level singleton; everything that needs one gets it from here.
#[derive(Clone)]
pub struct SessionRegistry {
    store: Arc<dyn DocumentStore>,
    sessions: Arc<Mutex<HashMap<Uuid, Arc<Mutex<StateAggregator>>>>>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the user's aggregator, locked. First touch fetches all
    /// entities; a missing or unreachable profile still yields a usable
    /// (default-populated) session per the fetch-isolation policy.
    pub async fn acquire(&self, user_id: Uuid) -> OwnedMutexGuard<StateAggregator> {
        let session = {
            let mut sessions = self.sessions.lock().await;
            sessions
                .entry(user_id)
                .or_insert_with(|| {
                    Arc::new(Mutex::new(StateAggregator::new(
                        user_id,
                        Arc::clone(&self.store),
                    )))
                })
                .clone()
        };

        let mut agg = session.lock_owned().await;
        if !agg.is_initialized() {
            let profile_loaded = agg.initialize().await;
            if !profile_loaded {
                debug!("Session for {user_id} initialized without a profile document");
            }
            agg.subscribe(move |snapshot| {
                debug!(
                    "User {user_id} snapshot: readiness={} tasks={} streak={}",
                    snapshot.readiness,
                    snapshot.tasks.len(),
                    snapshot.streak
                );
            });
        }
        agg
    }

    pub async fn remove(&self, user_id: Uuid) {
        self.sessions.lock().await.remove(&user_id);
    }
}
