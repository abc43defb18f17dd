use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::store::DocumentStore;

/// Wraps the remote store with a Redis mirror.
///
/// Reads go to the remote first; successful results are copied into the
/// mirror best-effort, and a failed remote read is served from the mirror
/// instead. Writes go to the remote only — the mirrored copy is invalidated
/// so the next read refreshes it. Mirror errors are logged, never propagated:
/// the mirror can only make things better.
pub struct MirroredStore {
    remote: Arc<dyn DocumentStore>,
    mirror: redis::Client,
}

impl MirroredStore {
    pub fn new(remote: Arc<dyn DocumentStore>, mirror: redis::Client) -> Self {
        Self { remote, mirror }
    }

    async fn mirror_put(&self, key: &str, value: &Value) {
        let payload = value.to_string();
        let result: redis::RedisResult<()> = async {
            let mut con = self.mirror.get_multiplexed_async_connection().await?;
            con.set(key, payload).await
        }
        .await;
        if let Err(e) = result {
            warn!("Mirror write for {key} failed: {e}");
        }
    }

    async fn mirror_get(&self, key: &str) -> Option<Value> {
        let result: redis::RedisResult<Option<String>> = async {
            let mut con = self.mirror.get_multiplexed_async_connection().await?;
            con.get(key).await
        }
        .await;
        match result {
            Ok(Some(payload)) => serde_json::from_str(&payload).ok(),
            Ok(None) => None,
            Err(e) => {
                warn!("Mirror read for {key} failed: {e}");
                None
            }
        }
    }

    async fn mirror_del(&self, key: &str) {
        let result: redis::RedisResult<()> = async {
            let mut con = self.mirror.get_multiplexed_async_connection().await?;
            con.del(key).await
        }
        .await;
        if let Err(e) = result {
            warn!("Mirror invalidation for {key} failed: {e}");
        }
    }
}

fn doc_key(user_id: Uuid, collection: &str) -> String {
    format!("mirror:{user_id}:{collection}")
}

fn list_key(user_id: Uuid, collection: &str) -> String {
    format!("mirror:{user_id}:{collection}:list")
}

#[async_trait]
impl DocumentStore for MirroredStore {
    async fn fetch(&self, user_id: Uuid, collection: &str) -> Result<Option<Value>> {
        let key = doc_key(user_id, collection);
        match self.remote.fetch(user_id, collection).await {
            Ok(Some(doc)) => {
                self.mirror_put(&key, &doc).await;
                Ok(Some(doc))
            }
            Ok(None) => {
                // Remote is authoritative about absence.
                self.mirror_del(&key).await;
                Ok(None)
            }
            Err(e) => match self.mirror_get(&key).await {
                Some(doc) => {
                    warn!("Remote fetch of {collection} for {user_id} failed ({e}); serving mirror");
                    Ok(Some(doc))
                }
                None => Err(e),
            },
        }
    }

    async fn merge_write(&self, user_id: Uuid, collection: &str, fields: Value) -> Result<()> {
        self.remote.merge_write(user_id, collection, fields).await?;
        self.mirror_del(&doc_key(user_id, collection)).await;
        Ok(())
    }

    async fn append(&self, user_id: Uuid, collection: &str, doc: Value) -> Result<()> {
        self.remote.append(user_id, collection, doc).await?;
        self.mirror_del(&list_key(user_id, collection)).await;
        Ok(())
    }

    async fn list(&self, user_id: Uuid, collection: &str) -> Result<Vec<Value>> {
        let key = list_key(user_id, collection);
        match self.remote.list(user_id, collection).await {
            Ok(docs) => {
                self.mirror_put(&key, &Value::Array(docs.clone())).await;
                Ok(docs)
            }
            Err(e) => match self.mirror_get(&key).await {
                Some(Value::Array(docs)) => {
                    warn!("Remote list of {collection} for {user_id} failed ({e}); serving mirror");
                    Ok(docs)
                }
                _ => Err(e),
            },
        }
    }
}
