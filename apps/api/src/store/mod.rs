//! Document store boundary.
//!
//! Every per-user entity lives as a JSON document at `(user_id, collection)`.
//! The rest of the service talks to `Arc<dyn DocumentStore>` and never to a
//! concrete backend, so the aggregator can be exercised against an in-memory
//! store and the production wiring can layer a Redis mirror over Postgres.

pub mod mirror;
pub mod postgres;

#[cfg(test)]
pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

/// Collection names for the per-user documents.
pub mod collections {
    /// Singleton document: identity + target role.
    pub const PROFILES: &str = "profiles";
    /// Singleton document: latest resume analysis (wholesale-replaced).
    pub const RESUME_ANALYSES: &str = "resume_analyses";
    /// Singleton document: the current roadmap structure.
    pub const ROADMAPS: &str = "roadmaps";
    /// Singleton document: completed task ids + activity counters.
    pub const ROADMAP_PROGRESS: &str = "roadmap_progress";
    /// Singleton document: earned badge ids with timestamps.
    pub const BADGES: &str = "badges";
    /// Append-only sub-collection of interview records.
    pub const INTERVIEWS: &str = "interviews";
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetches the document at `(user_id, collection)`, or `None` if absent.
    async fn fetch(&self, user_id: Uuid, collection: &str) -> Result<Option<Value>>;

    /// Merges `fields` into the document at `(user_id, collection)`,
    /// creating it if absent. Top-level fields are replaced wholesale;
    /// untouched fields survive.
    async fn merge_write(&self, user_id: Uuid, collection: &str, fields: Value) -> Result<()>;

    /// Appends one record to the `(user_id, collection)` sub-collection.
    async fn append(&self, user_id: Uuid, collection: &str, doc: Value) -> Result<()>;

    /// Fetches all records in the `(user_id, collection)` sub-collection,
    /// ordered by creation time.
    async fn list(&self, user_id: Uuid, collection: &str) -> Result<Vec<Value>>;
}
