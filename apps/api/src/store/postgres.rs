use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::store::DocumentStore;

/// Postgres-backed document store. Singleton documents live in `documents`
/// keyed by `(user_id, collection)`; append-only sub-collections live in
/// `document_items` ordered by insertion time.
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the document tables if they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                user_id    UUID        NOT NULL,
                collection TEXT        NOT NULL,
                doc        JSONB       NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                PRIMARY KEY (user_id, collection)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS document_items (
                id         UUID        PRIMARY KEY,
                user_id    UUID        NOT NULL,
                collection TEXT        NOT NULL,
                doc        JSONB       NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS document_items_user_collection
             ON document_items (user_id, collection, created_at)",
        )
        .execute(&self.pool)
        .await?;

        info!("Document store schema ready");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn fetch(&self, user_id: Uuid, collection: &str) -> Result<Option<Value>> {
        let doc: Option<Value> = sqlx::query_scalar(
            "SELECT doc FROM documents WHERE user_id = $1 AND collection = $2",
        )
        .bind(user_id)
        .bind(collection)
        .fetch_optional(&self.pool)
        .await?;
        Ok(doc)
    }

    async fn merge_write(&self, user_id: Uuid, collection: &str, fields: Value) -> Result<()> {
        // jsonb || replaces top-level keys and keeps the rest, which is
        // exactly the merge-write contract.
        sqlx::query(
            r#"
            INSERT INTO documents (user_id, collection, doc)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, collection)
            DO UPDATE SET doc = documents.doc || EXCLUDED.doc, updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(collection)
        .bind(fields)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn append(&self, user_id: Uuid, collection: &str, doc: Value) -> Result<()> {
        sqlx::query(
            "INSERT INTO document_items (id, user_id, collection, doc) VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(collection)
        .bind(doc)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list(&self, user_id: Uuid, collection: &str) -> Result<Vec<Value>> {
        let docs: Vec<Value> = sqlx::query_scalar(
            "SELECT doc FROM document_items
             WHERE user_id = $1 AND collection = $2
             ORDER BY created_at ASC",
        )
        .bind(user_id)
        .bind(collection)
        .fetch_all(&self.pool)
        .await?;
        Ok(docs)
    }
}
