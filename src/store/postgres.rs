use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::info;

use super::ChunkStore;
use crate::error::StoreError;
use crate::models::chunk::{Metadata, StoredChunk};

/// PostgreSQL chunk store.
pub struct PostgresChunkStore {
    pool: PgPool,
}

impl PostgresChunkStore {
    pub async fn new(uri: &str, pool_size: u32) -> Result<Self, StoreError> {
        let clean_uri = uri.replace("postgresql+asyncpg://", "postgresql://");
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(10))
            .connect(&clean_uri)
            .await
            .map_err(classify)?;

        info!("Connected to PostgreSQL chunk store (pool_size={pool_size})");
        Ok(Self { pool })
    }
}

/// Split connectivity/bootstrap failures from genuine query failures.
/// Undefined table/database and shutdown SQLSTATEs count as unavailable:
/// they are the schema-not-ready races the pipeline tolerates at startup.
fn classify(err: sqlx::Error) -> StoreError {
    let unavailable = match &err {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Configuration(_) => true,
        // undefined_table, undefined_database, cannot_connect_now,
        // admin_shutdown / crash_shutdown.
        sqlx::Error::Database(db) => matches!(
            db.code().as_deref(),
            Some("42P01") | Some("3D000") | Some("57P03") | Some("57P01") | Some("57P02")
        ),
        _ => false,
    };
    if unavailable {
        StoreError::Unavailable(err.into())
    } else {
        StoreError::Query(err.into())
    }
}

#[async_trait]
impl ChunkStore for PostgresChunkStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rag_chunks (
                id BIGSERIAL PRIMARY KEY,
                source VARCHAR(255) NOT NULL,
                text TEXT NOT NULL,
                embedding REAL[] NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{}',
                created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_rag_chunks_source ON rag_chunks(source)")
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        info!("rag_chunks table initialized");
        Ok(())
    }

    async fn create(
        &self,
        source: &str,
        text: &str,
        embedding: &[f32],
        metadata: &Metadata,
    ) -> Result<(), StoreError> {
        let metadata_json =
            serde_json::to_value(metadata).map_err(|e| StoreError::Query(e.into()))?;

        sqlx::query(
            "INSERT INTO rag_chunks (source, text, embedding, metadata)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(source)
        .bind(text)
        .bind(embedding)
        .bind(&metadata_json)
        .execute(&self.pool)
        .await
        .map_err(classify)?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<StoredChunk>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, source, text, embedding, metadata, created_at
             FROM rag_chunks
             ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;

        let mut chunks = Vec::with_capacity(rows.len());
        for row in rows {
            let metadata_json: serde_json::Value = row.get("metadata");
            chunks.push(StoredChunk {
                id: row.get("id"),
                source: row.get("source"),
                text: row.get("text"),
                embedding: row.get("embedding"),
                metadata: serde_json::from_value(metadata_json).unwrap_or_default(),
                created_at: row.get("created_at"),
            });
        }

        Ok(chunks)
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM rag_chunks")
            .execute(&self.pool)
            .await
            .map_err(classify)?;

        info!("Deleted all chunks ({} rows)", result.rows_affected());
        Ok(())
    }
}
