use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::ChunkStore;
use crate::error::StoreError;
use crate::models::chunk::{Metadata, StoredChunk};

/// In-memory chunk store for development and tests. Same contract as the
/// postgres provider, nothing survives the process.
pub struct MemoryChunkStore {
    inner: Mutex<Inner>,
}

struct Inner {
    chunks: Vec<StoredChunk>,
    next_id: i64,
}

impl MemoryChunkStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                chunks: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Seed a record directly, bypassing the pipeline. Test hook for
    /// corrupted-corpus scenarios.
    pub async fn insert_raw(&self, source: &str, text: &str, embedding: Vec<f32>) {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.chunks.push(StoredChunk {
            id,
            source: source.to_string(),
            text: text.to_string(),
            embedding,
            metadata: Metadata::new(),
            created_at: Utc::now(),
        });
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.chunks.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.chunks.is_empty()
    }
}

impl Default for MemoryChunkStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create(
        &self,
        source: &str,
        text: &str,
        embedding: &[f32],
        metadata: &Metadata,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.chunks.push(StoredChunk {
            id,
            source: source.to_string(),
            text: text.to_string(),
            embedding: embedding.to_vec(),
            metadata: metadata.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<StoredChunk>, StoreError> {
        Ok(self.inner.lock().await.chunks.clone())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        self.inner.lock().await.chunks.clear();
        Ok(())
    }
}
