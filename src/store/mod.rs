pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::chunk::{Metadata, StoredChunk};

/// Durable system of record for ingested chunks.
///
/// Records are append-only: `create` never updates or merges, and deletion
/// happens only in bulk via `delete_all`. The in-memory index is always
/// rebuilt from `list_all`, so the order `list_all` returns must be stable
/// within one call, since positions handed out by the index map back
/// through it.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Create backing schema if needed.
    async fn initialize(&self) -> Result<(), StoreError>;

    /// Append a new chunk record. The store assigns the id and timestamp.
    async fn create(
        &self,
        source: &str,
        text: &str,
        embedding: &[f32],
        metadata: &Metadata,
    ) -> Result<(), StoreError>;

    /// Every stored chunk, in a consistent order (insertion order).
    async fn list_all(&self) -> Result<Vec<StoredChunk>, StoreError>;

    /// Remove every chunk record unconditionally. Irreversible.
    async fn delete_all(&self) -> Result<(), StoreError>;
}
