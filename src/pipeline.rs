use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::chunker::Chunker;
use crate::embedding::EmbeddingModel;
use crate::error::PipelineError;
use crate::index::FlatIndex;
use crate::models::chunk::{Metadata, StoredChunk};
use crate::store::ChunkStore;

/// Default number of neighbors returned by `retrieve`.
pub const DEFAULT_TOP_K: usize = 3;

/// Index plus the same-order chunk list used to map positions back to
/// text. The two always change together, behind one lock.
struct IndexState {
    index: FlatIndex,
    chunks: Vec<StoredChunk>,
}

/// Orchestrates the retrieval pipeline: chunking, embedding, durable
/// storage and the in-memory nearest-neighbor index.
///
/// The chunk store is the system of record; the index is derived and is
/// rebuilt in full from `list_all` after every mutation. Until the first
/// successful rebuild the index is absent and queries return empty results.
///
/// Mutating operations hold the write lock across the whole
/// persist-then-rebuild sequence, so a rebuild can never miss a concurrent
/// write and `retrieve` can never observe a half-rebuilt index.
pub struct RagPipeline {
    store: Arc<dyn ChunkStore>,
    embedder: Arc<dyn EmbeddingModel>,
    chunker: Chunker,
    state: RwLock<Option<IndexState>>,
}

impl std::fmt::Debug for RagPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagPipeline").finish_non_exhaustive()
    }
}

impl RagPipeline {
    /// Construct the pipeline and attempt the initial index load. An
    /// unavailable store is tolerated here; the index stays absent until
    /// a later `reload` or ingestion succeeds.
    pub async fn new(
        store: Arc<dyn ChunkStore>,
        embedder: Arc<dyn EmbeddingModel>,
        chunker: Chunker,
    ) -> Result<Self, PipelineError> {
        let pipeline = Self {
            store,
            embedder,
            chunker,
            state: RwLock::new(None),
        };
        pipeline.reload().await?;
        Ok(pipeline)
    }

    /// Chunk `full_text`, embed the spans, persist them under `source` and
    /// rebuild the index.
    ///
    /// Zero usable spans is a logged no-op, not an error. An embedding
    /// failure aborts before anything is persisted, so text is never stored
    /// without a usable vector. Returns the number of chunks added.
    pub async fn add_document(
        &self,
        source: &str,
        full_text: &str,
        metadata: Option<Metadata>,
    ) -> Result<usize, PipelineError> {
        let spans = self.chunker.chunk(full_text);
        if spans.is_empty() {
            warn!("No usable chunks extracted from {source}; nothing ingested");
            return Ok(0);
        }

        let vectors = self
            .embedder
            .embed_for_ingestion(&spans)
            .await
            .map_err(PipelineError::Embedding)?;
        if vectors.len() != spans.len() {
            return Err(PipelineError::Embedding(anyhow::anyhow!(
                "embedding client returned {} vectors for {} chunks",
                vectors.len(),
                spans.len()
            )));
        }

        let metadata = metadata.unwrap_or_default();
        let count = spans.len();

        // Write lock held from first persist through rebuild.
        let mut state = self.state.write().await;
        for (span, vector) in spans.iter().zip(vectors.iter()) {
            self.store.create(source, span, vector, &metadata).await?;
        }
        self.rebuild_into(&mut state).await?;

        info!("Added {count} chunks from {source}");
        Ok(count)
    }

    /// Return the texts of the up-to-`k` stored chunks nearest to `query`,
    /// ascending by distance. Absent index short-circuits to an empty
    /// result before any embedding call is made.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<String>, PipelineError> {
        if self.state.read().await.is_none() {
            return Ok(vec![]);
        }

        let query_vector = self
            .embedder
            .embed_for_query(query)
            .await
            .map_err(PipelineError::Embedding)?;

        // One read guard for search + mapping: positions and chunk list
        // come from the same snapshot.
        let state = self.state.read().await;
        let Some(state) = state.as_ref() else {
            return Ok(vec![]);
        };

        let hits = state.index.search(&query_vector, k)?;
        let texts = hits
            .into_iter()
            // Positions outside the snapshot's bounds are skipped.
            .filter_map(|(position, _distance)| state.chunks.get(position))
            .map(|chunk| chunk.text.clone())
            .collect();
        Ok(texts)
    }

    /// Remove every stored chunk and clear the index. Irreversible; calling
    /// it on an empty corpus is not an error.
    pub async fn delete_all(&self) -> Result<(), PipelineError> {
        let mut state = self.state.write().await;
        self.store.delete_all().await?;
        *state = None;
        info!("Cleared corpus and index");
        Ok(())
    }

    /// Rebuild the index from the full store content. An unavailable store
    /// leaves the index absent (expected bootstrap race); a dimension
    /// mismatch among stored embeddings is fatal.
    pub async fn reload(&self) -> Result<(), PipelineError> {
        let mut state = self.state.write().await;
        match self.rebuild_into(&mut state).await {
            Err(err) if err.is_store_unavailable() => {
                *state = None;
                warn!("Skipping index load, chunk store not ready: {err}");
                Ok(())
            }
            other => other,
        }
    }

    /// Number of chunks behind the current index; 0 when absent.
    pub async fn indexed_chunks(&self) -> usize {
        self.state
            .read()
            .await
            .as_ref()
            .map(|s| s.chunks.len())
            .unwrap_or(0)
    }

    /// Fetch the full store content and rebuild into `slot`. The first
    /// chunk's embedding dimension is authoritative; a mismatched later
    /// record stops the rebuild and clears the index rather than building
    /// a malformed one.
    async fn rebuild_into(&self, slot: &mut Option<IndexState>) -> Result<(), PipelineError> {
        let chunks = self.store.list_all().await?;

        if chunks.is_empty() {
            *slot = None;
            info!("Chunk store is empty; index absent");
            return Ok(());
        }

        let expected = chunks[0].embedding.len();
        for chunk in &chunks {
            if chunk.embedding.len() != expected {
                *slot = None;
                return Err(PipelineError::DimensionMismatch {
                    expected,
                    found: chunk.embedding.len(),
                });
            }
        }

        let vectors: Vec<Vec<f32>> = chunks.iter().map(|c| c.embedding.clone()).collect();
        let index = FlatIndex::build(&vectors)?;
        info!("Index rebuilt with {} chunks (dim={expected})", chunks.len());
        *slot = Some(IndexState { index, chunks });
        Ok(())
    }
}
