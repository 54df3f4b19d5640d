use std::sync::Arc;

use tracing::info;

use crate::chat::ChatEngine;
use crate::chunker::Chunker;
use crate::completion::CompletionModel;
use crate::completion::gemini::GeminiCompletionModel;
use crate::config::Settings;
use crate::embedding::EmbeddingModel;
use crate::embedding::gemini::GeminiEmbeddingModel;
use crate::pipeline::RagPipeline;
use crate::store::ChunkStore;
use crate::store::memory::MemoryChunkStore;
use crate::store::postgres::PostgresChunkStore;

/// Fully wired application state. Built once at startup by the hosting
/// process and shared from there.
pub struct App {
    pub settings: Settings,
    pub pipeline: Arc<RagPipeline>,
    pub chat: ChatEngine,
}

impl App {
    /// Wire store, embedding and completion models, pipeline and chat
    /// engine from resolved settings.
    pub async fn build(settings: Settings) -> anyhow::Result<App> {
        // Initialize chunk store.
        let store: Arc<dyn ChunkStore> = match settings.database_provider.as_str() {
            "postgres" => {
                let uri = settings
                    .postgres_uri
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("POSTGRES_URI required for postgres provider"))?;
                let store = PostgresChunkStore::new(uri, settings.db_pool_size).await?;
                store.initialize().await?;
                Arc::new(store)
            }
            "memory" => Arc::new(MemoryChunkStore::new()),
            other => anyhow::bail!("Unknown database provider: {other}"),
        };
        info!("Chunk store initialized: {}", settings.database_provider);

        // Initialize embedding model.
        let gemini_api_key = std::env::var("GEMINI_API_KEY").unwrap_or_else(|_| "".to_string());
        let embedder: Arc<dyn EmbeddingModel> = Arc::new(GeminiEmbeddingModel::new(
            &settings.embedding_model,
            &gemini_api_key,
            settings.vector_dimensions,
        ));
        info!("Embedding model initialized: {}", settings.embedding_model);

        // Initialize completion model.
        let completion: Arc<dyn CompletionModel> = Arc::new(GeminiCompletionModel::new(
            &settings.completion_model,
            &gemini_api_key,
            settings.default_max_tokens,
            settings.default_temperature,
        ));
        info!("Completion model initialized: {}", settings.completion_model);

        // Build the pipeline; an unreachable store leaves the index absent
        // rather than failing startup.
        let chunker = Chunker::new(settings.chunk_size, settings.chunk_overlap)?;
        let pipeline = Arc::new(RagPipeline::new(store, embedder, chunker).await?);
        info!(
            "Retrieval pipeline ready ({} chunks indexed)",
            pipeline.indexed_chunks().await
        );

        let chat = ChatEngine::new(pipeline.clone(), completion, settings.default_k);

        Ok(App {
            settings,
            pipeline,
            chat,
        })
    }
}
