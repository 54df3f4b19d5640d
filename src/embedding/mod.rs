pub mod gemini;

use async_trait::async_trait;

/// Abstract embedding model interface.
///
/// One vector per input text, input order preserved, all vectors of the
/// model's fixed dimension. A failed call yields no partial results.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Embed a batch of text chunks for ingestion.
    async fn embed_for_ingestion(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Embed a single query string.
    async fn embed_for_query(&self, query: &str) -> anyhow::Result<Vec<f32>>;

    /// Output dimension of the model.
    fn dimensions(&self) -> u32;
}
