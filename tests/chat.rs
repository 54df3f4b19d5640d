//! RAG answer flow over a stub completion model.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use recall::chat::ChatEngine;
use recall::chunker::Chunker;
use recall::completion::{CompletionModel, CompletionResult, Message};
use recall::embedding::EmbeddingModel;
use recall::pipeline::RagPipeline;
use recall::store::memory::MemoryChunkStore;

const DIM: usize = 8;

struct StubEmbedder;

fn embed_text(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIM];
    for (i, b) in text.bytes().enumerate() {
        v[i % DIM] += f32::from(b) / 255.0;
    }
    v
}

#[async_trait]
impl EmbeddingModel for StubEmbedder {
    async fn embed_for_ingestion(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| embed_text(t)).collect())
    }

    async fn embed_for_query(&self, query: &str) -> anyhow::Result<Vec<f32>> {
        Ok(embed_text(query))
    }

    fn dimensions(&self) -> u32 {
        DIM as u32
    }
}

/// Records the messages it was given and answers with a canned string.
struct StubCompletion {
    seen: Mutex<Vec<Message>>,
}

#[async_trait]
impl CompletionModel for StubCompletion {
    async fn complete(
        &self,
        messages: &[Message],
        _max_tokens: Option<u32>,
        _temperature: Option<f64>,
    ) -> anyhow::Result<CompletionResult> {
        self.seen.lock().await.extend(messages.iter().cloned());
        Ok(CompletionResult {
            content: "canned answer".to_string(),
            usage: None,
        })
    }
}

async fn build_engine() -> (Arc<RagPipeline>, Arc<StubCompletion>, ChatEngine) {
    let store = Arc::new(MemoryChunkStore::new());
    let pipeline = Arc::new(
        RagPipeline::new(store, Arc::new(StubEmbedder), Chunker::default())
            .await
            .unwrap(),
    );
    let completion = Arc::new(StubCompletion {
        seen: Mutex::new(Vec::new()),
    });
    let engine = ChatEngine::new(pipeline.clone(), completion.clone(), 3);
    (pipeline, completion, engine)
}

fn single_chunk_text(fill: char) -> String {
    std::iter::repeat_n(fill, 150).collect()
}

#[tokio::test]
async fn ask_grounds_the_completion_in_retrieved_chunks() {
    let (pipeline, completion, engine) = build_engine().await;

    let doc = single_chunk_text('k');
    pipeline.add_document("k.txt", &doc, None).await.unwrap();

    let answer = engine.ask(&doc, None).await.unwrap();
    assert_eq!(answer.answer, "canned answer");
    assert_eq!(answer.sources, vec![doc.clone()]);

    let seen = completion.seen.lock().await;
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].role, "system");
    assert!(seen[0].content.contains(&doc));
    assert_eq!(seen[1].role, "user");
}

#[tokio::test]
async fn ask_on_empty_corpus_still_answers() {
    let (_pipeline, completion, engine) = build_engine().await;

    let answer = engine.ask("what is in the corpus?", Some(5)).await.unwrap();
    assert_eq!(answer.answer, "canned answer");
    assert!(answer.sources.is_empty());

    let seen = completion.seen.lock().await;
    assert!(seen[0].content.contains("no relevant context found"));
}
