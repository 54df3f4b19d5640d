use std::sync::Arc;

use tracing::info;

use crate::completion::{CompletionModel, Message};
use crate::pipeline::RagPipeline;

/// Answer to a retrieval-augmented question, with the chunk texts that
/// grounded it.
#[derive(Debug, Clone)]
pub struct ChatAnswer {
    pub answer: String,
    pub sources: Vec<String>,
}

/// Retrieval-augmented answer flow: retrieve the nearest chunks, hand them
/// to the completion model as context, return the generated answer.
pub struct ChatEngine {
    pipeline: Arc<RagPipeline>,
    completion: Arc<dyn CompletionModel>,
    default_k: usize,
}

impl ChatEngine {
    pub fn new(
        pipeline: Arc<RagPipeline>,
        completion: Arc<dyn CompletionModel>,
        default_k: usize,
    ) -> Self {
        Self {
            pipeline,
            completion,
            default_k,
        }
    }

    /// Answer `query` using the `k` (default-configured when `None`)
    /// nearest stored chunks as context. An empty corpus still produces an
    /// answer; the model is told no context was found.
    pub async fn ask(&self, query: &str, k: Option<usize>) -> anyhow::Result<ChatAnswer> {
        let k = k.unwrap_or(self.default_k);
        let sources = self.pipeline.retrieve(query, k).await?;

        let context = if sources.is_empty() {
            "(no relevant context found)".to_string()
        } else {
            sources.join("\n\n")
        };

        let system_msg = Message {
            role: "system".to_string(),
            content: format!(
                "Use the following retrieved context to answer the user's question. \
                 If the context doesn't contain relevant information, say so.\n\n\
                 Context:\n{context}"
            ),
        };
        let user_msg = Message {
            role: "user".to_string(),
            content: query.to_string(),
        };

        let result = self
            .completion
            .complete(&[system_msg, user_msg], None, None)
            .await?;

        info!("Answered query with {} source chunks", sources.len());
        Ok(ChatAnswer {
            answer: result.content,
            sources,
        })
    }
}
