use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::EmbeddingModel;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Task type tag sent with every embedding request; retrieval compares
/// chunks and queries in the same similarity space.
const TASK_TYPE: &str = "SEMANTIC_SIMILARITY";

/// Gemini embedding model via the batchEmbedContents API.
pub struct GeminiEmbeddingModel {
    model_name: String,
    api_key: String,
    dimensions: u32,
    http_client: reqwest::Client,
    batch_size: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest {
    model: String,
    content: Content,
    task_type: String,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl GeminiEmbeddingModel {
    pub fn new(model_name: &str, api_key: &str, dimensions: u32) -> Self {
        Self {
            model_name: model_name.to_string(),
            api_key: api_key.to_string(),
            dimensions,
            http_client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            batch_size: 100,
        }
    }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: format!("models/{}", self.model_name),
                    content: Content {
                        parts: vec![Part { text: text.clone() }],
                    },
                    task_type: TASK_TYPE.to_string(),
                })
                .collect(),
        };

        let url = format!("{API_BASE}/models/{}:batchEmbedContents", self.model_name);
        let resp = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Gemini embedding API error ({status}): {body}");
        }

        let response: BatchEmbedResponse = resp.json().await?;
        if response.embeddings.len() != texts.len() {
            anyhow::bail!(
                "Gemini returned {} embeddings for {} inputs",
                response.embeddings.len(),
                texts.len()
            );
        }
        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[async_trait]
impl EmbeddingModel for GeminiEmbeddingModel {
    async fn embed_for_ingestion(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let embeddings = self.embed_batch(batch).await?;

            for emb in &embeddings {
                if emb.len() != self.dimensions as usize {
                    anyhow::bail!(
                        "Embedding dimension mismatch: expected {}, got {}",
                        self.dimensions,
                        emb.len()
                    );
                }
            }

            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }

    async fn embed_for_query(&self, query: &str) -> anyhow::Result<Vec<f32>> {
        let results = self.embed_batch(&[query.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("No embedding returned for query"))
    }

    fn dimensions(&self) -> u32 {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_request_serialization() {
        let req = BatchEmbedRequest {
            requests: vec![EmbedRequest {
                model: "models/gemini-embedding-001".to_string(),
                content: Content {
                    parts: vec![Part {
                        text: "hello world".to_string(),
                    }],
                },
                task_type: TASK_TYPE.to_string(),
            }],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["requests"][0]["model"], "models/gemini-embedding-001");
        assert_eq!(json["requests"][0]["taskType"], "SEMANTIC_SIMILARITY");
        assert_eq!(
            json["requests"][0]["content"]["parts"][0]["text"],
            "hello world"
        );
    }

    #[test]
    fn test_batch_response_deserialization() {
        let json = r#"{
            "embeddings": [
                {"values": [0.1, 0.2, 0.3]},
                {"values": [0.4, 0.5, 0.6]}
            ]
        }"#;
        let resp: BatchEmbedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.embeddings.len(), 2);
        assert_eq!(resp.embeddings[1].values, vec![0.4, 0.5, 0.6]);
    }
}
