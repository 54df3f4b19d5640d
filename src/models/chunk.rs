use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Caller-supplied key-value mapping attached to a chunk, opaque to the
/// pipeline.
pub type Metadata = HashMap<String, serde_json::Value>;

/// A persisted unit of retrievable text: one span of a source document
/// together with its embedding. Created once by the store, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Store-assigned identifier, stable for the chunk's lifetime.
    pub id: i64,
    /// Identifier of the originating document (e.g. filename).
    pub source: String,
    /// The chunk's raw text span.
    pub text: String,
    /// Embedding vector; every stored chunk shares one dimension.
    #[serde(default)]
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_chunk_serde_round_trip() {
        let chunk = StoredChunk {
            id: 7,
            source: "report.pdf".to_string(),
            text: "quarterly figures".to_string(),
            embedding: vec![0.25, -0.5],
            metadata: HashMap::from([("page".to_string(), serde_json::json!(3))]),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&chunk).unwrap();
        let back: StoredChunk = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, 7);
        assert_eq!(back.source, "report.pdf");
        assert_eq!(back.embedding, vec![0.25, -0.5]);
        assert_eq!(back.metadata.get("page").unwrap(), 3);
    }

    #[test]
    fn test_embedding_defaults_empty() {
        let json = r#"{
            "id": 1,
            "source": "a.txt",
            "text": "hello",
            "created_at": "2025-01-01T00:00:00Z"
        }"#;
        let chunk: StoredChunk = serde_json::from_str(json).unwrap();
        assert!(chunk.embedding.is_empty());
        assert!(chunk.metadata.is_empty());
    }
}
