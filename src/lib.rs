//! Retrieval pipeline core: document chunking, embedding, in-memory flat
//! vector indexing and nearest-neighbor retrieval over a durable chunk store.
//!
//! The crate is built around [`pipeline::RagPipeline`], which a hosting
//! application constructs once (see [`app::App`]) and drives through three
//! operations: `add_document`, `retrieve` and `delete_all`. The durable
//! [`store::ChunkStore`] is the system of record; the in-memory index is
//! rebuilt from it in full after every mutation and is never authoritative.

pub mod app;
pub mod chat;
pub mod chunker;
pub mod completion;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod models;
pub mod pipeline;
pub mod store;

pub use chat::{ChatAnswer, ChatEngine};
pub use chunker::Chunker;
pub use config::{Settings, load_settings_from_path};
pub use error::{IndexError, PipelineError, StoreError};
pub use index::FlatIndex;
pub use models::chunk::{Metadata, StoredChunk};
pub use pipeline::RagPipeline;
