use thiserror::Error;

/// Errors raised at the chunk store boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing persistence layer is not reachable or its schema is not
    /// yet initialized. Tolerated during pipeline construction and `reload`
    /// (the index is simply left absent); fatal everywhere else.
    #[error("chunk store unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),

    /// Any other store failure (constraint violation, serialization, ...).
    #[error("chunk store query failed: {0}")]
    Query(#[source] anyhow::Error),
}

/// Errors raised by the flat vector index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Vectors of inconsistent length were handed to `build`, or a query
    /// vector does not match the index dimension.
    #[error("embedding dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

/// Failure taxonomy of the retrieval pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The embedding client rejected or failed the call. Always fatal to
    /// the enclosing operation; never retried.
    #[error("embedding request failed: {0}")]
    Embedding(#[source] anyhow::Error),

    /// A chunk store failure surfaced through a pipeline operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Stored embeddings of inconsistent length were encountered during an
    /// index rebuild. Indicates a mixed-model or corrupted corpus; the
    /// rebuild stops and the index is cleared rather than built malformed.
    #[error("embedding dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}

impl From<IndexError> for PipelineError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::DimensionMismatch { expected, found } => {
                PipelineError::DimensionMismatch { expected, found }
            }
        }
    }
}

impl PipelineError {
    /// True when the error is a store-unavailable condition, the one kind
    /// tolerated during bootstrap.
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, PipelineError::Store(StoreError::Unavailable(_)))
    }
}
