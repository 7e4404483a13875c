//! Error types for ingestion, indexing and retrieval.

use std::path::PathBuf;

use thiserror::Error;

/// Loading or splitting the source document failed.
#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("source document not found: {0}")]
    Missing(PathBuf),

    #[error("cannot read {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    /// The document produced no extractable text.
    #[error("no extractable text in {0}")]
    Empty(PathBuf),

    #[error("invalid chunking: size={size}, overlap={overlap} (need size > 0 and overlap < size)")]
    InvalidChunking { size: usize, overlap: usize },
}

/// Building, opening or querying the vector index failed.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Index holds zero entries; never served.
    #[error("index is empty")]
    Empty,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("embedding failed: {0}")]
    Embedding(String),

    /// Mismatch in vector dimensionality across entries.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    #[error("corrupt index: {0}")]
    Corrupt(String),

    /// The LanceDB table could not be created, opened or queried.
    #[error("vector store error: {0}")]
    Store(String),

    /// Query-side embedding model differs from the one the index was built with.
    #[error("embedding model mismatch: index built with `{index}`, provider is `{provider}`")]
    ModelMismatch { index: String, provider: String },
}

/// Query-time retrieval failed. Callers treat it as empty context.
#[derive(Debug, Error)]
pub enum RetrievalFailure {
    #[error("query embedding failed: {0}")]
    Embedding(String),

    #[error("query vector has {got} dimensions, index has {want}")]
    DimensionMismatch { got: usize, want: usize },

    #[error("index search failed: {0}")]
    Search(String),
}

/// Embedding backend error, kept as text so providers stay decoupled.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct EmbedError(pub String);

/// Startup error of [`crate::DocStore::open_or_build`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Index(#[from] IndexError),
}
