//! Brochure knowledge base: ingestion, a local persistent vector index and
//! top-K retrieval.
//!
//! This crate provides a small API to:
//! - Split the program brochure (PDF or text) into overlapping segments
//! - Embed them (in-process MiniLM or a remote profile) and keep them in a
//!   LanceDB table on disk, keyed by model and source hash
//! - Retrieve the segments most similar to a question
//!
//! The design is flat and splits responsibilities into focused modules.

mod chunker;
mod config;
mod embed;
mod embed_pool;
mod errors;
mod index;
mod ingest;
mod io_json;
mod loader;
mod normalize;
mod progress;
mod record;
mod retrieve;

pub use config::{ChunkingConfig, StoreConfig};
pub use embed::{
    EmbeddingsProvider,
    llm::LlmEmbedder,
    minilm::{FastEmbedder, MINILM_DIM, MINILM_MODEL_ID},
};
pub use errors::{EmbedError, IndexError, IngestionError, RetrievalFailure, StoreError};
pub use index::{BuildOptions, IndexKey, IndexManifest, VectorIndex, build_index};
pub use ingest::{ingest, source_fingerprint};
pub use progress::{IndicatifProgress, NoopProgress, Progress};
pub use record::{ScoredSegment, Segment};
pub use retrieve::Retriever;

use std::sync::Arc;

use tracing::{info, warn};

/// High-level facade that owns the built index and its embedding provider.
///
/// This is the single entry point recommended for application code.
pub struct DocStore {
    index: Arc<VectorIndex>,
    provider: Arc<dyn EmbeddingsProvider>,
}

impl DocStore {
    /// Reuses the index under `cfg.index_dir` when its key matches
    /// (model id, source fingerprint, chunking); otherwise ingests
    /// `cfg.doc_path` and rebuilds the table in place.
    ///
    /// # Errors
    /// Any [`IngestionError`] or [`IndexError`]. Never returns an empty store.
    pub async fn open_or_build(
        cfg: &StoreConfig,
        provider: Arc<dyn EmbeddingsProvider>,
        progress: &dyn Progress,
    ) -> Result<Self, StoreError> {
        cfg.chunking.validate()?;
        let fingerprint = source_fingerprint(&cfg.doc_path)?;
        let key = IndexKey::new(provider.model_id(), &fingerprint, &cfg.chunking);

        match VectorIndex::open(&cfg.index_dir).await {
            Ok(Some(index)) if index.manifest().key == key && index.count() > 0 => {
                info!(
                    dir = %cfg.index_dir.display(),
                    count = index.count(),
                    "reusing index"
                );
                return Ok(Self {
                    index: Arc::new(index),
                    provider,
                });
            }
            Ok(Some(index)) => {
                info!(
                    old_model = %index.manifest().key.model,
                    new_model = %key.model,
                    "index is stale, rebuilding"
                );
            }
            Ok(None) => info!(dir = %cfg.index_dir.display(), "no index yet, building"),
            Err(e) => warn!(error = %e, "index unreadable, rebuilding"),
        }

        let segments = ingest(&cfg.doc_path, &cfg.chunking)?;
        let opts = BuildOptions {
            dir: &cfg.index_dir,
            source_fingerprint: &fingerprint,
            chunking: cfg.chunking,
            concurrency: cfg.embed_concurrency,
        };
        let index = build_index(segments, provider.as_ref(), &opts, progress).await?;
        Ok(Self {
            index: Arc::new(index),
            provider,
        })
    }

    pub fn index(&self) -> Arc<VectorIndex> {
        self.index.clone()
    }

    pub fn count(&self) -> usize {
        self.index.count()
    }

    /// Retriever bound to this store's index and provider.
    pub fn retriever(&self) -> Result<Retriever, IndexError> {
        Retriever::new(self.index.clone(), self.provider.clone())
    }
}
