//! Query-time retrieval: embed the question, search the index.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::{
    embed::EmbeddingsProvider,
    errors::{IndexError, RetrievalFailure},
    index::VectorIndex,
    record::ScoredSegment,
};

/// Read-only retriever over a built index.
///
/// Holds the same embedding provider the index was built with; construction
/// fails otherwise.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    provider: Arc<dyn EmbeddingsProvider>,
}

impl Retriever {
    /// # Errors
    /// [`IndexError::ModelMismatch`] if `provider.model_id()` differs from the
    /// model recorded in the index manifest.
    pub fn new(
        index: Arc<VectorIndex>,
        provider: Arc<dyn EmbeddingsProvider>,
    ) -> Result<Self, IndexError> {
        let built_with = &index.manifest().key.model;
        if built_with != provider.model_id() {
            return Err(IndexError::ModelMismatch {
                index: built_with.clone(),
                provider: provider.model_id().to_string(),
            });
        }
        Ok(Self { index, provider })
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    /// Returns up to `k` segments, most similar first.
    ///
    /// Empty for `k == 0`, a blank query or an empty index; no embedding call
    /// is made in those cases.
    pub async fn retrieve(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<ScoredSegment>, RetrievalFailure> {
        if k == 0 || query.trim().is_empty() || self.index.count() == 0 {
            trace!(k, "retrieve: nothing to do");
            return Ok(Vec::new());
        }

        let qv = self
            .provider
            .embed(query)
            .await
            .map_err(|e| RetrievalFailure::Embedding(e.to_string()))?;

        if qv.len() != self.index.dim() {
            return Err(RetrievalFailure::DimensionMismatch {
                got: qv.len(),
                want: self.index.dim(),
            });
        }

        let hits = self
            .index
            .search(&qv, k)
            .await
            .map_err(|e| RetrievalFailure::Search(e.to_string()))?;
        debug!(
            k,
            hits = hits.len(),
            top_score = hits.first().map(|h| h.score),
            "retrieve: done"
        );
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::EmbedError;
    use crate::index::build_index;
    use crate::index::tests::{KeywordEmbedder, opts, sample_segments};
    use crate::progress::NoopProgress;
    use std::{future::Future, pin::Pin};
    use tempfile::TempDir;

    async fn built(dir: &TempDir) -> Arc<VectorIndex> {
        let provider = KeywordEmbedder::new("kw");
        let index = build_index(sample_segments(), &provider, &opts(dir.path()), &NoopProgress)
            .await
            .unwrap();
        Arc::new(index)
    }

    async fn retriever(dir: &TempDir) -> Retriever {
        Retriever::new(built(dir).await, Arc::new(KeywordEmbedder::new("kw"))).unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn tuition_question_finds_tuition_segment() {
        let dir = tempfile::tempdir().unwrap();
        let r = retriever(&dir).await;
        let hits = r.retrieve("Học phí của MSE?", 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].segment.text.contains("300 triệu đồng"));
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn never_returns_more_than_index_holds() {
        let dir = tempfile::tempdir().unwrap();
        let r = retriever(&dir).await;
        for k in [0usize, 1, 2, 4, 10] {
            let hits = r.retrieve("học bổng", k).await.unwrap();
            assert_eq!(hits.len(), k.min(4));
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn model_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let other: Arc<dyn EmbeddingsProvider> = Arc::new(KeywordEmbedder::new("other-model"));
        let err = Retriever::new(built(&dir).await, other).err().unwrap();
        assert!(matches!(err, IndexError::ModelMismatch { .. }));
    }

    struct Broken;

    impl EmbeddingsProvider for Broken {
        fn embed<'a>(
            &'a self,
            _text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, EmbedError>> + Send + 'a>> {
            Box::pin(async { Err(EmbedError("connection refused".into())) })
        }
        fn model_id(&self) -> &str {
            "kw"
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn provider_failure_is_a_retrieval_failure() {
        let dir = tempfile::tempdir().unwrap();
        let r = Retriever::new(built(&dir).await, Arc::new(Broken)).unwrap();
        assert!(matches!(
            r.retrieve("học phí", 2).await,
            Err(RetrievalFailure::Embedding(_))
        ));
    }
}
