//! In-process embeddings with fastembed's `AllMiniLML6V2` ONNX model.
//!
//! The model lives on a dedicated thread. Requests travel over a channel and
//! are answered through a oneshot; requests that queue up while the model is
//! busy are embedded together in one batch.

use std::path::PathBuf;
use std::{future::Future, pin::Pin};

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info};

use crate::{EmbeddingsProvider, errors::EmbedError};

/// Model id recorded in the index manifest.
pub const MINILM_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// Output dimension of `all-MiniLM-L6-v2`.
pub const MINILM_DIM: usize = 384;

const QUEUE_CAPACITY: usize = 256;
const MAX_BATCH: usize = 32;

struct EmbedJob {
    text: String,
    reply: oneshot::Sender<Result<Vec<f32>, EmbedError>>,
}

/// Local embedding provider. Cheap to clone; all clones share one model.
#[derive(Clone)]
pub struct FastEmbedder {
    sender: mpsc::Sender<EmbedJob>,
}

impl FastEmbedder {
    /// Loads the model (downloading it into `cache_dir` on first use) and
    /// starts the worker thread. Blocking; call it from `spawn_blocking`.
    pub fn new(cache_dir: Option<PathBuf>) -> Result<Self, EmbedError> {
        let mut opts = InitOptions::new(EmbeddingModel::AllMiniLML6V2)
            .with_show_download_progress(false);
        if let Some(dir) = cache_dir {
            opts = opts.with_cache_dir(dir);
        }
        let model = TextEmbedding::try_new(opts)
            .map_err(|e| EmbedError(format!("cannot load {MINILM_MODEL_ID}: {e}")))?;

        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        std::thread::Builder::new()
            .name("minilm-embedder".into())
            .spawn(move || run_worker(model, receiver))
            .map_err(|e| EmbedError(format!("cannot start embedding thread: {e}")))?;

        info!(model = MINILM_MODEL_ID, dim = MINILM_DIM, "local embedding model loaded");
        Ok(Self { sender })
    }
}

fn run_worker(mut model: TextEmbedding, mut receiver: mpsc::Receiver<EmbedJob>) {
    while let Some(first) = receiver.blocking_recv() {
        let mut jobs = vec![first];
        while jobs.len() < MAX_BATCH {
            match receiver.try_recv() {
                Ok(job) => jobs.push(job),
                Err(_) => break,
            }
        }

        let texts: Vec<&str> = jobs.iter().map(|j| j.text.as_str()).collect();
        match model.embed(texts, None) {
            Ok(vectors) if vectors.len() == jobs.len() => {
                debug!(batch = jobs.len(), "local embedding batch done");
                for (job, v) in jobs.into_iter().zip(vectors) {
                    let _ = job.reply.send(Ok(v));
                }
            }
            Ok(vectors) => {
                let msg = format!("model returned {} vectors for {} texts", vectors.len(), jobs.len());
                error!(error = %msg, "local embedding failed");
                for job in jobs {
                    let _ = job.reply.send(Err(EmbedError(msg.clone())));
                }
            }
            Err(e) => {
                let msg = e.to_string();
                error!(error = %msg, "local embedding failed");
                for job in jobs {
                    let _ = job.reply.send(Err(EmbedError(msg.clone())));
                }
            }
        }
    }
    debug!("local embedding worker stopped");
}

impl EmbeddingsProvider for FastEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, EmbedError>> + Send + 'a>> {
        Box::pin(async move {
            let (reply, rx) = oneshot::channel();
            self.sender
                .send(EmbedJob {
                    text: text.to_string(),
                    reply,
                })
                .await
                .map_err(|_| EmbedError("embedding worker stopped".into()))?;
            rx.await
                .unwrap_or_else(|_| Err(EmbedError("embedding worker dropped the request".into())))
        })
    }

    fn model_id(&self) -> &str {
        MINILM_MODEL_ID
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        dot / (na * nb)
    }

    #[tokio::test]
    async fn stopped_worker_is_an_embed_error() {
        let (sender, receiver) = mpsc::channel(1);
        drop(receiver);
        let embedder = FastEmbedder { sender };
        assert_eq!(embedder.model_id(), MINILM_MODEL_ID);
        let err = embedder.embed("Học phí?").await.unwrap_err();
        assert!(err.0.contains("stopped"));
    }

    // Downloads the ONNX model on first run.
    #[tokio::test(flavor = "multi_thread")]
    #[ignore = "downloads the all-MiniLM-L6-v2 model"]
    async fn minilm_vectors_rank_related_text_higher() {
        let embedder = tokio::task::spawn_blocking(|| FastEmbedder::new(None))
            .await
            .unwrap()
            .unwrap();

        let (q, fee, intake) = tokio::join!(
            embedder.embed("How much is the tuition fee?"),
            embedder.embed("The tuition fee of the program is 300 million VND."),
            embedder.embed("The campus library opens at 8 am."),
        );
        let (q, fee, intake) = (q.unwrap(), fee.unwrap(), intake.unwrap());
        assert_eq!(q.len(), MINILM_DIM);
        assert!(cosine(&q, &fee) > cosine(&q, &intake));
    }
}
