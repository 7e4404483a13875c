//! Embedding executor with concurrency and dimension checks.

use futures::stream::{self, StreamExt};
use tracing::{debug, info};

use crate::{embed::EmbeddingsProvider, errors::IndexError, progress::Progress, record::Segment};

/// Embeds every segment, returning vectors in segment order.
///
/// # Arguments
/// - `segments`: segments to embed.
/// - `provider`: embedding backend.
/// - `concurrency`: maximum number of in-flight requests.
/// - `progress`: advanced once per finished segment.
///
/// # Errors
/// - [`IndexError::Embedding`] if the provider fails or returns an empty vector
/// - [`IndexError::VectorSizeMismatch`] if vectors disagree on dimension
pub async fn embed_segments(
    segments: &[Segment],
    provider: &dyn EmbeddingsProvider,
    concurrency: usize,
    progress: &dyn Progress,
) -> Result<Vec<Vec<f32>>, IndexError> {
    info!(
        total = segments.len(),
        concurrency,
        model = provider.model_id(),
        "embedding segments"
    );
    progress.set_total(segments.len() as u64);

    let results: Vec<(usize, Vec<f32>)> = stream::iter(segments.iter().enumerate())
        .map(|(i, seg)| async move {
            let v = provider
                .embed(&seg.text)
                .await
                .map_err(|e| IndexError::Embedding(format!("segment {}: {e}", seg.ordinal)))?;
            Ok::<(usize, Vec<f32>), IndexError>((i, v))
        })
        .buffer_unordered(concurrency.max(1))
        .inspect(|_| progress.step("embedding"))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, IndexError>>()?;

    let mut ordered: Vec<Vec<f32>> = vec![Vec::new(); segments.len()];
    for (i, v) in results {
        ordered[i] = v;
    }

    let want = ordered.first().map(Vec::len).unwrap_or(0);
    if want == 0 && !ordered.is_empty() {
        return Err(IndexError::Embedding("provider returned an empty vector".into()));
    }
    if let Some(bad) = ordered.iter().find(|v| v.len() != want) {
        return Err(IndexError::VectorSizeMismatch {
            got: bad.len(),
            want,
        });
    }

    progress.finish("embeddings ready");
    debug!(dim = want, "embed_segments: done");
    Ok(ordered)
}
