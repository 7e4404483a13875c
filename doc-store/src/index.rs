//! Vector index stored in a LanceDB table, with a JSON manifest sidecar.
//!
//! Layout of the index directory:
//! - `segments.lance/`: LanceDB table (`ordinal`, `text`, `offset`, `page`, `vector`)
//! - `manifest.json`: version key and counts, written last
//!
//! A directory without `manifest.json` holds no index. Search is a cosine
//! nearest-neighbour query on the table.

use std::cmp::Ordering;
use std::path::Path;
use std::sync::Arc;

use arrow_array::types::Float32Type;
use arrow_array::{
    Array, ArrayRef, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator,
    StringArray, UInt32Array, UInt64Array,
};
use arrow_schema::{DataType, Field, Schema};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, DistanceType, Table, connect};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    config::ChunkingConfig,
    embed::EmbeddingsProvider,
    embed_pool::embed_segments,
    errors::IndexError,
    io_json,
    progress::Progress,
    record::{ScoredSegment, Segment},
};

pub const FORMAT_VERSION: u32 = 2;
const MANIFEST_FILE: &str = "manifest.json";
const TABLE: &str = "segments";

/// Inputs that decide whether a persisted index can be reused.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKey {
    pub format_version: u32,
    /// Embedding model id; changing it invalidates the index.
    pub model: String,
    /// SHA-256 of the source document.
    pub source_fingerprint: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl IndexKey {
    pub fn new(model: &str, source_fingerprint: &str, chunking: &ChunkingConfig) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            model: model.to_string(),
            source_fingerprint: source_fingerprint.to_string(),
            chunk_size: chunking.chunk_size,
            chunk_overlap: chunking.chunk_overlap,
        }
    }
}

/// Persisted description of an index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexManifest {
    #[serde(flatten)]
    pub key: IndexKey,
    pub dim: usize,
    pub count: usize,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Read-only vector index over one LanceDB table. Built once at startup.
pub struct VectorIndex {
    manifest: IndexManifest,
    table: Table,
}

impl std::fmt::Debug for VectorIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorIndex")
            .field("manifest", &self.manifest)
            .field("table", &self.table.name())
            .finish()
    }
}

/// Options for [`build_index`].
pub struct BuildOptions<'a> {
    /// Index directory; any previous index there is replaced.
    pub dir: &'a Path,
    pub source_fingerprint: &'a str,
    pub chunking: ChunkingConfig,
    pub concurrency: usize,
}

fn store_err(e: lancedb::Error) -> IndexError {
    IndexError::Store(e.to_string())
}

async fn connect_dir(dir: &Path) -> Result<Connection, IndexError> {
    let uri = dir.to_string_lossy().to_string();
    connect(&uri).execute().await.map_err(store_err)
}

fn table_schema(dim: usize) -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("ordinal", DataType::UInt64, false),
        Field::new("text", DataType::Utf8, false),
        Field::new("offset", DataType::UInt64, false),
        Field::new("page", DataType::UInt32, true),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                dim as i32,
            ),
            true,
        ),
    ]))
}

fn to_batch(
    schema: Arc<Schema>,
    segments: &[Segment],
    vectors: Vec<Vec<f32>>,
    dim: usize,
) -> Result<RecordBatch, IndexError> {
    let ordinals = UInt64Array::from_iter_values(segments.iter().map(|s| s.ordinal as u64));
    let texts = StringArray::from_iter_values(segments.iter().map(|s| s.text.as_str()));
    let offsets = UInt64Array::from_iter_values(segments.iter().map(|s| s.offset as u64));
    let pages = UInt32Array::from(segments.iter().map(|s| s.page).collect::<Vec<_>>());
    let vectors = FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(
        vectors.into_iter().map(|v| Some(v.into_iter().map(Some))),
        dim as i32,
    );

    let columns: Vec<ArrayRef> = vec![
        Arc::new(ordinals),
        Arc::new(texts),
        Arc::new(offsets),
        Arc::new(pages),
        Arc::new(vectors),
    ];
    RecordBatch::try_new(schema, columns).map_err(|e| IndexError::Store(e.to_string()))
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T, IndexError> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<T>())
        .ok_or_else(|| IndexError::Corrupt(format!("missing or mistyped column `{name}`")))
}

/// Decodes the segment columns of `batch`, plus `_distance` when present.
fn read_rows(batch: &RecordBatch) -> Result<Vec<(Segment, Option<f32>)>, IndexError> {
    let ordinals = column::<UInt64Array>(batch, "ordinal")?;
    let texts = column::<StringArray>(batch, "text")?;
    let offsets = column::<UInt64Array>(batch, "offset")?;
    let pages = column::<UInt32Array>(batch, "page")?;
    let distances = column::<Float32Array>(batch, "_distance").ok();

    Ok((0..batch.num_rows())
        .map(|i| {
            let segment = Segment {
                ordinal: ordinals.value(i) as usize,
                text: texts.value(i).to_string(),
                offset: offsets.value(i) as usize,
                page: (!pages.is_null(i)).then(|| pages.value(i)),
            };
            (segment, distances.map(|d| d.value(i)))
        })
        .collect())
}

fn vector_dim(schema: &Schema) -> Option<usize> {
    schema
        .field_with_name("vector")
        .ok()
        .and_then(|f| match f.data_type() {
            DataType::FixedSizeList(_, dim) => Some(*dim as usize),
            _ => None,
        })
}

/// Embeds `segments` and writes them to a fresh table under `opts.dir`.
///
/// The old manifest is removed first and the new one written last, so an
/// interrupted build leaves no index that [`VectorIndex::open`] would accept.
///
/// # Errors
/// - [`IndexError::Empty`] if no entries result
/// - embedding and dimension errors from the provider
/// - [`IndexError::Store`] / [`IndexError::Io`] when the table cannot be written
pub async fn build_index(
    segments: Vec<Segment>,
    provider: &dyn EmbeddingsProvider,
    opts: &BuildOptions<'_>,
    progress: &dyn Progress,
) -> Result<VectorIndex, IndexError> {
    if segments.is_empty() {
        return Err(IndexError::Empty);
    }

    let vectors = embed_segments(&segments, provider, opts.concurrency, progress).await?;
    let dim = vectors.first().map(Vec::len).unwrap_or(0);

    std::fs::create_dir_all(opts.dir)?;
    let manifest_path = opts.dir.join(MANIFEST_FILE);
    if manifest_path.exists() {
        std::fs::remove_file(&manifest_path)?;
    }

    let db = connect_dir(opts.dir).await?;
    let existing = db.table_names().execute().await.map_err(store_err)?;
    if existing.iter().any(|n| n == TABLE) {
        debug!(dir = %opts.dir.display(), "dropping previous segments table");
        db.drop_table(TABLE, &[]).await.map_err(store_err)?;
    }

    let schema = table_schema(dim);
    let batch = to_batch(schema.clone(), &segments, vectors, dim)?;
    let table = db
        .create_table(
            TABLE,
            RecordBatchIterator::new(vec![batch].into_iter().map(Ok), schema),
        )
        .execute()
        .await
        .map_err(store_err)?;

    let manifest = IndexManifest {
        key: IndexKey::new(provider.model_id(), opts.source_fingerprint, &opts.chunking),
        dim,
        count: segments.len(),
        created_at: chrono::Utc::now(),
    };
    io_json::write_json(&manifest_path, &manifest)?;

    info!(
        dir = %opts.dir.display(),
        count = manifest.count,
        dim,
        model = provider.model_id(),
        "index built"
    );
    Ok(VectorIndex { manifest, table })
}

impl VectorIndex {
    pub fn count(&self) -> usize {
        self.manifest.count
    }

    pub fn dim(&self) -> usize {
        self.manifest.dim
    }

    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    /// All stored segments in document order.
    pub async fn segments(&self) -> Result<Vec<Segment>, IndexError> {
        let batches: Vec<RecordBatch> = self
            .table
            .query()
            .execute()
            .await
            .map_err(store_err)?
            .try_collect()
            .await
            .map_err(store_err)?;

        let mut out = Vec::with_capacity(self.count());
        for batch in &batches {
            out.extend(read_rows(batch)?.into_iter().map(|(s, _)| s));
        }
        out.sort_by_key(|s| s.ordinal);
        Ok(out)
    }

    /// Top-`k` segments by cosine similarity, most similar first.
    ///
    /// Equal scores keep document order. Returns at most `min(k, count)` hits.
    ///
    /// # Errors
    /// [`IndexError::VectorSizeMismatch`] for a query of the wrong dimension,
    /// [`IndexError::Store`] when the table query fails.
    pub async fn search(&self, query: &[f32], k: usize) -> Result<Vec<ScoredSegment>, IndexError> {
        if k == 0 || self.count() == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dim() {
            return Err(IndexError::VectorSizeMismatch {
                got: query.len(),
                want: self.dim(),
            });
        }

        let batches: Vec<RecordBatch> = self
            .table
            .query()
            .nearest_to(query.to_vec())
            .map_err(store_err)?
            .distance_type(DistanceType::Cosine)
            .limit(k.min(self.count()))
            .execute()
            .await
            .map_err(store_err)?
            .try_collect()
            .await
            .map_err(store_err)?;

        let mut hits = Vec::with_capacity(k);
        for batch in &batches {
            for (segment, distance) in read_rows(batch)? {
                // Cosine distance is `1 - similarity`; zero vectors come back as NaN.
                let score = distance.map(|d| 1.0 - d).filter(|s| s.is_finite());
                hits.push(ScoredSegment {
                    score: score.unwrap_or(0.0),
                    segment,
                });
            }
        }

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.segment.ordinal.cmp(&b.segment.ordinal))
        });
        hits.truncate(k);
        Ok(hits)
    }

    /// Opens the index in `dir`. `Ok(None)` when no index was built there.
    ///
    /// # Errors
    /// `Io`/`Parse` on an unreadable manifest, `Corrupt` when the table is
    /// missing or disagrees with the manifest, `VectorSizeMismatch` for a
    /// table of the wrong dimension.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Option<VectorIndex>, IndexError> {
        let dir = dir.as_ref();
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.exists() {
            return Ok(None);
        }

        let manifest: IndexManifest = io_json::read_json(&manifest_path)?;
        if manifest.key.format_version != FORMAT_VERSION {
            return Err(IndexError::Corrupt(format!(
                "unsupported format version {}",
                manifest.key.format_version
            )));
        }

        let db = connect_dir(dir).await?;
        let table = db
            .open_table(TABLE)
            .execute()
            .await
            .map_err(|e| IndexError::Corrupt(format!("table `{TABLE}`: {e}")))?;

        let rows = table.count_rows(None).await.map_err(store_err)?;
        if rows != manifest.count {
            return Err(IndexError::Corrupt(format!(
                "manifest lists {} segments, table holds {rows}",
                manifest.count
            )));
        }

        let schema = table.schema().await.map_err(store_err)?;
        let dim = vector_dim(&schema).unwrap_or(0);
        if dim != manifest.dim {
            return Err(IndexError::VectorSizeMismatch {
                got: dim,
                want: manifest.dim,
            });
        }

        info!(dir = %dir.display(), count = rows, model = %manifest.key.model, "index opened");
        Ok(Some(VectorIndex { manifest, table }))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::errors::EmbedError;
    use crate::progress::NoopProgress;
    use std::{future::Future, pin::Pin};

    /// Deterministic bag-of-keywords embedder used across the crate's tests.
    pub(crate) struct KeywordEmbedder {
        pub model: String,
    }

    pub(crate) const KEYWORDS: [&str; 4] = ["học phí", "tuyển sinh", "thời gian", "học bổng"];

    impl KeywordEmbedder {
        pub(crate) fn new(model: &str) -> Self {
            Self {
                model: model.into(),
            }
        }
    }

    impl EmbeddingsProvider for KeywordEmbedder {
        fn embed<'a>(
            &'a self,
            text: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, EmbedError>> + Send + 'a>> {
            Box::pin(async move {
                let lower = text.to_lowercase();
                let mut v: Vec<f32> = KEYWORDS
                    .iter()
                    .map(|k| lower.matches(k).count() as f32)
                    .collect();
                v.push(0.1);
                Ok(v)
            })
        }
        fn model_id(&self) -> &str {
            &self.model
        }
    }

    pub(crate) fn seg(ordinal: usize, text: &str) -> Segment {
        Segment {
            ordinal,
            text: text.into(),
            offset: ordinal * 100,
            page: Some(1),
        }
    }

    pub(crate) fn sample_segments() -> Vec<Segment> {
        vec![
            seg(0, "Thời gian đào tạo MSE là 24 tháng."),
            seg(1, "Học phí của MSE là 300 triệu đồng."),
            seg(2, "Tuyển sinh hai đợt mỗi năm."),
            seg(3, "Học bổng dành cho học viên xuất sắc."),
        ]
    }

    pub(crate) fn opts(dir: &Path) -> BuildOptions<'_> {
        BuildOptions {
            dir,
            source_fingerprint: "abc",
            chunking: ChunkingConfig::default(),
            concurrency: 2,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_build_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_index(vec![], &KeywordEmbedder::new("kw"), &opts(dir.path()), &NoopProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::Empty));
        assert!(!dir.path().join(MANIFEST_FILE).exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn search_orders_by_similarity_and_caps_k() {
        let dir = tempfile::tempdir().unwrap();
        let provider = KeywordEmbedder::new("kw");
        let index = build_index(sample_segments(), &provider, &opts(dir.path()), &NoopProgress)
            .await
            .unwrap();
        assert_eq!(index.count(), 4);
        assert_eq!(index.dim(), 5);

        let q = provider.embed("Học phí của MSE?").await.unwrap();
        let hits = index.search(&q, 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].segment.ordinal, 1);
        assert!(hits[0].score > 0.9);
        assert!(hits[0].score >= hits[1].score);

        assert_eq!(index.search(&q, 50).await.unwrap().len(), 4);
        assert!(index.search(&q, 0).await.unwrap().is_empty());
        assert!(matches!(
            index.search(&[1.0, 0.0], 2).await,
            Err(IndexError::VectorSizeMismatch { got: 2, want: 5 })
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn ties_keep_document_order() {
        let dir = tempfile::tempdir().unwrap();
        let provider = KeywordEmbedder::new("kw");
        let segs = vec![seg(0, "không liên quan"), seg(1, "cũng không"), seg(2, "khác")];
        let index = build_index(segs, &provider, &opts(dir.path()), &NoopProgress)
            .await
            .unwrap();
        let q = provider.embed("xin chào").await.unwrap();
        let ords: Vec<usize> = index
            .search(&q, 3)
            .await
            .unwrap()
            .iter()
            .map(|h| h.segment.ordinal)
            .collect();
        assert_eq!(ords, vec![0, 1, 2]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn built_index_reopens_with_same_key_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let provider = KeywordEmbedder::new("kw");
        let index = build_index(sample_segments(), &provider, &opts(dir.path()), &NoopProgress)
            .await
            .unwrap();

        let reopened = VectorIndex::open(dir.path()).await.unwrap().unwrap();
        assert_eq!(reopened.count(), index.count());
        assert_eq!(reopened.dim(), 5);
        assert_eq!(reopened.manifest().key, index.manifest().key);
        assert_eq!(reopened.segments().await.unwrap(), sample_segments());

        let q = provider.embed("tuyển sinh").await.unwrap();
        assert_eq!(reopened.search(&q, 1).await.unwrap()[0].segment.ordinal, 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn rebuild_replaces_the_previous_table() {
        let dir = tempfile::tempdir().unwrap();
        let provider = KeywordEmbedder::new("kw");
        build_index(sample_segments(), &provider, &opts(dir.path()), &NoopProgress)
            .await
            .unwrap();
        let second = build_index(vec![seg(0, "Học phí mới")], &provider, &opts(dir.path()), &NoopProgress)
            .await
            .unwrap();
        assert_eq!(second.count(), 1);

        let reopened = VectorIndex::open(dir.path()).await.unwrap().unwrap();
        assert_eq!(reopened.count(), 1);
        assert_eq!(reopened.segments().await.unwrap()[0].text, "Học phí mới");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn open_without_manifest_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(VectorIndex::open(dir.path()).await.unwrap().is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn table_disagreeing_with_manifest_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let provider = KeywordEmbedder::new("kw");
        build_index(sample_segments(), &provider, &opts(dir.path()), &NoopProgress)
            .await
            .unwrap();

        let db = connect_dir(dir.path()).await.unwrap();
        let table = db.open_table(TABLE).execute().await.unwrap();
        table.delete("ordinal >= 1").await.unwrap();

        assert!(matches!(
            VectorIndex::open(dir.path()).await,
            Err(IndexError::Corrupt(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn manifest_without_table_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = IndexManifest {
            key: IndexKey::new("kw", "abc", &ChunkingConfig::default()),
            dim: 5,
            count: 4,
            created_at: chrono::Utc::now(),
        };
        io_json::write_json(&dir.path().join(MANIFEST_FILE), &manifest).unwrap();

        assert!(matches!(
            VectorIndex::open(dir.path()).await,
            Err(IndexError::Corrupt(_))
        ));
    }
}
