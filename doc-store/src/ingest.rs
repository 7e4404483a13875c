//! Document ingestion: load, normalize, join pages and split into segments.

use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::info;

use crate::{
    chunker,
    config::ChunkingConfig,
    errors::IngestionError,
    loader::{self, RawPage},
    normalize::normalize_page,
    record::Segment,
};

const PAGE_SEPARATOR: &str = "\n\n";

/// Loads the document at `path` and splits it into overlapping segments.
///
/// # Errors
/// - `InvalidChunking` for a bad window configuration
/// - `Missing` / `Unreadable` when the file cannot be loaded
/// - `Empty` when no text survives extraction
pub fn ingest(path: impl AsRef<Path>, cfg: &ChunkingConfig) -> Result<Vec<Segment>, IngestionError> {
    let path = path.as_ref();
    cfg.validate()?;

    let pages = loader::load_pages(path)?;
    let (text, page_starts) = join_pages(&pages);

    let segments: Vec<Segment> = chunker::split(&text, cfg)
        .into_iter()
        .enumerate()
        .map(|(ordinal, (offset, text))| Segment {
            ordinal,
            text,
            offset,
            page: page_at(&page_starts, offset),
        })
        .collect();

    if segments.is_empty() {
        return Err(IngestionError::Empty(path.to_path_buf()));
    }

    info!(
        path = %path.display(),
        pages = pages.len(),
        chars = text.chars().count(),
        segments = segments.len(),
        chunk_size = cfg.chunk_size,
        chunk_overlap = cfg.chunk_overlap,
        "document ingested"
    );
    Ok(segments)
}

/// SHA-256 of the raw source bytes, hex encoded. Part of the index version key.
pub fn source_fingerprint(path: impl AsRef<Path>) -> Result<String, IngestionError> {
    let bytes = loader::read_source(path.as_ref())?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Normalizes pages, drops empty ones and joins the rest.
///
/// Returns the joined text and `(char_offset, page_number)` for each kept page.
fn join_pages(pages: &[RawPage]) -> (String, Vec<(usize, Option<u32>)>) {
    let mut text = String::new();
    let mut starts = Vec::with_capacity(pages.len());
    let mut chars = 0usize;

    for page in pages {
        let body = normalize_page(&page.text);
        if body.is_empty() {
            continue;
        }
        if !text.is_empty() {
            text.push_str(PAGE_SEPARATOR);
            chars += PAGE_SEPARATOR.len();
        }
        starts.push((chars, page.number));
        chars += body.chars().count();
        text.push_str(&body);
    }
    (text, starts)
}

/// Page containing the given char offset.
fn page_at(starts: &[(usize, Option<u32>)], offset: usize) -> Option<u32> {
    starts
        .iter()
        .take_while(|(start, _)| *start <= offset)
        .last()
        .and_then(|(_, page)| *page)
}
