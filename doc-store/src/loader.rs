//! Source document loading: PDF (page by page) or plain text.

use std::path::Path;

use tracing::{debug, info};

use crate::errors::IngestionError;

/// Raw text of one page, 1-based page number (`None` for plain text).
#[derive(Debug, Clone)]
pub struct RawPage {
    pub number: Option<u32>,
    pub text: String,
}

/// Whether a path is loaded as plain text instead of PDF.
fn is_plain_text(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "txt" | "md"))
        .unwrap_or(false)
}

/// Reads the raw bytes of the source, mapping I/O failures to [`IngestionError`].
pub fn read_source(path: &Path) -> Result<Vec<u8>, IngestionError> {
    if !path.exists() {
        return Err(IngestionError::Missing(path.to_path_buf()));
    }
    std::fs::read(path).map_err(|e| IngestionError::Unreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Loads the document and returns its pages in order.
///
/// # Errors
/// - `Missing` if the path does not exist
/// - `Unreadable` on I/O failure, zero-byte files, invalid UTF-8 text files,
///   or PDFs that cannot be parsed
pub fn load_pages(path: &Path) -> Result<Vec<RawPage>, IngestionError> {
    let bytes = read_source(path)?;
    if bytes.is_empty() {
        return Err(IngestionError::Unreadable {
            path: path.to_path_buf(),
            reason: "file is empty".into(),
        });
    }

    if is_plain_text(path) {
        let text = String::from_utf8(bytes).map_err(|e| IngestionError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), chars = text.chars().count(), "loaded text source");
        return Ok(vec![RawPage { number: None, text }]);
    }

    // pdf-extract panics on some malformed fonts; keep that inside the error path.
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem_by_pages(&bytes));
    let pages = match result {
        Ok(Ok(pages)) => pages,
        Ok(Err(e)) => {
            return Err(IngestionError::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
        Err(_) => {
            return Err(IngestionError::Unreadable {
                path: path.to_path_buf(),
                reason: "pdf text extraction panicked".into(),
            });
        }
    };

    info!(path = %path.display(), pages = pages.len(), "extracted PDF text");
    Ok(pages
        .into_iter()
        .enumerate()
        .map(|(i, text)| RawPage {
            number: Some(i as u32 + 1),
            text,
        })
        .collect())
}
